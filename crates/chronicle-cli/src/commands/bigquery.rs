use common::{operations::bigquery, templates::field, Template};
use serde_json::{json, Value};

use super::{no_args, Ask, Built, Input, Leaf};
use crate::CliError;

const EMAIL: Ask = Ask::new("email", "Enter email: ", "Email", "email");

pub const LEAVES: &[Leaf] = &[Leaf {
    group: "bigquery",
    name: "provide_access",
    about: "Provide access to bigquery tables",
    operation: &bigquery::PROVIDE_ACCESS,
    prompts: &[EMAIL],
    status: "Providing Bigquery access...",
    action: "providing access",
    args: no_args,
    build: provide_access,
    render: access_provided,
}];

fn provide_access(input: &Input) -> Result<Built, CliError> {
    Ok(Built::default().body(json!({ "email": input.answer("email")? })))
}

fn access_provided(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::AccessProvided { email: field(body, "email")? }])
}
