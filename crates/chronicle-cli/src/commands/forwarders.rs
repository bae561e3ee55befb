use std::path::PathBuf;

use clap::{Arg, ValueHint};
use common::{
    operations::forwarders,
    templates::{field, optional_field},
    RenderError, Template,
};
use serde_json::Value;

use super::{items, no_args, no_params, read_json, resource_id, write_file, Ask, Built, Input, Leaf};
use crate::CliError;

const FORWARDER_ID: Ask =
    Ask::new("forwarder_id", "Enter Forwarder ID: ", "Forwarder ID", "forwarder ID");
const FORWARDER_FILE: Ask = Ask::new(
    "forwarder_file",
    "Enter path of forwarder JSON file: ",
    "Forwarder file",
    "forwarder file path",
);

const OUTPUT_DIR: &str = "output_dir";
const CONFIG_FILE_NAME: &str = "forwarder.conf";
const AUTH_FILE_NAME: &str = "forwarder_auth.conf";

pub const LEAVES: &[Leaf] = &[
    Leaf {
        group: "forwarders",
        name: "create",
        about: "Create a forwarder",
        operation: &forwarders::CREATE,
        prompts: &[FORWARDER_FILE],
        status: "Creating forwarder...",
        action: "creating forwarder",
        args: no_args,
        build: create,
        render: created,
    },
    Leaf {
        group: "forwarders",
        name: "delete",
        about: "Delete a forwarder",
        operation: &forwarders::DELETE,
        prompts: &[FORWARDER_ID],
        status: "Deleting forwarder...",
        action: "deleting forwarder",
        args: no_args,
        build: by_forwarder_id,
        render: deleted,
    },
    Leaf {
        group: "forwarders",
        name: "generate_files",
        about: "Generate forwarder configuration files",
        operation: &forwarders::GENERATE_FILES,
        prompts: &[FORWARDER_ID],
        status: "Generating forwarder files...",
        action: "generating forwarder files",
        args: generate_files_args,
        build: by_forwarder_id,
        render: files_generated,
    },
    Leaf {
        group: "forwarders",
        name: "get",
        about: "Get a forwarder",
        operation: &forwarders::GET,
        prompts: &[FORWARDER_ID],
        status: "Fetching forwarder...",
        action: "fetching forwarder",
        args: no_args,
        build: by_forwarder_id,
        render: get,
    },
    Leaf {
        group: "forwarders",
        name: "list",
        about: "List all forwarders",
        operation: &forwarders::LIST,
        prompts: &[],
        status: "Fetching list of forwarders...",
        action: "fetching list of forwarders",
        args: no_args,
        build: no_params,
        render: list,
    },
    Leaf {
        group: "forwarders",
        name: "update",
        about: "Update a forwarder",
        operation: &forwarders::UPDATE,
        prompts: &[FORWARDER_ID, FORWARDER_FILE],
        status: "Updating forwarder...",
        action: "updating forwarder",
        args: no_args,
        build: update,
        render: updated,
    },
];

fn generate_files_args() -> Vec<Arg> {
    vec![Arg::new(OUTPUT_DIR)
        .long(OUTPUT_DIR)
        .num_args(1)
        .value_hint(ValueHint::DirPath)
        .default_value(".")
        .help("Directory to write the forwarder configuration files to")]
}

fn by_forwarder_id(input: &Input) -> Result<Built, CliError> {
    Ok(Built::with_params([("forwarder_id", input.answer("forwarder_id")?)]))
}

fn create(input: &Input) -> Result<Built, CliError> {
    Ok(Built::default().body(read_json(input.answer("forwarder_file")?)?))
}

fn update(input: &Input) -> Result<Built, CliError> {
    Ok(by_forwarder_id(input)?.body(read_json(input.answer("forwarder_file")?)?))
}

fn details(forwarder: &Value) -> Result<Template, RenderError> {
    Ok(Template::ForwarderDetails {
        forwarder_id: resource_id(forwarder, "forwarders")?,
        display_name: optional_field(forwarder, "displayName"),
        state: optional_field(forwarder, "state"),
    })
}

fn forwarder_id(input: &Input) -> Result<String, CliError> {
    Ok(input.answer("forwarder_id")?.to_owned())
}

fn created(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::ForwarderCreated { forwarder_id: resource_id(body, "forwarders")? }])
}

fn deleted(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::ForwarderDeleted { forwarder_id: forwarder_id(input)? }])
}

fn files_generated(body: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    let config = field(body, "config")?;
    let auth = field(body, "auth")?;

    let dir = PathBuf::from(&*shellexpand::tilde(input.arg(OUTPUT_DIR).unwrap_or(".")));
    let config_path = dir.join(CONFIG_FILE_NAME);
    let auth_path = dir.join(AUTH_FILE_NAME);
    write_file(&config_path, config.as_bytes())?;
    write_file(&auth_path, auth.as_bytes())?;

    Ok(vec![Template::ForwarderFilesGenerated {
        config_path: config_path.display().to_string(),
        auth_path: auth_path.display().to_string(),
    }])
}

fn get(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![details(body)?])
}

fn list(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    match items(body, "forwarders") {
        [] => Ok(vec![Template::NoForwarders {}]),
        forwarders => Ok(forwarders.iter().map(details).collect::<Result<Vec<_>, RenderError>>()?),
    }
}

fn updated(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::ForwarderUpdated { forwarder_id: forwarder_id(input)? }])
}
