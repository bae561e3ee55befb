//! Every leaf runs through the same states:
//!
//! ```text
//! Start -> OptionsValid -> Prompted -> Built -> Sent -> Received -> Exit
//! ```
//!
//! Output is written in that order, so prompts come before the status line, the rendered
//! outcome follows it, and the verbose trace is always last.

use std::{io::Write, path::Path, time::Duration};

use api::{AuthSession, HttpExecutor, PreparedRequest, SessionError};
use clap::{ArgMatches, Command};
use common::{normalize, Outcome, RawResponse, RequestContext, Response, Template, TransportError};
use tracing::{debug, instrument};

use crate::{
    cli::cli,
    commands::{self, Input, Leaf},
    options::Options,
    prompt::Prompt,
    CliError, Exit,
};

/// Hands out the session a leaf sends its request through
pub trait Connector {
    fn connect(&self, credential_file: &Path) -> Result<Box<dyn HttpExecutor>, SessionError>;
}

/// Connects with the service account key at the configured credential path
#[derive(Debug, Clone)]
pub struct SessionConnector {
    pub timeout: Duration,
}

impl Connector for SessionConnector {
    fn connect(&self, credential_file: &Path) -> Result<Box<dyn HttpExecutor>, SessionError> {
        Ok(Box::new(AuthSession::from_credential_file(credential_file, self.timeout)?))
    }
}

enum State {
    Start,
    OptionsValid { options: Options, input: Input },
    Prompted { options: Options, input: Input },
    Built { context: RequestContext, input: Input, request: PreparedRequest },
    Sent {
        context: RequestContext,
        input: Input,
        request: PreparedRequest,
        result: Result<RawResponse, TransportError>,
    },
    Received {
        context: RequestContext,
        input: Input,
        request: PreparedRequest,
        response: Option<Response>,
        outcome: Outcome,
    },
    Exit(Exit),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Start => "start",
            State::OptionsValid { .. } => "options_valid",
            State::Prompted { .. } => "prompted",
            State::Built { .. } => "built",
            State::Sent { .. } => "sent",
            State::Received { .. } => "received",
            State::Exit(_) => "exit",
        }
    }
}

/// Values of the options a leaf declares beyond the shared ones
fn leaf_args(leaf: &Leaf, matches: &ArgMatches) -> Input {
    let mut input = Input::default();
    for arg in (leaf.args)() {
        let id = arg.get_id().as_str();
        if let Some(value) = matches.get_one::<String>(id) {
            input.args.insert(id.to_owned(), value.to_owned());
        }
    }
    input
}

#[instrument(skip_all, fields(group = leaf.group, leaf = leaf.name))]
pub async fn run_leaf(
    leaf: &Leaf,
    matches: &ArgMatches,
    prompt: &mut dyn Prompt,
    connector: &dyn Connector,
    out: &mut dyn Write,
) -> Result<Exit, CliError> {
    let mut state = State::Start;

    loop {
        debug!(state = state.name());
        state = match state {
            State::Start => State::OptionsValid {
                options: Options::from_matches(matches)?,
                input: leaf_args(leaf, matches),
            },

            State::OptionsValid { options, mut input } => {
                for ask in leaf.prompts {
                    let answer = prompt
                        .read_line(ask.message)
                        .await
                        .map_err(|e| CliError::LocalIo { detail: format!("cannot read input: {e}") })?;
                    let answer = answer.trim();
                    if answer.is_empty() {
                        writeln!(out, "{}", ask.missing())?;
                        return Ok(Exit::Success);
                    }
                    input.answers.insert(ask.key, answer.to_owned());
                }
                State::Prompted { options, input }
            },

            State::Prompted { options, input } => {
                let built = (leaf.build)(&input)?;
                let context = options.context(leaf.operation, built.params);
                let request = PreparedRequest::new(leaf.operation.method, context.url()?, built.body);
                State::Built { context, input, request }
            },

            State::Built { context, input, request } => {
                let session = connector.connect(context.credential_file())?;
                writeln!(out, "{}", leaf.status)?;
                out.flush()?;
                let result = session.execute(&request).await;
                State::Sent { context, input, request, result }
            },

            State::Sent { context, input, request, result } => match result {
                Ok(raw) => {
                    let (response, outcome) = normalize(raw);
                    State::Received { context, input, request, response: Some(response), outcome }
                },
                Err(e) => State::Received {
                    context,
                    input,
                    request,
                    response: None,
                    outcome: Outcome::TransportError(e),
                },
            },

            State::Received { context, input, request, response, outcome } => {
                let exit = render(leaf, &input, outcome, out)?;
                if context.verbose() {
                    writeln!(out, "{}", trace(&request, response.as_ref()))?;
                }
                State::Exit(exit)
            },

            State::Exit(exit) => return Ok(exit),
        };
    }
}

fn render(leaf: &Leaf, input: &Input, outcome: Outcome, out: &mut dyn Write) -> Result<Exit, CliError> {
    let (templates, exit) = match outcome {
        Outcome::Ok(body) => match (leaf.render)(&body, input) {
            Ok(templates) => (templates, Exit::Success),
            Err(CliError::Render(e)) => (
                vec![Template::Failure { kind: "malformed response".to_owned(), detail: e.to_string() }],
                Exit::Failure,
            ),
            Err(e) => return Err(e),
        },
        Outcome::ServerError { code, message } => (
            vec![Template::RequestFailed {
                action: leaf.action.to_owned(),
                error_code: code.to_string(),
                error_msg: message,
            }],
            Exit::Failure,
        ),
        Outcome::MalformedResponse { reason, content_type } => (
            vec![Template::Failure {
                kind: "malformed response".to_owned(),
                detail: format!("{reason} (content type: {content_type})"),
            }],
            Exit::Failure,
        ),
        Outcome::TransportError(e) => (
            vec![Template::Failure { kind: "transport".to_owned(), detail: e.to_string() }],
            Exit::Transport,
        ),
    };

    for template in templates {
        writeln!(out, "{template}")?;
    }
    Ok(exit)
}

fn trace(request: &PreparedRequest, response: Option<&Response>) -> Template {
    Template::VerboseTrace {
        method: request.method.to_string(),
        url: request.url.to_string(),
        request_body: request
            .body
            .as_ref()
            .map_or_else(|| "N/A".to_owned(), |body| body.to_string()),
        response_body: response.map_or_else(|| "N/A".to_owned(), |r| r.body_text.clone()),
    }
}

fn help(command: &mut Command, out: &mut dyn Write) -> Result<Exit, CliError> {
    write!(out, "{}", command.render_help())?;
    Ok(Exit::Success)
}

/// Route parsed arguments to a leaf. The root and the groups print their help when no
/// subcommand is given.
pub async fn run(
    matches: &ArgMatches,
    prompt: &mut dyn Prompt,
    connector: &dyn Connector,
    out: &mut dyn Write,
) -> Result<Exit, CliError> {
    let mut root = cli();

    let Some((group, group_matches)) = matches.subcommand() else {
        return help(&mut root, out);
    };

    let Some((name, leaf_matches)) = group_matches.subcommand() else {
        return match root.find_subcommand_mut(group) {
            Some(command) => help(command, out),
            None => Err(CliError::Usage(format!("Unknown command group {group}"))),
        };
    };

    let leaf = commands::find(group, name)
        .ok_or_else(|| CliError::Usage(format!("Unknown command {group} {name}")))?;
    run_leaf(leaf, leaf_matches, prompt, connector, out).await
}
