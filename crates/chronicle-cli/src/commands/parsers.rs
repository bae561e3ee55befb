use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Arg, ValueHint};
use common::{
    operations::parsers,
    templates::{field, optional_field},
    RenderError, Template,
};
use serde_json::{json, Value};

use super::{
    decode_text, items, no_args, no_params, read_base64, timestamp, write_file, Ask, Built, Input,
    Leaf,
};
use crate::CliError;

const CONFIG_ID: Ask = Ask::new("config_id", "Enter Config ID: ", "Config ID", "config ID");
const LOG_TYPE: Ask = Ask::new("log_type", "Enter Log Type: ", "Log type", "log type");
const START_TIME: Ask = Ask::new(
    "start_time",
    "Enter Start Time (RFC 3339, e.g. 2022-08-01T00:00:00Z): ",
    "Start time",
    "start time",
);
const END_TIME: Ask = Ask::new(
    "end_time",
    "Enter End Time (RFC 3339, e.g. 2022-08-01T11:00:00Z): ",
    "End time",
    "end time",
);
const CONFIG_FILE: Ask = Ask::new(
    "config_file",
    "Enter CBN config file path: ",
    "CBN config file path",
    "CBN config file path",
);
const LOG_FILE: Ask = Ask::new(
    "log_file",
    "Enter sample log file path: ",
    "Sample log file path",
    "sample log file path",
);
const AUTHOR: Ask = Ask::new("author", "Enter author: ", "Author", "author");

const OUTPUT: &str = "output";

pub const LEAVES: &[Leaf] = &[
    Leaf {
        group: "parsers",
        name: "archive",
        about: "Archives a parser given the config ID",
        operation: &parsers::ARCHIVE,
        prompts: &[CONFIG_ID],
        status: "Archiving parser...",
        action: "archiving parser",
        args: no_args,
        build: by_config_id,
        render: archived,
    },
    Leaf {
        group: "parsers",
        name: "download",
        about: "Download parser given config ID",
        operation: &parsers::DOWNLOAD,
        prompts: &[CONFIG_ID],
        status: "Downloading parser...",
        action: "downloading parser",
        args: download_args,
        build: by_config_id,
        render: downloaded,
    },
    Leaf {
        group: "parsers",
        name: "generate",
        about: "Generate sample logs for a given log type",
        operation: &parsers::GENERATE,
        prompts: &[LOG_TYPE, START_TIME, END_TIME],
        status: "Generating sample logs...",
        action: "generating sample logs",
        args: generate_args,
        build: by_time_range,
        render: sample_logs,
    },
    Leaf {
        group: "parsers",
        name: "history",
        about: "History of all parsers for a given log type",
        operation: &parsers::HISTORY,
        prompts: &[LOG_TYPE],
        status: "Fetching parser history...",
        action: "fetching parser history",
        args: no_args,
        build: by_log_type,
        render: history,
    },
    Leaf {
        group: "parsers",
        name: "list",
        about: "List all parsers for a customer",
        operation: &parsers::LIST,
        prompts: &[],
        status: "Fetching list of parsers...",
        action: "fetching list of parsers",
        args: no_args,
        build: no_params,
        render: list,
    },
    Leaf {
        group: "parsers",
        name: "list_errors",
        about: "List errors for a given log type and time range",
        operation: &parsers::LIST_ERRORS,
        prompts: &[LOG_TYPE, START_TIME, END_TIME],
        status: "Fetching parser errors...",
        action: "fetching parser errors",
        args: no_args,
        build: by_time_range,
        render: errors,
    },
    Leaf {
        group: "parsers",
        name: "run",
        about: "Run the parser against sample logs",
        operation: &parsers::RUN,
        prompts: &[CONFIG_FILE, LOG_FILE],
        status: "Running parser against sample logs...",
        action: "running parser",
        args: no_args,
        build: run,
        render: validation,
    },
    Leaf {
        group: "parsers",
        name: "status",
        about: "Get status of a parser given the config ID",
        operation: &parsers::STATUS,
        prompts: &[CONFIG_ID],
        status: "Fetching parser status...",
        action: "fetching parser status",
        args: no_args,
        build: by_config_id,
        render: status,
    },
    Leaf {
        group: "parsers",
        name: "submit",
        about: "Submit a new parser",
        operation: &parsers::SUBMIT,
        prompts: &[CONFIG_FILE, LOG_TYPE, AUTHOR],
        status: "Submitting parser...",
        action: "submitting parser",
        args: no_args,
        build: submit,
        render: submitted,
    },
];

fn output_arg(help: &'static str) -> Arg {
    Arg::new(OUTPUT)
        .long(OUTPUT)
        .short('o')
        .num_args(1)
        .value_hint(ValueHint::FilePath)
        .help(help)
}

fn download_args() -> Vec<Arg> {
    vec![output_arg("File to write the parser config to, defaults to <config ID>.conf")]
}

fn generate_args() -> Vec<Arg> {
    vec![output_arg("File to write the sample logs to, defaults to <log type>_sample_logs.txt")]
}

fn output_path(input: &Input, default: String) -> PathBuf {
    input
        .arg(OUTPUT)
        .map(|path| PathBuf::from(&*shellexpand::tilde(path)))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn by_config_id(input: &Input) -> Result<Built, CliError> {
    Ok(Built::with_params([("config_id", input.answer("config_id")?)]))
}

fn by_log_type(input: &Input) -> Result<Built, CliError> {
    Ok(Built::with_params([("log_type", input.answer("log_type")?)]))
}

fn by_time_range(input: &Input) -> Result<Built, CliError> {
    Ok(Built::with_params([
        ("log_type", input.answer("log_type")?),
        ("start_time", timestamp(input, "start_time")?),
        ("end_time", timestamp(input, "end_time")?),
    ]))
}

fn run(input: &Input) -> Result<Built, CliError> {
    Ok(Built::default().body(json!({
        "config": read_base64(input.answer("config_file")?)?,
        "logs": read_base64(input.answer("log_file")?)?,
    })))
}

fn submit(input: &Input) -> Result<Built, CliError> {
    Ok(Built::default().body(json!({
        "config": read_base64(input.answer("config_file")?)?,
        "log_type": input.answer("log_type")?,
        "author": input.answer("author")?,
    })))
}

fn details(parser: &Value) -> Result<Template, RenderError> {
    Ok(Template::ParserDetails {
        config_id: field(parser, "configId")?,
        log_type: field(parser, "logType")?,
        state: optional_field(parser, "state"),
        sha256: optional_field(parser, "sha256"),
        author: optional_field(parser, "author"),
        submit_time: optional_field(parser, "submitTime"),
        state_last_changed_time: optional_field(parser, "stateLastChangedTime"),
    })
}

fn all_details(parsers: &[Value]) -> Result<Vec<Template>, CliError> {
    Ok(parsers.iter().map(details).collect::<Result<Vec<_>, RenderError>>()?)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_owned(),
        other => other.to_string(),
    }
}

fn archived(_: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::ParserArchived { config_id: input.answer("config_id")?.to_owned() }])
}

fn downloaded(body: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    let config = field(body, "config")?;
    let bytes = STANDARD.decode(&config).unwrap_or_else(|_| config.into_bytes());
    let path = output_path(input, format!("{}.conf", input.answer("config_id")?));
    write_file(&path, &bytes)?;

    Ok(vec![Template::ParserDownloaded { path: path.display().to_string() }])
}

fn sample_logs(body: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    let log_type = input.answer("log_type")?;
    let logs = items(body, "sampleLogs");
    if logs.is_empty() {
        return Ok(vec![Template::NoSampleLogs { log_type: log_type.to_owned() }]);
    }

    let mut contents = String::new();
    for log in logs {
        contents.push_str(&decode_text(&text(log)));
        contents.push('\n');
    }
    let path = output_path(input, format!("{log_type}_sample_logs.txt"));
    write_file(&path, contents.as_bytes())?;

    Ok(vec![Template::SampleLogsWritten {
        count: logs.len().to_string(),
        path: path.display().to_string(),
    }])
}

fn history(body: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    match items(body, "cbnParsers") {
        [] => Ok(vec![Template::NoParserHistory { log_type: input.answer("log_type")?.to_owned() }]),
        parsers => all_details(parsers),
    }
}

fn list(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    match items(body, "cbnParsers") {
        [] => Ok(vec![Template::NoParsers {}]),
        parsers => all_details(parsers),
    }
}

fn errors(body: &Value, input: &Input) -> Result<Vec<Template>, CliError> {
    let errors = items(body, "errors");
    if errors.is_empty() {
        return Ok(vec![Template::NoParserErrors {
            log_type: input.answer("log_type")?.to_owned(),
        }]);
    }

    Ok(errors
        .iter()
        .map(|error| Template::ParserErrorDetails {
            log_type: optional_field(error, "logType"),
            category: optional_field(error, "category"),
            error_time: optional_field(error, "errorTime"),
            error_msg: optional_field(error, "errorMsg"),
            logs: items(error, "logs")
                .iter()
                .map(|log| decode_text(&text(log)))
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect())
}

fn validation(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    let joined = |key: &str| items(body, key).iter().map(text).collect::<Vec<_>>().join("\n");

    let mut output = vec![];
    if !items(body, "errors").is_empty() {
        output.push(Template::ValidationErrors { errors: joined("errors") });
    }
    if !items(body, "result").is_empty() || output.is_empty() {
        output.push(Template::ValidationResult { result: joined("result") });
    }
    Ok(output)
}

fn status(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![details(body)?])
}

fn submitted(body: &Value, _: &Input) -> Result<Vec<Template>, CliError> {
    Ok(vec![Template::ParserSubmitted {
        config_id: field(body, "configId")?,
        state: optional_field(body, "state"),
    }])
}
