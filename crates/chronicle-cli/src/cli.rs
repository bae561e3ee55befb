use chronicle_telemetry::ConsoleLogging;
use clap::{builder::PossibleValuesParser, Arg, ArgMatches, Command};

use crate::{
    commands::{Group, Leaf, GROUPS},
    options::shared_options,
};

pub const CONSOLE_LOGGING: &str = "console-logging";

fn leaf(leaf: &Leaf) -> Command {
    shared_options(Command::new(leaf.name).about(leaf.about)).args((leaf.args)())
}

fn group(group: &Group) -> Command {
    Command::new(group.name)
        .about(group.about)
        .override_usage(format!("cli {} [OPTIONS] COMMAND [ARGS]...", group.name))
        .disable_help_subcommand(true)
        .subcommands(group.leaves.iter().map(leaf))
}

pub fn cli() -> Command {
    Command::new("cli")
        .about(
            "Chronicle CLI is a command line tool for managing Chronicle user workflows, such as \
             feed and parser management",
        )
        .override_usage("cli [OPTIONS] COMMAND [ARGS]...")
        .disable_help_subcommand(true)
        .arg(
            Arg::new(CONSOLE_LOGGING)
                .long(CONSOLE_LOGGING)
                .num_args(1)
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(ConsoleLogging::NAMES))
                .default_value("off")
                .help("Diagnostic logging to stderr, filtered by RUST_LOG"),
        )
        .subcommands(GROUPS.iter().map(group))
}

pub fn console_logging(matches: &ArgMatches) -> ConsoleLogging {
    matches
        .get_one::<String>(CONSOLE_LOGGING)
        .and_then(|mode| mode.parse().ok())
        .unwrap_or_default()
}
