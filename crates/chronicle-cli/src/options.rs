use std::path::PathBuf;

use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command, ValueHint};
use common::{Environment, Operation, Params, Region, RequestContext};

use crate::{config::DEFAULT_CREDENTIAL_FILE, CliError};

pub const REGION: &str = "region";
pub const ENV: &str = "env";
pub const CREDENTIAL_FILE: &str = "credential_file";
pub const VERBOSE: &str = "verbose";

/// The options every leaf command accepts
pub fn shared_options(command: Command) -> Command {
    command
        .arg(
            Arg::new(REGION)
                .long("region")
                .num_args(1)
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(Region::ALL.iter().map(Region::name)))
                .default_value(Region::Us.name())
                .help("Select region"),
        )
        .arg(
            Arg::new(ENV)
                .long("env")
                .num_args(1)
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(
                    Environment::ALL.iter().map(Environment::name),
                ))
                .default_value(Environment::Prod.name())
                .help("Optionally specify the environment for the command"),
        )
        .arg(
            Arg::new(CREDENTIAL_FILE)
                .long("credential_file")
                .short('c')
                .num_args(1)
                .value_hint(ValueHint::FilePath)
                .default_value(DEFAULT_CREDENTIAL_FILE)
                .help("Path of Service Account JSON"),
        )
        .arg(
            Arg::new(VERBOSE)
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Prints verbose output to the console"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub region: Region,
    pub env: Environment,
    pub credential_file: PathBuf,
    pub verbose: bool,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, CliError> {
        let region = matches
            .get_one::<String>(REGION)
            .map_or(Region::Us.name(), String::as_str)
            .parse::<Region>()?;
        let env = matches
            .get_one::<String>(ENV)
            .map_or(Environment::Prod.name(), String::as_str)
            .parse::<Environment>()?;
        let credential_file = matches
            .get_one::<String>(CREDENTIAL_FILE)
            .map_or(DEFAULT_CREDENTIAL_FILE, String::as_str);

        Ok(Self {
            region,
            env,
            credential_file: PathBuf::from(&*shellexpand::tilde(credential_file)),
            verbose: matches.get_flag(VERBOSE),
        })
    }

    /// Fix the options for one request
    pub fn context(&self, operation: &'static Operation, params: Params) -> RequestContext {
        RequestContext::new(
            self.region,
            self.env,
            self.credential_file.clone(),
            self.verbose,
            operation,
            params,
        )
    }
}
