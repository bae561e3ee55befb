use std::{
    collections::VecDeque,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use api::{HttpExecutor, PreparedRequest, SessionError};
use async_trait::async_trait;
use clap::error::ErrorKind;
use common::{Method, RawResponse, TransportError};
use serde_json::{json, Value};
use url::Url;

use crate::{
    cli::cli,
    dispatch::{run, Connector, SessionConnector},
    interruptible, parse_args,
    prompt::Prompt,
    Exit,
};

const EMAIL: &str = "test_email_id@testcompany.com";

struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> Self {
        Self { answers: answers.iter().map(|a| a.to_string()).collect(), asked: vec![] }
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn read_line(&mut self, message: &str) -> io::Result<String> {
        self.asked.push(message.to_owned());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

/// Plays back scripted responses and records what was sent
#[derive(Default)]
struct FakeService {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<PreparedRequest>>,
    connections: Mutex<Vec<PathBuf>>,
}

impl FakeService {
    fn respond(&self, status_code: u16, content_type: &str, body_text: &str) {
        self.responses.lock().unwrap().push_back(Ok(RawResponse {
            status_code,
            content_type: content_type.to_owned(),
            body_text: body_text.to_owned(),
        }));
    }

    fn respond_json(&self, status_code: u16, body: Value) {
        self.respond(status_code, "application/json; charset=UTF-8", &body.to_string());
    }

    fn fail(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn connections(&self) -> Vec<PathBuf> {
        self.connections.lock().unwrap().clone()
    }
}

struct FakeSession(Arc<FakeService>);

#[async_trait]
impl HttpExecutor for FakeSession {
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        self.0.requests.lock().unwrap().push(request.clone());
        self.0
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no response scripted".to_owned())))
    }
}

impl Connector for Arc<FakeService> {
    fn connect(&self, credential_file: &Path) -> Result<Box<dyn HttpExecutor>, SessionError> {
        self.connections.lock().unwrap().push(credential_file.to_owned());
        Ok(Box::new(FakeSession(self.clone())))
    }
}

async fn run_with(
    command_line: &str,
    prompt: &mut ScriptedPrompt,
    connector: &dyn Connector,
) -> (Exit, String) {
    let matches = cli().try_get_matches_from(command_line.split_whitespace()).unwrap();
    let mut out = Vec::new();
    let exit = match run(&matches, prompt, connector, &mut out).await {
        Ok(exit) => exit,
        Err(e) => {
            e.report(&mut out).unwrap();
            e.exit()
        },
    };
    (exit, String::from_utf8(out).unwrap())
}

async fn run_cli(command_line: &str, answers: &[&str], service: &Arc<FakeService>) -> (Exit, String) {
    run_with(command_line, &mut ScriptedPrompt::new(answers), service).await
}

fn commands_block(help: &str) -> String {
    help.lines()
        .skip_while(|line| !line.starts_with("Commands:"))
        .take_while(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn root_without_command_prints_help() {
    let service = Arc::new(FakeService::default());
    let (exit, out) = run_cli("cli", &[], &service).await;

    assert_eq!(exit, Exit::Success);
    assert!(out.contains("Usage: cli [OPTIONS] COMMAND [ARGS]..."));
    insta::assert_snapshot!(commands_block(&out), @r###"
    Commands:
      bigquery    Bigquery related commands
      feeds       Configure/manage feeds
      forwarders  Configure/manage forwarders
      parsers     Configure/manage config based parsers
    "###);
    assert!(service.connections().is_empty());
}

#[tokio::test]
async fn group_without_command_prints_help() {
    let service = Arc::new(FakeService::default());
    let (exit, out) = run_cli("cli parsers", &[], &service).await;

    assert_eq!(exit, Exit::Success);
    assert!(out.contains("Usage: cli parsers [OPTIONS] COMMAND [ARGS]..."));
    insta::assert_snapshot!(commands_block(&out), @r###"
    Commands:
      archive      Archives a parser given the config ID
      download     Download parser given config ID
      generate     Generate sample logs for a given log type
      history      History of all parsers for a given log type
      list         List all parsers for a customer
      list_errors  List errors for a given log type and time range
      run          Run the parser against sample logs
      status       Get status of a parser given the config ID
      submit       Submit a new parser
    "###);
}

#[tokio::test]
async fn feeds_help_lists_leaves_alphabetically() {
    let service = Arc::new(FakeService::default());
    let (_, out) = run_cli("cli feeds", &[], &service).await;

    insta::assert_snapshot!(commands_block(&out), @r###"
    Commands:
      create   Creates a new feed
      delete   Delete a feed
      disable  Disable a feed with a given feed ID
      enable   Enable a feed with a given feed ID
      get      Get feed details using Feed ID
      list     List all feeds
      update   Update feed details
    "###);
}

#[test]
fn leaf_help_lists_shared_options() {
    let err = cli()
        .try_get_matches_from(["cli", "bigquery", "provide_access", "--help"])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    assert_eq!(err.exit_code(), 0);
    let help = err.to_string();
    for option in ["--region", "--env", "--credential_file", "--verbose"] {
        assert!(help.contains(option), "{option} missing from {help}");
    }
}

#[test]
fn invalid_option_values_are_usage_errors() {
    for args in [
        &["cli", "parsers", "list", "--region", "mars"][..],
        &["cli", "parsers", "list", "--env", "staging"][..],
        &["cli", "parsers", "list", "--region"][..],
        &["cli", "parsers", "nope"][..],
    ] {
        let err = cli().try_get_matches_from(args).unwrap_err();
        assert_eq!(err.exit_code(), 2, "{args:?}");
    }
}

#[tokio::test]
async fn provide_access() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({ "email": EMAIL }));

    let (exit, out) = run_cli("cli bigquery provide_access", &[EMAIL], &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, format!("Providing Bigquery access...\nAccess provided to email: {EMAIL}\n"));
    assert_eq!(
        service.requests(),
        vec![PreparedRequest::new(
            Method::Patch,
            url("https://backstory.googleapis.com/v1/tools/bigqueryAccess:update"),
            Some(json!({ "email": EMAIL })),
        )]
    );
    let connections = service.connections();
    assert_eq!(connections.len(), 1);
    assert!(connections[0].ends_with(".chronicle_cli/chronicle_credentials.json"));
}

#[tokio::test]
async fn provide_access_server_error() {
    let service = Arc::new(FakeService::default());
    service.respond_json(500, json!({"error": {"code": 500, "message": "test error"}}));

    let (exit, out) = run_cli("cli bigquery provide_access", &[EMAIL], &service).await;

    assert_eq!(exit, Exit::Failure);
    assert_eq!(exit.code(), 1);
    insta::assert_snapshot!(out, @r###"
    Providing Bigquery access...
    Error while providing access:
      Response code: 500
      Error: test error
    "###);
}

#[tokio::test]
async fn provide_access_empty_prompt() {
    let service = Arc::new(FakeService::default());
    let mut prompt = ScriptedPrompt::new(&[""]);

    let (exit, out) = run_with("cli bigquery provide_access", &mut prompt, &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, "Email not provided. Please enter email.\n");
    assert_eq!(prompt.asked, vec!["Enter email: "]);
    assert!(service.requests().is_empty());
    assert!(service.connections().is_empty());
}

#[tokio::test]
async fn whitespace_answer_counts_as_empty() {
    let service = Arc::new(FakeService::default());
    let (exit, out) = run_cli("cli feeds get", &["   "], &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, "Feed ID not provided. Please enter feed ID.\n");
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn verbose_trace_follows_outcome() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({ "email": EMAIL }));

    let (exit, out) = run_cli("cli bigquery provide_access --verbose", &[EMAIL], &service).await;

    assert_eq!(exit, Exit::Success);
    let status = out.find("Providing Bigquery access...").unwrap();
    let outcome = out.find("Access provided to email").unwrap();
    let trace = out.find("HTTP Method: PATCH").unwrap();
    assert!(status < outcome && outcome < trace);
    assert!(out.contains("Request URL: https://backstory.googleapis.com/v1/tools/bigqueryAccess:update"));
    assert!(out.contains(&format!(r#"Request body: {{"email":"{EMAIL}"}}"#)));
    assert!(out.ends_with(&format!("Response body: {{\"email\":\"{EMAIL}\"}}\n")));
}

#[tokio::test]
async fn verbose_trace_without_response() {
    let service = Arc::new(FakeService::default());
    service.fail(TransportError::Request("connection refused".to_owned()));

    let (exit, out) = run_cli("cli parsers list --verbose", &[], &service).await;

    assert_eq!(exit, Exit::Transport);
    assert!(out.contains("Error: transport: connection refused"));
    assert!(out.contains("Request body: N/A"));
    assert!(out.ends_with("Response body: N/A\n"));
}

#[tokio::test]
async fn timeout_is_transport_error() {
    let service = Arc::new(FakeService::default());
    service.fail(TransportError::Timeout(Duration::from_secs(120)));

    let (exit, out) = run_cli("cli bigquery provide_access", &[EMAIL], &service).await;

    assert_eq!(exit.code(), 3);
    assert_eq!(
        out,
        "Providing Bigquery access...\nError: transport: request timed out after 120s\n"
    );
}

#[tokio::test]
async fn auth_failure_is_transport_error() {
    let service = Arc::new(FakeService::default());
    service.fail(TransportError::AuthFailed("invalid_grant".to_owned()));

    let (exit, out) = run_cli("cli feeds list", &[], &service).await;

    assert_eq!(exit, Exit::Transport);
    assert!(out.ends_with("Error: transport: authentication failed: invalid_grant\n"));
}

#[tokio::test]
async fn html_body_is_malformed_response() {
    let service = Arc::new(FakeService::default());
    service.respond(502, "text/html", "<html>Bad Gateway</html>");

    let (exit, out) = run_cli("cli parsers list", &[], &service).await;

    assert_eq!(exit, Exit::Failure);
    assert!(out.ends_with(
        "Error: malformed response: non-JSON body (content type: text/html)\n"
    ));
}

#[tokio::test]
async fn missing_response_field_is_malformed_response() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({}));

    let (exit, out) = run_cli("cli bigquery provide_access", &[EMAIL], &service).await;

    assert_eq!(exit, Exit::Failure);
    assert!(out.ends_with("Error: malformed response: Response has no field email\n"));
}

#[tokio::test]
async fn region_and_env_select_host() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"cbnParsers": []}));

    let (exit, out) = run_cli("cli parsers list --region europe --env test", &[], &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, "Fetching list of parsers...\nNo CBN parsers currently configured.\n");
    assert_eq!(
        service.requests()[0].url,
        url("https://europe-test-backstory.sandbox.googleapis.com/v1/tools/cbnParsers")
    );
}

#[tokio::test]
async fn list_errors_query_is_escaped_in_order() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"errors": []}));
    let mut prompt =
        ScriptedPrompt::new(&["test_log_type", "2022-08-01T00:00:00Z", "2022-08-01T11:00:00Z"]);

    let (exit, out) =
        run_with("cli parsers list_errors --region ASIA_SOUTHEAST1", &mut prompt, &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(prompt.asked.len(), 3);
    assert!(out.ends_with("No CBN parser errors found for log type: test_log_type\n"));
    assert_eq!(
        service.requests()[0].url.as_str(),
        "https://asia-southeast1-backstory.googleapis.com/v1/tools/cbnParsers:listCbnParserErrors\
         ?log_type=test_log_type&start_time=2022-08-01T00%3A00%3A00Z&end_time=2022-08-01T11%3A00%3A00Z"
    );
}

#[tokio::test]
async fn invalid_timestamp_is_usage_error() {
    let service = Arc::new(FakeService::default());

    let (exit, out) = run_cli(
        "cli parsers generate",
        &["OKTA", "2022-08-01", "2022-08-01T11:00:00Z"],
        &service,
    )
    .await;

    assert_eq!(exit.code(), 2);
    assert!(out.starts_with("Error: usage: Invalid start_time 2022-08-01"));
    assert!(service.connections().is_empty());
}

#[tokio::test]
async fn missing_upload_file_is_local_error() {
    let service = Arc::new(FakeService::default());

    let (exit, out) = run_cli(
        "cli parsers submit",
        &["/nonexistent/parser.conf", "OKTA", "test"],
        &service,
    )
    .await;

    assert_eq!(exit.code(), 4);
    assert!(out.starts_with("Error: local io: /nonexistent/parser.conf"));
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn missing_credential_file_is_local_error() {
    let connector = SessionConnector { timeout: Duration::from_secs(5) };
    let mut prompt = ScriptedPrompt::new(&[]);

    let (exit, out) =
        run_with("cli feeds list -c /nonexistent/credentials.json", &mut prompt, &connector).await;

    assert_eq!(exit, Exit::LocalIo);
    assert!(out.starts_with(
        "Error: local io: Cannot read credential file /nonexistent/credentials.json"
    ));
    assert!(!out.contains("Fetching list of feeds..."));
}

#[tokio::test]
async fn credential_file_option_reaches_connector() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"forwarders": []}));

    let (exit, out) =
        run_cli("cli forwarders list --credential_file /tmp/key.json", &[], &service).await;

    assert_eq!(exit, Exit::Success);
    assert!(out.ends_with("No forwarders found.\n"));
    assert_eq!(service.connections(), vec![PathBuf::from("/tmp/key.json")]);
}

#[tokio::test]
async fn create_feed_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.json");
    let feed = json!({"details": {"feedSourceType": "API", "logType": "OKTA"}});
    std::fs::write(&path, feed.to_string()).unwrap();

    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"name": "feeds/123-abc"}));

    let (exit, out) =
        run_cli("cli feeds create", &[path.to_str().unwrap()], &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, "Creating feed...\nFeed created successfully with Feed ID: 123-abc\n");
    let request = &service.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, url("https://backstory.googleapis.com/v1/feeds"));
    assert_eq!(request.body, Some(feed));
}

#[tokio::test]
async fn delete_feed() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({}));

    let (exit, out) = run_cli("cli feeds delete", &["123-abc"], &service).await;

    assert_eq!(exit, Exit::Success);
    assert_eq!(out, "Deleting feed...\nFeed with ID: 123-abc deleted successfully.\n");
    let request = &service.requests()[0];
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.url, url("https://backstory.googleapis.com/v1/feeds/123-abc"));
    assert_eq!(request.body, None);
}

#[tokio::test]
async fn path_parameters_are_escaped() {
    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({}));

    run_cli("cli feeds enable", &["a b/c"], &service).await;

    assert_eq!(
        service.requests()[0].url.as_str(),
        "https://backstory.googleapis.com/v1/feeds/a%20b%2Fc:enable"
    );
}

#[tokio::test]
async fn download_parser_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parser.conf");

    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"configId": "abc", "config": "ZmlsdGVyIHt9"}));

    let (exit, out) = run_cli(
        &format!("cli parsers download --output {}", path.display()),
        &["abc"],
        &service,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    assert!(out.ends_with(&format!("Parser config downloaded to: {}\n", path.display())));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "filter {}");
    assert_eq!(
        service.requests()[0].url,
        url("https://backstory.googleapis.com/v1/tools/cbnParsers/abc")
    );
}

#[tokio::test]
async fn generate_forwarder_files() {
    let dir = tempfile::tempdir().unwrap();

    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"config": "collectors:\n", "auth": "output:\n"}));

    let (exit, out) = run_cli(
        &format!("cli forwarders generate_files --output_dir {}", dir.path().display()),
        &["f-1"],
        &service,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    assert!(out.starts_with("Generating forwarder files...\nForwarder files generated."));
    assert!(dir.path().join("forwarder.conf").is_file());
    assert!(dir.path().join("forwarder_auth.conf").is_file());
    assert_eq!(
        service.requests()[0].url,
        url("https://backstory.googleapis.com/v1/forwarders/f-1:generateForwarderFiles")
    );
}

#[tokio::test]
async fn run_parser_sends_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("parser.conf");
    let logs = dir.path().join("sample.log");
    std::fs::write(&config, "filter {}").unwrap();
    std::fs::write(&logs, "log one").unwrap();

    let service = Arc::new(FakeService::default());
    service.respond_json(200, json!({"result": ["{\"event\":1}"]}));

    let (exit, out) = run_cli(
        "cli parsers run",
        &[config.to_str().unwrap(), logs.to_str().unwrap()],
        &service,
    )
    .await;

    assert_eq!(exit, Exit::Success);
    insta::assert_snapshot!(out, @r###"
    Running parser against sample logs...
    Parsed events:
    {"event":1}
    "###);
    assert_eq!(
        service.requests()[0].body,
        Some(json!({"config": "ZmlsdGVyIHt9", "logs": "bG9nIG9uZQ=="}))
    );
}

#[tokio::test]
async fn dot_segment_id_is_usage_error() {
    let service = Arc::new(FakeService::default());

    let (exit, out) = run_cli("cli feeds delete", &[".."], &service).await;

    assert_eq!(exit.code(), 2);
    assert!(out.starts_with("Error: usage: Invalid value \"..\" for parameter feed_id"));
    assert!(service.connections().is_empty());
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn interrupt_aborts_pending_command() {
    let code = interruptible(std::future::pending::<i32>(), async { Ok(()) }).await;

    assert_eq!(code, 130);
}

#[tokio::test]
async fn finished_command_keeps_its_exit_code() {
    let code = interruptible(async { 3 }, std::future::pending::<io::Result<()>>()).await;

    assert_eq!(code, 3);
}

#[tokio::test]
async fn failed_signal_listener_does_not_interrupt() {
    let code = interruptible(
        async {
            tokio::task::yield_now().await;
            0
        },
        async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) },
    )
    .await;

    assert_eq!(code, 0);
}

#[test]
fn config_dir_exists_even_when_parsing_stops() {
    let home = tempfile::tempdir().unwrap();

    let dir = home.path().join("help").join(".chronicle_cli");
    let err = parse_args(&dir, ["cli", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    assert!(dir.is_dir());

    let dir = home.path().join("usage").join(".chronicle_cli");
    let err = parse_args(&dir, ["cli", "parsers", "list", "--region", "mars"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(dir.is_dir());
}
