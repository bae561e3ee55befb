use chronicle_cli::{cli, config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = chronicle_cli::parse_args(&config::config_dir(), std::env::args_os())
        .unwrap_or_else(|e| e.exit());
    let telemetry = chronicle_telemetry::telemetry(cli::console_logging(&matches));

    let code =
        chronicle_cli::interruptible(chronicle_cli::execute(&matches), tokio::signal::ctrl_c())
            .await;

    drop(telemetry);
    std::process::exit(code);
}
