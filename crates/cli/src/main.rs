use std::process::ExitCode;

use clap::Parser;

use labinv_cli::cli::Cli;
use labinv_cli::{AppConfig, LabApp, commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_data_dir(cli.data_dir),
        Err(err) => {
            eprintln!("error: invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    labinv_observability::init(config.log_format);

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig, command: labinv_cli::cli::Command) -> anyhow::Result<()> {
    let mut app = LabApp::open(config).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute_and_close(&mut app, command, &mut out).await
}
