use clap::Parser;
use plugin_activator::cli::{self, Args, Settings};
use plugin_activator::dataverse::WebApiConnector;
use plugin_activator::{Activator, ExitStatus};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use anyhow::Result;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    cli::init_tracing(args.log_level);

    let status = match run(args).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(critical = true, error = %e, "Critical error in application.");
            ExitStatus::Failure
        }
    };
    std::process::exit(status.code());
}

async fn run(args: Args) -> Result<ExitStatus> {
    // File < environment < command line
    let settings = Settings::load(args.config.as_deref())?.merge(args.settings()?);
    let (connection, solution) = settings.resolve()?;
    tracing::debug!(?connection, ?solution, "Configuration loaded");

    let cancel = CancellationToken::new();
    cli::spawn_shutdown_listener(cancel.clone())?;

    let connector = WebApiConnector {
        timeout: Duration::from_secs(args.timeout_secs),
    };
    Ok(Activator::new(connection, solution).execute(&connector, &cancel).await)
}
