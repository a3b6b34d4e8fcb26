mod core;
mod features;
mod modules;
mod shared;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::cli::Cli;
use crate::core::config::{ConnectionParams, ConnectionSettings};
use crate::core::error::AppError;
use crate::features::objects::{handle_action, BucketService};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match try_main(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<ExitCode> {
    // One connection per invocation, calls are made one at a time
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    Ok(runtime.block_on(async_main(cli)))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        format!("{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        "warn".to_string()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn async_main(cli: Cli) -> ExitCode {
    let action = cli.action.name();

    let stored = ConnectionParams::load(&cli.env_file);

    let settings = match ConnectionSettings::resolve(&ConnectionParams::from_cli(&cli), &stored) {
        Ok(settings) => settings,
        Err(e @ AppError::MissingParameters(_)) => {
            tracing::error!("{}", e);
            println!("Error: {}", e);
            println!("Please provide them via command line arguments or a .env file.");
            return ExitCode::from(e.exit_code());
        }
        Err(e) => return fail(action, e),
    };

    if settings.should_persist(&cli.env_file, &stored) {
        println!(
            "Saving provided S3 parameters to {} file for future use.",
            cli.env_file.display()
        );
        if let Err(e) = settings.persist(&cli.env_file) {
            tracing::warn!("Could not save connection parameters: {}", e);
        }
    }

    println!("Connecting to S3 bucket: {}", settings.bucket_name);

    let result = match BucketService::connect(&settings) {
        Ok(service) => handle_action(&service, &cli.action, &mut io::stdout()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(action, e),
    }
}

/// Report a failed action on stdout and log it, returning the exit code
fn fail(action: &str, err: AppError) -> ExitCode {
    tracing::error!("Action '{}' failed: {:?}", action, err);
    println!("{}", failure_message(action, &err));
    ExitCode::from(err.exit_code())
}

fn failure_message(action: &str, err: &AppError) -> String {
    format!("Error during action '{}': {}", action, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let err = AppError::NotFound("Object 'a.txt' does not exist in bucket 'backups'".into());
        assert_eq!(
            failure_message("download", &err),
            "Error during action 'download': Not found: Object 'a.txt' does not exist in bucket 'backups'"
        );
    }
}
