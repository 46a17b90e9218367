use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kindergate::config::{load_config, print_schema};
use kindergate::error::SessionError;
use kindergate::refresh::Refresher;
use kindergate::startup;
use kindergate::state::SessionKit;
use kindergate::utils::logger::init_logging;
use tracing::{error, info};

/// Session keep-alive client for the preschool admin API.
///
/// Configuration is read from $KINDERGATE_CONFIG (default ./kindergate.yaml).
#[derive(Parser, Debug)]
#[command(name = "kindergate", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print the current session state as JSON
    Status,
    /// Run one refresh cycle against the API
    Refresh,
    /// Keep the session warm until interrupted
    Watch,
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Status);

    if command == Command::Schema {
        return exit_code(print_schema());
    }

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let kit = match startup::build(config) {
        Ok(kit) => kit,
        Err(e) => {
            error!("Failed to build session: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Status => status(&kit),
        Command::Refresh => refresh(&kit).await,
        Command::Watch => watch(&kit).await,
        Command::Schema => Ok(()),
    };
    exit_code(result)
}

fn exit_code(result: Result<(), SessionError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn status(kit: &SessionKit) -> Result<(), SessionError> {
    let state = kit.session.state();
    let rendered =
        serde_json::to_string_pretty(&state).map_err(|e| SessionError::Schema(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

async fn refresh(kit: &SessionKit) -> Result<(), SessionError> {
    let claims = kit.refresher.refresh().await?;
    println!(
        "Refreshed session for '{}' ({}), expires at {}",
        claims.subject, claims.role, claims.expires_at
    );
    Ok(())
}

async fn watch(kit: &SessionKit) -> Result<(), SessionError> {
    let mut redirects = kit.navigator.subscribe();
    let mut auth = kit.auth.subscribe();
    let _poller = kit.poller().spawn();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                return Ok(());
            }
            changed = auth.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let authenticated = *auth.borrow_and_update();
                info!("Authenticated: {}", authenticated);
            }
            redirect = redirects.recv() => {
                if let Ok(redirect) = redirect {
                    info!("Navigation requested: {:?}", redirect);
                }
            }
        }
    }
}
