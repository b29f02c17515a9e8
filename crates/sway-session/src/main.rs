//! sway-workspaces
//!
//! Save the current sway layout to a profile, or restore a saved one.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sway_session::notify::{select_notifier, Notifier};
use sway_session::store::ProfileStore;
use sway_session::sway_ipc::SwayClient;
use sway_session::{Session, SessionError};
use sway_session_config::DEFAULT_CONFIG_PATH;

const USAGE: &str = "Usage: sway-workspaces <load|save> [profilename]";

#[derive(Parser, Debug)]
#[command(name = "sway-workspaces")]
#[command(about = "Save and restore sway workspace layouts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save the current layout
    Save {
        /// Profile name (defaults to the current time, YYYY.MM.DD_HH:MM:SS)
        profile: Option<String>,
    },

    /// Restore a saved layout
    Load {
        /// Profile name (defaults to the most recently saved profile)
        profile: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<ExitCode> {
    // Expand tilde in config path
    let config_path: PathBuf = shellexpand::tilde(DEFAULT_CONFIG_PATH).into_owned().into();
    let config = sway_session_config::load_config(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.global.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let notifier = select_notifier(config.global.notifier, &config.global.app_name);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_headline(e.kind()) {
            Some(headline) => return Ok(usage_error(notifier.as_ref(), headline)),
            None => e.exit(),
        },
    };

    let session = Session::new(ProfileStore::from_config(&config.global), notifier);

    match run(&session, cli.command, config.global.startup_delay).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.notification() {
            Some((headline, body)) => {
                tracing::error!("{}", e);
                session.notifier().notify(headline, &body);
                Ok(ExitCode::FAILURE)
            }
            None => Err(e.into()),
        },
    }
}

/// Headline for a command line that cannot be run
///
/// `None` for help and version requests, which clap prints and exits on.
fn usage_headline(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Some("Not enough parameters!")
        }
        _ => Some("Invalid command!"),
    }
}

fn usage_error(notifier: &dyn Notifier, headline: &str) -> ExitCode {
    notifier.notify(headline, "Exiting");
    println!("{}", USAGE);
    ExitCode::FAILURE
}

async fn run(
    session: &Session,
    command: Commands,
    startup_delay: Duration,
) -> Result<(), SessionError> {
    // Resolve the profile before waiting on the compositor so a bad name fails fast
    let command = match command {
        Commands::Load { profile } => Commands::Load {
            profile: Some(session.resolve_profile(profile)?),
        },
        save => save,
    };

    // The compositor may not be ready yet when started from session autostart
    tokio::time::sleep(startup_delay).await;
    let mut ipc = SwayClient::connect().await?;
    tracing::debug!("Using sway socket {}", ipc.socket_path().display());

    match command {
        Commands::Save { profile } => {
            session.save(&mut ipc, profile).await?;
        }
        Commands::Load { profile } => {
            let report = session.load(&mut ipc, profile).await?;
            for line in report.summary_lines() {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline_for(args: &[&str]) -> Option<&'static str> {
        let argv = std::iter::once("sway-workspaces").chain(args.iter().copied());
        let err = Cli::try_parse_from(argv).expect_err("command line should be rejected");
        usage_headline(err.kind())
    }

    #[test]
    fn test_missing_command_is_not_enough_parameters() {
        assert_eq!(headline_for(&[]), Some("Not enough parameters!"));
    }

    #[test]
    fn test_unknown_command_is_invalid() {
        assert_eq!(headline_for(&["foo"]), Some("Invalid command!"));
        assert_eq!(headline_for(&["save", "a", "b"]), Some("Invalid command!"));
    }

    #[test]
    fn test_help_and_version_are_not_usage_errors() {
        assert_eq!(headline_for(&["--help"]), None);
        assert_eq!(headline_for(&["--version"]), None);
    }

    #[test]
    fn test_valid_command_lines_parse() {
        let cli = Cli::try_parse_from(["sway-workspaces", "load"]).unwrap();
        assert!(matches!(cli.command, Commands::Load { profile: None }));

        let cli = Cli::try_parse_from(["sway-workspaces", "save", "desk"]).unwrap();
        assert!(matches!(cli.command, Commands::Save { profile: Some(ref p) } if p == "desk"));
    }
}
