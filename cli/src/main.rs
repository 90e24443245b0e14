mod commands;
mod logger;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dnclear_core::config::{DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_TIMEOUT_SECS};
use dnclear_core::types::RetrieveQuery;
use dnclear_core::{ApiError, ClientConfig, DncClient};

#[derive(Debug, Parser)]
#[command(name = "dnclear")]
#[command(about = "Client for the DNClear Do Not Call list API")]
struct Cli {
    /// API root, e.g. https://dnc.example.com/dnc
    #[arg(long, env = "DNCLEAR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "DNCLEAR_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Per-request timeout; unset waits as long as the HTTP library allows
    #[arg(long, env = "DNCLEAR_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a number to the DNC list
    Add { phone: String },
    /// Submit a number through the GoHighLevel webhook endpoint
    Webhook { phone: String },
    /// Check whether a number is listed
    Check { phone: String },
    /// Remove a number from the list
    Remove { phone: String },
    /// List numbers page by page
    List {
        #[arg(long, default_value_t = RetrieveQuery::default().page)]
        page: u32,
        #[arg(long, default_value_t = RetrieveQuery::default().limit)]
        limit: u32,
    },
    /// Export the whole list as CSV
    DumpCsv {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add several numbers in one request
    BatchAdd {
        #[arg(required = true)]
        phones: Vec<String>,
    },
    /// Report which of several numbers are listed
    BatchScan {
        #[arg(required = true)]
        phones: Vec<String>,
    },
    /// Run every operation once against sample numbers
    Demo,
}

/// Validate the parsed flags exactly as `ClientConfig::from_env` validates
/// the environment.
fn client_config(cli: &Cli) -> Result<ClientConfig, ApiError> {
    let timeout_secs = cli.timeout_secs.map(|secs| secs.to_string());
    ClientConfig::from_lookup(|key| match key {
        ENV_BASE_URL => Some(cli.base_url.clone()),
        ENV_API_KEY => Some(cli.api_key.clone()),
        ENV_TIMEOUT_SECS => timeout_secs.clone(),
        _ => None,
    })
}

/// Text to print for a failed command. Client failures were already logged
/// by `DncClient`, so they print nothing more.
fn failure_message(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::ConfigError(_)) | None => Some(format!("Error: {err:#}")),
        Some(_) => None,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let result = client_config(&cli).map_err(anyhow::Error::from).and_then(|config| {
        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "client configured");
        let client = DncClient::new(config);
        commands::run(&client, cli.command)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(message) = failure_message(&err) {
                eprintln!("{message}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dnclear", "--base-url", "http://dnc.test"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_build_a_validated_config() {
        let cli = parse(&["--api-key", "secret", "--timeout-secs", "15", "check", "1"]);
        let config = client_config(&cli).unwrap();
        assert_eq!(config.base_url, "http://dnc.test");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = parse(&["--api-key", "secret", "--timeout-secs", "0", "check", "1"]);
        let err = client_config(&cli).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(msg) if msg.contains(ENV_TIMEOUT_SECS)));
    }

    #[test]
    fn whitespace_api_key_is_rejected() {
        let cli = parse(&["--api-key", "   ", "check", "1"]);
        let err = client_config(&cli).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(msg) if msg.contains(ENV_API_KEY)));
    }

    #[test]
    fn list_defaults_come_from_retrieve_query() {
        let cli = parse(&["--api-key", "secret", "list"]);
        let defaults = RetrieveQuery::default();
        assert!(matches!(
            cli.command,
            Command::List { page, limit } if page == defaults.page && limit == defaults.limit
        ));
    }

    #[test]
    fn client_failures_are_not_reported_twice() {
        let logged = anyhow::Error::from(ApiError::NotFound);
        assert_eq!(failure_message(&logged), None);

        let config = anyhow::Error::from(ApiError::ConfigError("DNCLEAR_API_KEY is not set".to_string()));
        assert_eq!(
            failure_message(&config).as_deref(),
            Some("Error: configuration error: DNCLEAR_API_KEY is not set")
        );

        let io = anyhow::anyhow!("failed to write out.csv");
        assert_eq!(failure_message(&io).as_deref(), Some("Error: failed to write out.csv"));
    }
}
