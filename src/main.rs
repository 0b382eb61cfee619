//! Operator CLI for the access filter.
//!
//! - `validate`: load a configuration and report every problem
//! - `check`: dry-run one request through the decision engine
//! - `watch`: follow a configuration file and report each reload
//! - `defaults`: print the default configuration

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use http::{HeaderMap, HeaderName, HeaderValue};

use access_filter::access::{explain, AccessPolicy, EvaluationRequest, SharedPolicy};
use access_filter::config::watcher::ConfigWatcher;
use access_filter::config::{load_config, AccessFilterConfig, ConfigError, ObservabilityConfig};
use access_filter::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "access-filter")]
#[command(about = "Validate and dry-run HTTP access-filter configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a configuration file and report validation errors
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate a single request against a configuration
    Check {
        /// Configuration file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Client address, optionally with port (e.g. 1.2.3.4:5555, [::1]:8443)
        #[arg(short, long)]
        address: String,

        /// Request header as "Name: value"; may be repeated
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Watch a configuration file and log every reload until Ctrl+C
    Watch {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the default configuration as TOML
    Defaults,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Validate { config } => match load_config(&config) {
            Ok(loaded) => {
                setup_logging(&loaded.observability);
                let policy = AccessPolicy::from_config(&loaded.filter)?;
                println!(
                    "{}: OK ({} disallowed, subnet {} [{}], header {})",
                    config.display(),
                    policy.disallowed_count(),
                    policy.allowed_subnet(),
                    policy.subnet_policy(),
                    policy.required_header()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(ConfigError::Validation(errors)) => {
                eprintln!("{}: invalid", config.display());
                for error in errors {
                    eprintln!("  - {}", error);
                }
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        },
        Commands::Check {
            config,
            address,
            headers,
        } => {
            let loaded = match config {
                Some(path) => load_config(&path)?,
                None => AccessFilterConfig::default(),
            };
            // Logs from policy construction (skipped blocklist entries) go to stderr
            setup_logging(&loaded.observability);

            let policy = AccessPolicy::from_config(&loaded.filter)?;
            let header_map = parse_headers(&headers)?;
            let verdict = explain(&policy, &EvaluationRequest::new(&address, &header_map));

            println!(
                "{} (reason: {}, client: {})",
                verdict.decision.as_str().to_uppercase(),
                verdict.reason,
                verdict.client_address
            );

            Ok(if verdict.decision.is_allow() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Watch { config } => {
            let loaded = load_config(&config)?;
            setup_logging(&loaded.observability);

            let shared = SharedPolicy::new(AccessPolicy::from_config(&loaded.filter)?);
            let (watcher, updates) = ConfigWatcher::new(&config);
            let _handle = watcher.run()?;
            tokio::spawn(shared.follow(updates));

            tracing::info!(path = %config.display(), "Watching configuration, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown signal received");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Defaults => {
            print!("{}", toml::to_string_pretty(&AccessFilterConfig::default())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Install the subscriber; a failure is reported and the command carries on.
fn setup_logging(config: &ObservabilityConfig) {
    if let Err(e) = init_logging(config) {
        eprintln!("Warning: logging not initialized: {}", e);
    }
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut map = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in \"Name: value\" form", entry))?;
        map.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(map)
}
