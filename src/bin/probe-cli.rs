use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use messaging_health::config::load_config;
use messaging_health::health::{HealthStatus, ProbeClients};
use messaging_health::lifecycle::startup;
use messaging_health::observability::logging;

#[derive(Parser)]
#[command(name = "probe-cli")]
#[command(about = "Run or inspect Azure messaging health checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured checks once and print the report
    Check {
        #[arg(short, long, default_value = "messaging-health.toml")]
        config: PathBuf,

        /// Only run checks carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Fetch the latest report from a running server
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config, tag } => {
            let config = load_config(&config)?;
            logging::init("warn");

            let service = startup::build_service(&config, ProbeClients::rest(reqwest::Client::new()))?;
            let report = service
                .check_health_filtered(
                    |r| tag.as_deref().map_or(true, |t| r.has_tag(t)),
                    &CancellationToken::new(),
                )
                .await;

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(exit_code(report.status))
        }
        Commands::Status { url } => {
            let res = reqwest::Client::new()
                .get(format!("{}/health", url.trim_end_matches('/')))
                .send()
                .await?;
            let status = res.status();
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);

            if status.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("Error: health endpoint returned status {}", status);
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn exit_code(status: HealthStatus) -> ExitCode {
    match status {
        HealthStatus::Unhealthy => ExitCode::FAILURE,
        HealthStatus::Healthy | HealthStatus::Degraded => ExitCode::SUCCESS,
    }
}
