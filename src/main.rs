//! Service Orchestrator (v1)
//!
//! Runs a minimal service under the orchestrator: an HTTP listener with a
//! health route, the configured ping targets, and signal-driven shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ ServiceConfig ──▶ Orchestrator (builder)
//!                                          │
//!                                          ▼
//!   SIGINT/SIGTERM/SIGQUIT ──▶ Shutdown ◀── Runner ──▶ startup actions (in order)
//!   monitor escalation ─────▶    │                       cache → broker → listener → db
//!   panic hook ─────────────▶    ▼
//!                     cancel timers → parallel teardown ⟂ deadline → exit(code)
//! ```

use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use clap::Parser;

use service_orchestrator::config::loader::load_config;
use service_orchestrator::observability::{logging, metrics};
use service_orchestrator::subsystems::PingOptions;
use service_orchestrator::{BoxError, Orchestrator, ServiceConfig};

#[derive(Parser)]
#[command(name = "service-orchestrator")]
#[command(about = "Run a service under ordered startup and graceful shutdown", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Used when `database.url` is not set in the file.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Used when `database.name` is not set in the file.
    #[arg(long, env = "DATABASE_NAME")]
    database_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    config.database = config.database.or_defaults(cli.database_url.clone(), cli.database_name.clone());

    logging::init_logging(&config.observability);
    tracing::info!("service-orchestrator v0.1.0 starting");

    tracing::info!(
        host = %config.listener.host,
        port = cli.port.unwrap_or(config.listener.port),
        shutdown_deadline_secs = config.shutdown.deadline_secs,
        ping_targets = config.ping.targets.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let targets = config.ping.targets.clone();
    let mut orchestrator = Orchestrator::new(config)
        .network_listener(|| Router::new().route("/health", get(|| async { "ok" })), cli.port)
        .on_exit(|| async {
            tracing::info!("Goodbye");
            Ok::<(), BoxError>(())
        });
    if !targets.is_empty() {
        orchestrator = orchestrator.ping_targets(targets.as_slice(), PingOptions::default())?;
    }

    let outcome = orchestrator
        .run(Some(Box::new(|| tracing::info!("Accepting traffic"))))
        .await?;

    // Only reached when the exit handler does not terminate the process.
    std::process::exit(outcome.exit_code);
}
