//! Tollgate server entrypoint.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tollgate_api::{AppState, build_app};
use tollgate_clients::{HttpServices, HubspotSink};
use tollgate_core::AppConfig;
use tollgate_core::ports::{AnalyticsSink, NoopSink};
use tracing::info;

mod commands;
mod telemetry;

use commands::{Commands, LogFormat};

#[derive(Parser)]
#[command(name = "tollgate")]
#[command(
    author,
    version,
    about = "Billing, subscription and org membership backend",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            log_format,
        } => {
            telemetry::init_tracing(log_format);
            serve(config.as_deref(), bind).await
        }
        Commands::CheckConfig { config } => {
            telemetry::init_tracing(LogFormat::Text);
            check_config(config.as_deref())
        }
    }
}

async fn serve(config_path: Option<&Path>, bind: Option<String>) -> anyhow::Result<()> {
    let mut config = AppConfig::load(config_path).context("failed to load configuration")?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let services = HttpServices::new(config.services.clone())
        .context("failed to build service clients")?;
    let analytics: Arc<dyn AnalyticsSink> =
        match HubspotSink::from_config(&config.hubspot, services.http().clone())? {
            Some(sink) => Arc::new(sink),
            None => {
                info!("HubSpot form not configured; analytics disabled");
                Arc::new(NoopSink)
            }
        };

    let bind = config.server.bind.clone();
    let state = AppState::new(Arc::new(services), analytics, Arc::new(config));
    let app = build_app(Arc::new(state));

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "Tollgate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

fn check_config(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path).context("configuration is invalid")?;
    for (key, value) in config.summary() {
        println!("{key:32} {value}");
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Unable to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
