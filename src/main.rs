// ABOUTME: Entry point for the restack daemon.
// ABOUTME: Loads settings, builds the orchestrator, and serves the control API.

mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use restack::api::{build_router, AppState};
use restack::auth::AuthGate;
use restack::cluster::{ControlPlane, SwarmPlane};
use restack::config::Settings;
use restack::deploy::Orchestrator;
use restack::error::Result;
use restack::registry::UnitRegistry;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Refuses to start without a deploy secret: an open control endpoint
    // is worse than no endpoint.
    let mut settings = Settings::from_env()?;
    if let Some(bind) = cli.bind {
        settings.bind = bind;
    }
    if let Some(units_file) = cli.units_file {
        settings.units_file = Some(units_file);
    }

    let registry = match settings.units_file {
        Some(ref path) => UnitRegistry::from_yaml_file(path)?,
        None => UnitRegistry::builtin(&|unit| settings.image_override(unit)),
    };
    tracing::info!(units = ?registry.ids(), "unit registry loaded");

    let plane = Arc::new(SwarmPlane::new(settings.call_timeout)) as Arc<dyn ControlPlane>;
    let gate = AuthGate::new(settings.deploy_secret.clone());
    let orchestrator = Orchestrator::new(gate, registry, plane, &settings);
    let router = build_router(AppState::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    tracing::info!(bind = %settings.bind, "control endpoint listening");
    axum::serve(listener, router).await?;

    Ok(())
}
