//! Scoring API server.
//!
//! ```text
//! scoring-api --host 0.0.0.0 -p 8080 --config settings.yaml
//! ```

use clap::Parser;
use scoring_api::{MethodHandler, ServerError, Settings, open_store, serve};
use scoring_log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Scoring API - JSON method endpoint
#[derive(Parser, Debug)]
#[command(name = "scoring-api")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "JSON scoring API server")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "localhost", env = "SCORING_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "SCORING_PORT")]
    port: u16,

    /// Config file overriding the built-in defaults (json, toml, yaml or env)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    scoring_log::init();

    if let Err(e) = run(Cli::parse()).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    scoring_log::install_log_bridge()?;

    let settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = settings.log_file() {
        scoring_log::set_log_file(path)?;
    }

    let store = open_store(&settings).await?;
    let handler = Arc::new(MethodHandler::new(Arc::new(settings), store));

    let listener = TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("Starting server at {}", cli.port);

    tokio::select! {
        result = serve(listener, handler) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
