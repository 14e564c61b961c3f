//! Triptych FAQ service - multi-agent RAG over HTTP.

use anyhow::Result;
use clap::Parser;

use triptych_agents::{Orchestrator, PipelineConfig};

mod routes;
mod state;

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "triptych-web")]
#[command(about = "Triptych FAQ service - multi-agent RAG over HTTP")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let config = PipelineConfig::from_env();
    if config.api_key.is_empty() {
        tracing::warn!("GOOGLE_API_KEY is not set; generation requests will fail");
    }
    let default_top_k = config.retrieval.top_k;

    println!("Starting Triptych FAQ service");
    println!("Listening on http://{}", addr);

    // Create app state with the assembled pipeline
    let state = AppState::new(Orchestrator::new(config), default_top_k);

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
