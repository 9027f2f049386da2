//! Serves dependency graphs over HTTP from a repository snapshot.
//!
//! ```text
//! DEPGRAPH_SNAPSHOT=repos.json cargo run --features server --bin graph_server
//! ```

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use log::info;
use repo_depgraph::server::{AppState, ServerConfig, load_source, router};
use repo_depgraph::service::GraphService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = ServerConfig::from_env();
	let source = load_source(&config).await?;
	let app = router(AppState::new(GraphService::new(source)), &config.frontend_url);

	let listener = tokio::net::TcpListener::bind(config.addr()).await?;
	info!("depgraph: listening on {}", config.addr());
	axum::serve(listener, app).await?;
	Ok(())
}
