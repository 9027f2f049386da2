//! HTTP surface for dependency graphs.
//!
//! Two read-only routes over a [`GraphService`]:
//!
//! - `GET /repositories/:repo_id/dependency-graph` returns a [`DependencyGraph`]
//! - `GET /repositories/:repo_id/dependency-stats` returns [`DependencyStats`]
//!
//! Failures answer with a non-2xx status and an [`ApiError`] body, so a
//! missing or unfinished repository is never confused with an empty graph.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, GraphError};
use crate::graph::{DependencyGraph, DependencyStats};
use crate::service::{GraphService, InMemorySource};

/// Server settings, read from `DEPGRAPH_*` environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Repository snapshot to serve. Without one the server knows no repositories.
	pub snapshot: Option<PathBuf>,
	/// Origin allowed by CORS.
	pub frontend_url: String,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 9999,
			snapshot: None,
			frontend_url: "http://localhost:5173".to_string(),
		}
	}
}

impl ServerConfig {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let defaults = Self::default();
		let port = match lookup("DEPGRAPH_PORT") {
			Some(raw) => raw.parse().unwrap_or_else(|_| {
				warn!("depgraph: ignoring invalid DEPGRAPH_PORT {raw:?}");
				defaults.port
			}),
			None => defaults.port,
		};
		Self {
			host: lookup("DEPGRAPH_HOST").unwrap_or(defaults.host),
			port,
			snapshot: lookup("DEPGRAPH_SNAPSHOT").map(PathBuf::from),
			frontend_url: lookup("DEPGRAPH_FRONTEND_URL").unwrap_or(defaults.frontend_url),
		}
	}

	pub fn addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Loads the configured snapshot, or an empty source when none is set.
pub async fn load_source(config: &ServerConfig) -> Result<InMemorySource, GraphError> {
	let Some(path) = &config.snapshot else {
		warn!("depgraph: DEPGRAPH_SNAPSHOT not set, serving no repositories");
		return Ok(InMemorySource::default());
	};
	let json = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| GraphError::Snapshot(format!("{}: {e}", path.display())))?;
	let source = InMemorySource::from_json(&json)?;
	info!(
		"depgraph: loaded {} repositories from {}",
		source.len(),
		path.display()
	);
	Ok(source)
}

#[derive(Clone)]
pub struct AppState {
	service: Arc<GraphService<InMemorySource>>,
}

impl AppState {
	pub fn new(service: GraphService<InMemorySource>) -> Self {
		Self {
			service: Arc::new(service),
		}
	}
}

/// Error response: status from [`GraphError::status_code`], [`ApiError`] body.
struct ApiFailure(GraphError);

impl IntoResponse for ApiFailure {
	fn into_response(self) -> Response {
		let status =
			StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		if status.is_server_error() {
			warn!("depgraph: {}", self.0);
		}
		(status, Json(ApiError::from(&self.0))).into_response()
	}
}

impl From<GraphError> for ApiFailure {
	fn from(e: GraphError) -> Self {
		Self(e)
	}
}

async fn dependency_graph(
	State(state): State<AppState>,
	Path(repo_id): Path<String>,
) -> Result<Json<DependencyGraph>, ApiFailure> {
	Ok(Json(state.service.dependency_graph(&repo_id)?))
}

async fn dependency_stats(
	State(state): State<AppState>,
	Path(repo_id): Path<String>,
) -> Result<Json<DependencyStats>, ApiFailure> {
	Ok(Json(state.service.dependency_stats(&repo_id)?))
}

fn cors(frontend_url: &str) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET])
		.allow_headers(Any);
	match HeaderValue::from_str(frontend_url) {
		Ok(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
		Err(_) => {
			warn!("depgraph: invalid frontend url {frontend_url:?}, allowing any origin");
			layer.allow_origin(Any)
		}
	}
}

pub fn router(state: AppState, frontend_url: &str) -> Router {
	Router::new()
		.route(
			"/repositories/:repo_id/dependency-graph",
			get(dependency_graph),
		)
		.route(
			"/repositories/:repo_id/dependency-stats",
			get(dependency_stats),
		)
		.layer(cors(frontend_url))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
