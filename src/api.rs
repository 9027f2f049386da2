//! Browser client for the dependency graph endpoint.

use crate::error::{ApiError, GraphError};
use crate::graph::DependencyGraph;

/// Path of the dependency graph resource for a repository.
pub fn dependency_graph_path(repo_id: &str) -> String {
	format!("/repositories/{repo_id}/dependency-graph")
}

/// What the viewer currently knows about the requested graph.
///
/// Kept as three distinct states so a failed fetch is never drawn as an
/// empty graph, and an empty graph never looks like a pending one.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FetchState {
	#[default]
	Loading,
	Loaded(DependencyGraph),
	Failed(GraphError),
}

impl From<Result<DependencyGraph, GraphError>> for FetchState {
	fn from(result: Result<DependencyGraph, GraphError>) -> Self {
		match result {
			Ok(graph) => FetchState::Loaded(graph),
			Err(e) => FetchState::Failed(e),
		}
	}
}

/// Interprets an HTTP response body for the graph endpoint.
pub fn decode_graph_response(status: u16, body: &str) -> Result<DependencyGraph, GraphError> {
	if (200..300).contains(&status) {
		return Ok(serde_json::from_str(body)?);
	}
	match serde_json::from_str::<ApiError>(body) {
		Ok(api_error) => Err(api_error.into_graph_error(status)),
		Err(_) => Err(GraphError::Http {
			status,
			detail: body.trim().to_string(),
		}),
	}
}

#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	#[cfg(target_arch = "wasm32")]
	async fn get_text(&self, path: &str) -> Result<(u16, String), GraphError> {
		use wasm_bindgen::JsCast;
		use wasm_bindgen_futures::JsFuture;
		use web_sys::{Request, RequestInit, RequestMode, Response};

		let url = format!("{}{}", self.base_url, path);

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| GraphError::Transport(format!("request error: {:?}", e)))?;

		let window = web_sys::window().ok_or_else(|| GraphError::Transport("no window".into()))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| GraphError::Transport(format!("fetch error: {:?}", e)))?;

		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| GraphError::Transport("response is not a Response".into()))?;

		let text = JsFuture::from(
			resp.text()
				.map_err(|e| GraphError::Transport(format!("body error: {:?}", e)))?,
		)
		.await
		.map_err(|e| GraphError::Transport(format!("body error: {:?}", e)))?;

		Ok((resp.status(), text.as_string().unwrap_or_default()))
	}

	#[cfg(not(target_arch = "wasm32"))]
	async fn get_text(&self, path: &str) -> Result<(u16, String), GraphError> {
		Err(GraphError::Transport(format!(
			"fetching {}{} is only supported in the browser",
			self.base_url, path
		)))
	}

	/// Fetches the dependency graph of `repo_id`.
	pub async fn dependency_graph(&self, repo_id: &str) -> Result<DependencyGraph, GraphError> {
		let (status, body) = self.get_text(&dependency_graph_path(repo_id)).await?;
		decode_graph_response(status, &body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn graph_path() {
		assert_eq!(dependency_graph_path("repo-1"), "/repositories/repo-1/dependency-graph");
	}

	#[test]
	fn client_trims_trailing_slash() {
		let client = ApiClient::new("http://localhost:9999/");
		assert_eq!(client.base_url, "http://localhost:9999");
	}

	#[test]
	fn empty_graph_body_is_loaded_not_failed() {
		let body = r#"{"repo_id":"r","nodes":[],"edges":[],"total_nodes":0,"total_edges":0}"#;
		let state = FetchState::from(decode_graph_response(200, body));
		assert!(matches!(state, FetchState::Loaded(ref g) if g.is_empty()));
	}

	#[test]
	fn error_body_maps_to_failure() {
		let body = r#"{"error":"repository_not_found","detail":"repository not found: r"}"#;
		let state = FetchState::from(decode_graph_response(404, body));
		assert!(matches!(state, FetchState::Failed(GraphError::RepositoryNotFound(_))));
	}

	#[test]
	fn unstructured_error_body_keeps_status() {
		let err = decode_graph_response(502, "Bad Gateway\n").unwrap_err();
		assert_eq!(
			err,
			GraphError::Http {
				status: 502,
				detail: "Bad Gateway".into()
			}
		);
	}

	#[test]
	fn garbage_success_body_is_a_decode_error() {
		let err = decode_graph_response(200, "<html>").unwrap_err();
		assert!(matches!(err, GraphError::Decode(_)));
	}
}
