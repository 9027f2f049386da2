//! Error types shared by the graph service, the HTTP surface and the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::RepositoryStatus;

/// Leading text of a rendered [`GraphError::RepositoryNotFound`].
const NOT_FOUND_PREFIX: &str = "repository not found: ";

/// Failures that keep a dependency graph from being produced or delivered.
///
/// Building a graph from records that are present never fails; these are all
/// lookup or transport problems.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	#[error("repository not found: {0}")]
	RepositoryNotFound(String),

	#[error("repository {repo_id} is not ready (status: {status})")]
	RepositoryNotReady {
		repo_id: String,
		status: RepositoryStatus,
	},

	#[error("request failed: {0}")]
	Transport(String),

	#[error("HTTP {status}: {detail}")]
	Http { status: u16, detail: String },

	#[error("invalid graph payload: {0}")]
	Decode(String),

	#[error("invalid repository snapshot: {0}")]
	Snapshot(String),

	#[error("configuration error: {0}")]
	Config(String),
}

impl GraphError {
	/// HTTP status code a server should answer with for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			GraphError::RepositoryNotFound(_) => 404,
			GraphError::RepositoryNotReady { .. } => 409,
			GraphError::Http { status, .. } => *status,
			GraphError::Transport(_)
			| GraphError::Decode(_)
			| GraphError::Snapshot(_)
			| GraphError::Config(_) => 500,
		}
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(e: serde_json::Error) -> Self {
		GraphError::Decode(e.to_string())
	}
}

/// Machine-readable error code carried in [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
	RepositoryNotFound,
	RepositoryNotReady,
	Internal,
}

/// JSON error body. Never shaped like a graph, so an error can not be
/// mistaken for an empty repository.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ApiError {
	pub error: ApiErrorCode,
	pub detail: String,
}

impl From<&GraphError> for ApiError {
	fn from(e: &GraphError) -> Self {
		let error = match e {
			GraphError::RepositoryNotFound(_) => ApiErrorCode::RepositoryNotFound,
			GraphError::RepositoryNotReady { .. } => ApiErrorCode::RepositoryNotReady,
			_ => ApiErrorCode::Internal,
		};
		Self {
			error,
			detail: e.to_string(),
		}
	}
}

impl ApiError {
	/// Maps an error body received over HTTP back to a [`GraphError`].
	pub fn into_graph_error(self, status: u16) -> GraphError {
		match self.error {
			ApiErrorCode::RepositoryNotFound => {
				let repo_id = self
					.detail
					.strip_prefix(NOT_FOUND_PREFIX)
					.map(str::to_string)
					.unwrap_or_else(|| self.detail.clone());
				GraphError::RepositoryNotFound(repo_id)
			}
			_ => GraphError::Http {
				status,
				detail: self.detail,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(GraphError::RepositoryNotFound("r".into()), 404, ApiErrorCode::RepositoryNotFound)]
	#[case(
		GraphError::RepositoryNotReady { repo_id: "r".into(), status: RepositoryStatus::Processing },
		409,
		ApiErrorCode::RepositoryNotReady
	)]
	#[case(GraphError::Snapshot("bad".into()), 500, ApiErrorCode::Internal)]
	#[case(GraphError::Config("no repo".into()), 500, ApiErrorCode::Internal)]
	fn maps_to_status_and_code(
		#[case] error: GraphError,
		#[case] status: u16,
		#[case] code: ApiErrorCode,
	) {
		assert_eq!(error.status_code(), status);
		assert_eq!(ApiError::from(&error).error, code);
	}

	#[test]
	fn error_payload_shape() {
		let body = ApiError::from(&GraphError::RepositoryNotFound("repo-9".into()));
		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			json!({ "error": "repository_not_found", "detail": "repository not found: repo-9" })
		);
	}

	#[test]
	fn not_found_survives_the_round_trip() {
		let body = ApiError::from(&GraphError::RepositoryNotFound("repo-9".into()));
		let back = body.into_graph_error(404);
		assert_eq!(back, GraphError::RepositoryNotFound("repo-9".into()));
		assert_eq!(back.to_string(), "repository not found: repo-9");
	}

	#[test]
	fn not_found_detail_without_prefix_is_kept() {
		let body = ApiError {
			error: ApiErrorCode::RepositoryNotFound,
			detail: "gone".into(),
		};
		assert_eq!(body.into_graph_error(404).to_string(), "repository not found: gone");
	}
}
