//! Repository lookup boundary in front of the graph builder.
//!
//! The builder itself never fails; this layer is where a repository can be
//! missing or still processing, and where input size is capped.

use std::collections::HashMap;
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{self, DependencyGraph, DependencyStats, FileRecord};

/// Upper bound on the number of files fed to the builder for one repository.
pub const MAX_GRAPH_FILES: usize = 10_000;

/// Processing status of a repository in the ingestion pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryStatus {
	Queued,
	Processing,
	Completed,
	Failed,
}

impl fmt::Display for RepositoryStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			RepositoryStatus::Queued => "queued",
			RepositoryStatus::Processing => "processing",
			RepositoryStatus::Completed => "completed",
			RepositoryStatus::Failed => "failed",
		};
		f.write_str(s)
	}
}

/// Read access to parsed repositories.
pub trait RepositorySource {
	/// Status of the repository, or `None` if it is unknown.
	fn status(&self, repo_id: &str) -> Option<RepositoryStatus>;

	/// At most `limit` file records of the repository, in listing order.
	fn files(&self, repo_id: &str, limit: usize) -> Vec<FileRecord>;
}

/// Produces graph payloads for repositories held by a [`RepositorySource`].
pub struct GraphService<S> {
	source: S,
	max_files: usize,
}

impl<S: RepositorySource> GraphService<S> {
	pub fn new(source: S) -> Self {
		Self {
			source,
			max_files: MAX_GRAPH_FILES,
		}
	}

	/// Overrides the file cap. Mostly useful in tests.
	pub fn with_max_files(mut self, max_files: usize) -> Self {
		self.max_files = max_files;
		self
	}

	fn completed_files(&self, repo_id: &str) -> Result<Vec<FileRecord>, GraphError> {
		match self.source.status(repo_id) {
			None => return Err(GraphError::RepositoryNotFound(repo_id.to_string())),
			Some(RepositoryStatus::Completed) => {}
			Some(status) => {
				return Err(GraphError::RepositoryNotReady {
					repo_id: repo_id.to_string(),
					status,
				});
			}
		}

		let files = self.source.files(repo_id, self.max_files);
		if files.len() >= self.max_files {
			warn!(
				"depgraph: repository {} reached the {} file cap, graph may be incomplete",
				repo_id, self.max_files
			);
		}
		Ok(files)
	}

	/// Builds the dependency graph of a completed repository.
	pub fn dependency_graph(&self, repo_id: &str) -> Result<DependencyGraph, GraphError> {
		let files = self.completed_files(repo_id)?;
		let (graph, report) = graph::build_with_report(repo_id, &files);
		info!(
			"depgraph: repository {}: {} nodes, {} edges",
			repo_id, graph.total_nodes, graph.total_edges
		);
		if report.files_without_path > 0 || report.duplicate_paths > 0 {
			warn!(
				"depgraph: repository {}: {} files without path, {} duplicate paths",
				repo_id, report.files_without_path, report.duplicate_paths
			);
		}
		Ok(graph)
	}

	/// Computes dependency statistics of a completed repository.
	pub fn dependency_stats(&self, repo_id: &str) -> Result<DependencyStats, GraphError> {
		let files = self.completed_files(repo_id)?;
		let graph = graph::build(repo_id, &files);
		Ok(DependencyStats::compute(&files, &graph))
	}
}

/// A repository as stored in a snapshot file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RepositorySnapshot {
	pub repo_id: String,
	pub status: RepositoryStatus,
	#[serde(default)]
	pub files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
	repositories: Vec<RepositorySnapshot>,
}

/// In-memory [`RepositorySource`] loaded from a JSON snapshot.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
	repositories: HashMap<String, RepositorySnapshot>,
}

impl InMemorySource {
	pub fn new(repositories: impl IntoIterator<Item = RepositorySnapshot>) -> Self {
		Self {
			repositories: repositories
				.into_iter()
				.map(|r| (r.repo_id.clone(), r))
				.collect(),
		}
	}

	/// Parses `{ "repositories": [ { repo_id, status, files }, ... ] }`.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		let snapshot: SnapshotFile =
			serde_json::from_str(json).map_err(|e| GraphError::Snapshot(e.to_string()))?;
		Ok(Self::new(snapshot.repositories))
	}

	pub fn len(&self) -> usize {
		self.repositories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.repositories.is_empty()
	}
}

impl RepositorySource for InMemorySource {
	fn status(&self, repo_id: &str) -> Option<RepositoryStatus> {
		self.repositories.get(repo_id).map(|r| r.status)
	}

	fn files(&self, repo_id: &str, limit: usize) -> Vec<FileRecord> {
		self.repositories
			.get(repo_id)
			.map(|r| r.files.iter().take(limit).cloned().collect())
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SNAPSHOT: &str = r#"{
		"repositories": [
			{
				"repo_id": "done",
				"status": "completed",
				"files": [
					{ "id": "1", "path": "a.ts", "imports": ["b.ts"] },
					{ "id": "2", "path": "b.ts", "imports": ["lodash"], "external_imports": ["lodash"] },
					{ "id": "3", "path": "c.ts" }
				]
			},
			{ "repo_id": "busy", "status": "processing" }
		]
	}"#;

	fn service() -> GraphService<InMemorySource> {
		GraphService::new(InMemorySource::from_json(SNAPSHOT).unwrap())
	}

	#[test]
	fn builds_graph_for_completed_repository() {
		let graph = service().dependency_graph("done").unwrap();
		assert_eq!(graph.repo_id, "done");
		assert_eq!(graph.total_nodes, 3);
		assert_eq!(graph.total_edges, 1);
	}

	#[test]
	fn unknown_repository_is_not_an_empty_graph() {
		let err = service().dependency_graph("nope").unwrap_err();
		assert_eq!(err, GraphError::RepositoryNotFound("nope".into()));
	}

	#[test]
	fn unfinished_repository_is_rejected() {
		let err = service().dependency_graph("busy").unwrap_err();
		assert!(matches!(
			err,
			GraphError::RepositoryNotReady {
				status: RepositoryStatus::Processing,
				..
			}
		));
	}

	#[test]
	fn file_cap_truncates_input() {
		let graph = service().with_max_files(2).dependency_graph("done").unwrap();
		assert_eq!(graph.total_nodes, 2);
	}

	#[test]
	fn stats_for_completed_repository() {
		let stats = service().dependency_stats("done").unwrap();
		assert_eq!(stats.total_files, 3);
		assert_eq!(stats.total_external_dependencies, 1);
	}

	#[test]
	fn malformed_snapshot_is_reported() {
		let err = InMemorySource::from_json("{ \"repositories\": 3 }").unwrap_err();
		assert!(matches!(err, GraphError::Snapshot(_)));
	}
}
