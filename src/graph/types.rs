//! Input records and output payload types for the dependency graph.

use serde::{Deserialize, Serialize};

/// One parsed repository file, as produced by the upstream ingestion pipeline.
///
/// Only the fields the graph needs are projected; file content and embeddings
/// are never part of this record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FileRecord {
	/// Stable unique identifier of the file.
	#[serde(alias = "file_id")]
	pub id: String,
	/// Repository-relative, slash-separated path. Missing for records the
	/// parser could not place.
	#[serde(default)]
	pub path: Option<String>,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub functions: Vec<String>,
	#[serde(default)]
	pub classes: Vec<String>,
	/// Import targets: internal paths or external package specifiers.
	#[serde(default)]
	pub imports: Vec<String>,
	#[serde(default)]
	pub external_imports: Vec<String>,
}

impl FileRecord {
	/// Last segment of the path, or an empty string when the path is missing.
	pub fn filename(&self) -> &str {
		self.path
			.as_deref()
			.and_then(|p| p.rsplit('/').next())
			.unwrap_or("")
	}
}

/// A vertex of the dependency graph: one per file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphNode {
	pub id: String,
	pub path: String,
	pub filename: String,
	pub language: Option<String>,
	pub functions: Vec<String>,
	pub classes: Vec<String>,
	pub has_external_dependencies: bool,
}

impl From<&FileRecord> for GraphNode {
	fn from(file: &FileRecord) -> Self {
		Self {
			id: file.id.clone(),
			path: file.path.clone().unwrap_or_default(),
			filename: file.filename().to_string(),
			language: file.language.clone(),
			functions: file.functions.clone(),
			classes: file.classes.clone(),
			has_external_dependencies: !file.external_imports.is_empty(),
		}
	}
}

/// Kind of relationship an edge represents. Only imports exist today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
	#[default]
	Imports,
}

/// A directed edge: `source` imports `target`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeKind,
}

impl GraphEdge {
	pub fn imports(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind: EdgeKind::Imports,
		}
	}
}

/// Complete graph payload for one repository.
///
/// `total_nodes` and `total_edges` are derived from the vectors in
/// [`DependencyGraph::new`]; construct through it rather than by hand.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DependencyGraph {
	pub repo_id: String,
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	pub total_nodes: usize,
	pub total_edges: usize,
}

impl DependencyGraph {
	pub fn new(repo_id: impl Into<String>, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		Self {
			repo_id: repo_id.into(),
			total_nodes: nodes.len(),
			total_edges: edges.len(),
			nodes,
			edges,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn file_record_accepts_file_id_alias_and_missing_lists() {
		let record: FileRecord =
			serde_json::from_value(json!({ "file_id": "file-1", "path": "src/app.ts" })).unwrap();

		assert_eq!(record.id, "file-1");
		assert_eq!(record.filename(), "app.ts");
		assert!(record.imports.is_empty());
		assert!(record.language.is_none());
	}

	#[test]
	fn edge_serializes_kind_as_type() {
		let edge = GraphEdge::imports("1", "2");
		let value = serde_json::to_value(&edge).unwrap();
		assert_eq!(value, json!({ "source": "1", "target": "2", "type": "imports" }));
	}

	#[test]
	fn graph_payload_field_names() {
		let graph = DependencyGraph::new("repo-1", Vec::new(), Vec::new());
		let value = serde_json::to_value(&graph).unwrap();
		assert_eq!(
			value,
			json!({ "repo_id": "repo-1", "nodes": [], "edges": [], "total_nodes": 0, "total_edges": 0 })
		);
	}

	#[test]
	fn node_from_record_without_path() {
		let record = FileRecord {
			id: "7".into(),
			..Default::default()
		};
		let node = GraphNode::from(&record);
		assert_eq!(node.path, "");
		assert_eq!(node.filename, "");
		assert!(!node.has_external_dependencies);
	}
}
