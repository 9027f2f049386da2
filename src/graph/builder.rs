//! Derives the file-level import graph from parsed file records.
//!
//! Resolution is an exact path lookup: an import target produces an edge only
//! when it is byte-for-byte equal to another file's path as the parser
//! reported it. Everything else (packages, unresolvable relative paths) is a
//! resolution miss and contributes no edge.

use std::collections::HashMap;

use log::debug;

use super::types::{DependencyGraph, FileRecord, GraphEdge, GraphNode};

/// Diagnostics collected while building a graph.
///
/// None of these conditions fail the build; they exist so callers can observe
/// data quality problems and resolution misses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
	/// Records with no path. They still yield nodes but can never be targets.
	pub files_without_path: usize,
	/// Import targets that matched no known path.
	pub unresolved_imports: usize,
	/// Imports of a file's own path. These produce no edge.
	pub self_imports: usize,
	/// Paths shared by more than one record. The later record wins the lookup.
	pub duplicate_paths: usize,
}

/// Builds the dependency graph for `repo_id` from `files`.
///
/// Every record yields exactly one node, in input order. Repeated imports of
/// the same resolved path yield repeated edges, so the edge list reflects
/// import counts rather than distinct relationships.
pub fn build(repo_id: &str, files: &[FileRecord]) -> DependencyGraph {
	build_with_report(repo_id, files).0
}

/// Same as [`build`], also returning the [`BuildReport`].
pub fn build_with_report(repo_id: &str, files: &[FileRecord]) -> (DependencyGraph, BuildReport) {
	let mut report = BuildReport::default();

	// Edge sources and targets can appear in any order, so the whole index
	// must exist before resolution starts.
	let mut id_by_path: HashMap<&str, &str> = HashMap::with_capacity(files.len());
	for file in files {
		match file.path.as_deref() {
			Some(path) => {
				if id_by_path.insert(path, file.id.as_str()).is_some() {
					report.duplicate_paths += 1;
				}
			}
			None => {
				report.files_without_path += 1;
				debug!("depgraph: file {} has no path, it cannot be an import target", file.id);
			}
		}
	}

	let nodes: Vec<GraphNode> = files.iter().map(GraphNode::from).collect();

	let mut edges = Vec::new();
	for file in files {
		for target in &file.imports {
			match id_by_path.get(target.as_str()) {
				Some(&target_id) if target_id == file.id => report.self_imports += 1,
				Some(&target_id) => edges.push(GraphEdge::imports(file.id.as_str(), target_id)),
				None => report.unresolved_imports += 1,
			}
		}
	}

	let graph = DependencyGraph::new(repo_id, nodes, edges);
	debug!(
		"depgraph: built {} nodes, {} edges ({} unresolved imports, {} files without path)",
		graph.total_nodes, graph.total_edges, report.unresolved_imports, report.files_without_path
	);
	(graph, report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::EdgeKind;

	fn file(id: &str, path: &str, imports: &[&str], external: &[&str]) -> FileRecord {
		FileRecord {
			id: id.into(),
			path: Some(path.into()),
			imports: imports.iter().map(|s| s.to_string()).collect(),
			external_imports: external.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	#[test]
	fn two_file_scenario() {
		let files = vec![
			file("1", "a.ts", &["b.ts"], &[]),
			file("2", "b.ts", &["lodash"], &["lodash"]),
		];

		let graph = build("repo", &files);

		assert_eq!(graph.total_nodes, 2);
		assert_eq!(graph.edges, vec![GraphEdge::imports("1", "2")]);
		assert_eq!(graph.edges[0].kind, EdgeKind::Imports);
		assert!(graph.node("2").unwrap().has_external_dependencies);
		assert!(!graph.node("1").unwrap().has_external_dependencies);
	}

	#[test]
	fn empty_input_is_an_empty_graph() {
		let graph = build("repo", &[]);
		assert!(graph.nodes.is_empty());
		assert!(graph.edges.is_empty());
		assert_eq!(graph.total_nodes, 0);
		assert_eq!(graph.total_edges, 0);
	}

	#[test]
	fn target_listed_before_source_still_resolves() {
		let files = vec![
			file("b", "lib/b.py", &[], &[]),
			file("a", "lib/a.py", &["lib/b.py"], &[]),
		];
		let graph = build("repo", &files);
		assert_eq!(graph.edges, vec![GraphEdge::imports("a", "b")]);
	}

	#[test]
	fn repeated_imports_keep_duplicate_edges() {
		let files = vec![
			file("1", "a.ts", &["b.ts", "b.ts"], &[]),
			file("2", "b.ts", &[], &[]),
		];
		let graph = build("repo", &files);
		assert_eq!(graph.total_edges, 2);
		assert_eq!(graph.edges[0], graph.edges[1]);
	}

	#[test]
	fn unparsed_and_pathless_files_still_become_nodes() {
		let files = vec![
			FileRecord {
				id: "bin".into(),
				path: Some("assets/logo.png".into()),
				..Default::default()
			},
			FileRecord {
				id: "lost".into(),
				imports: vec!["assets/logo.png".into()],
				..Default::default()
			},
		];

		let (graph, report) = build_with_report("repo", &files);

		assert_eq!(graph.total_nodes, 2);
		assert_eq!(graph.node("bin").unwrap().filename, "logo.png");
		assert_eq!(graph.node("lost").unwrap().path, "");
		// A pathless file can still import others.
		assert_eq!(graph.edges, vec![GraphEdge::imports("lost", "bin")]);
		assert_eq!(report.files_without_path, 1);
	}

	#[test]
	fn misses_and_self_imports_are_reported_not_linked() {
		let files = vec![file("1", "a.ts", &["a.ts", "./missing", "react"], &["react"])];
		let (graph, report) = build_with_report("repo", &files);

		assert!(graph.edges.is_empty());
		assert_eq!(report.self_imports, 1);
		assert_eq!(report.unresolved_imports, 2);
	}

	#[test]
	fn resolution_is_exact_match_only() {
		let files = vec![
			file("1", "src/a.ts", &["src/b", "./b.ts", "src/b.ts"], &[]),
			file("2", "src/b.ts", &[], &[]),
		];
		let graph = build("repo", &files);
		assert_eq!(graph.edges, vec![GraphEdge::imports("1", "2")]);
	}

	#[test]
	fn duplicate_paths_resolve_to_the_later_record() {
		let files = vec![
			file("old", "x.rs", &[], &[]),
			file("new", "x.rs", &[], &[]),
			file("user", "main.rs", &["x.rs"], &[]),
		];
		let (graph, report) = build_with_report("repo", &files);
		assert_eq!(graph.total_nodes, 3);
		assert_eq!(graph.edges, vec![GraphEdge::imports("user", "new")]);
		assert_eq!(report.duplicate_paths, 1);
	}
}
