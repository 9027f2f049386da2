//! Properties of the graph builder over arbitrary file sets.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use repo_depgraph::graph::{EdgeKind, FileRecord, GraphEdge, build, build_with_report};

const POOL: usize = 12;

fn pool_path(i: usize) -> String {
	format!("src/mod_{i}.py")
}

/// Import targets: paths that may or may not exist, plus package specifiers.
fn arb_import() -> impl Strategy<Value = String> {
	prop_oneof![
		4 => (0..POOL).prop_map(pool_path),
		1 => Just("requests".to_string()),
		1 => Just("./relative".to_string()),
		1 => Just("src/mod_0".to_string()),
	]
}

/// Files `f0..fn` with unique ids; each path is drawn from the pool or missing.
fn arb_files() -> impl Strategy<Value = Vec<FileRecord>> {
	prop::collection::vec(
		(
			prop::option::weighted(0.85, 0..POOL),
			prop::collection::vec(arb_import(), 0..6),
			prop::collection::vec("[a-z]{1,8}", 0..3),
		),
		0..24,
	)
	.prop_map(|specs| {
		specs
			.into_iter()
			.enumerate()
			.map(|(i, (path, imports, external_imports))| FileRecord {
				id: format!("f{i}"),
				path: path.map(pool_path),
				language: Some("python".to_string()),
				imports,
				external_imports,
				..Default::default()
			})
			.collect()
	})
}

/// Reference resolution: later records win a shared path, self imports drop.
fn expected_edges(files: &[FileRecord]) -> Vec<GraphEdge> {
	let mut id_by_path = HashMap::new();
	for f in files {
		if let Some(path) = &f.path {
			id_by_path.insert(path.clone(), f.id.clone());
		}
	}
	files
		.iter()
		.flat_map(|f| {
			f.imports
				.iter()
				.filter_map(|imp| id_by_path.get(imp))
				.filter(|target| **target != f.id)
				.map(|target| GraphEdge::imports(f.id.clone(), target.clone()))
				.collect::<Vec<_>>()
		})
		.collect()
}

proptest! {
	#[test]
	fn one_node_per_file(files in arb_files()) {
		let graph = build("repo", &files);
		prop_assert_eq!(graph.nodes.len(), files.len());
		prop_assert_eq!(graph.total_nodes, files.len());
		prop_assert_eq!(graph.total_edges, graph.edges.len());
		for (node, file) in graph.nodes.iter().zip(&files) {
			prop_assert_eq!(&node.id, &file.id);
		}
	}

	#[test]
	fn no_dangling_edges(files in arb_files()) {
		let graph = build("repo", &files);
		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		for edge in &graph.edges {
			prop_assert!(ids.contains(edge.source.as_str()));
			prop_assert!(ids.contains(edge.target.as_str()));
			prop_assert_ne!(&edge.source, &edge.target);
			prop_assert_eq!(edge.kind, EdgeKind::Imports);
		}
	}

	#[test]
	fn external_flag_mirrors_external_imports(files in arb_files()) {
		let graph = build("repo", &files);
		for (node, file) in graph.nodes.iter().zip(&files) {
			prop_assert_eq!(node.has_external_dependencies, !file.external_imports.is_empty());
		}
	}

	#[test]
	fn building_twice_is_identical(files in arb_files()) {
		prop_assert_eq!(build("repo", &files), build("repo", &files));
	}

	#[test]
	fn edges_are_exactly_the_resolved_imports(files in arb_files()) {
		let (graph, report) = build_with_report("repo", &files);
		prop_assert_eq!(&graph.edges, &expected_edges(&files));

		let total_imports: usize = files.iter().map(|f| f.imports.len()).sum();
		prop_assert_eq!(
			graph.total_edges + report.unresolved_imports + report.self_imports,
			total_imports
		);
	}

	#[test]
	fn order_does_not_change_the_edge_set_for_unique_paths(files in arb_files()) {
		// Drop shared paths: with duplicates, which record wins depends on order.
		let mut seen = HashSet::new();
		let files: Vec<FileRecord> = files
			.into_iter()
			.filter(|f| f.path.as_ref().is_none_or(|p| seen.insert(p.clone())))
			.collect();

		let mut reversed = files.clone();
		reversed.reverse();

		let mut forward: Vec<(String, String)> = build("repo", &files)
			.edges
			.into_iter()
			.map(|e| (e.source, e.target))
			.collect();
		let mut backward: Vec<(String, String)> = build("repo", &reversed)
			.edges
			.into_iter()
			.map(|e| (e.source, e.target))
			.collect();
		forward.sort();
		backward.sort();
		prop_assert_eq!(forward, backward);
	}
}
