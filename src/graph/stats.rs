//! Summary statistics over a repository's dependency graph.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::types::{DependencyGraph, FileRecord};

/// How many entries the ranked lists keep.
pub const TOP_FILES: usize = 10;

/// A file and how many distinct files import it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportedFile {
	pub path: String,
	pub imported_by_count: usize,
}

/// A file and how many distinct files it imports.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependentFile {
	pub path: String,
	pub dependency_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DependencyStats {
	pub total_files: usize,
	/// Distinct `(importer, imported)` file pairs.
	pub total_internal_dependencies: usize,
	/// Distinct external specifiers per file, summed over all files.
	pub total_external_dependencies: usize,
	pub average_dependencies_per_file: f64,
	pub most_imported_files: Vec<ImportedFile>,
	pub files_with_most_dependencies: Vec<DependentFile>,
}

impl DependencyStats {
	/// Computes statistics for `graph`, which must have been built from `files`.
	///
	/// Repeated imports of the same file, and repeated external specifiers,
	/// count once per importing file.
	pub fn compute(files: &[FileRecord], graph: &DependencyGraph) -> Self {
		let pairs: HashSet<(&str, &str)> = graph
			.edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str()))
			.collect();

		let total_files = graph.total_nodes;
		let total_internal_dependencies = pairs.len();
		let total_external_dependencies = files
			.iter()
			.map(|f| f.external_imports.iter().collect::<HashSet<_>>().len())
			.sum();

		let mut imported_by: HashMap<&str, usize> = HashMap::new();
		let mut imports: HashMap<&str, usize> = HashMap::new();
		for &(source, target) in &pairs {
			*imported_by.entry(target).or_insert(0) += 1;
			*imports.entry(source).or_insert(0) += 1;
		}

		let ranked = |counts: &HashMap<&str, usize>| -> Vec<(String, usize)> {
			let mut entries: Vec<(String, usize)> = graph
				.nodes
				.iter()
				.map(|n| (n.path.clone(), counts.get(n.id.as_str()).copied().unwrap_or(0)))
				.collect();
			// Stable sort keeps listing order among equal counts.
			entries.sort_by(|a, b| b.1.cmp(&a.1));
			entries.truncate(TOP_FILES);
			entries
		};

		Self {
			total_files,
			total_internal_dependencies,
			total_external_dependencies,
			average_dependencies_per_file: if total_files > 0 {
				total_internal_dependencies as f64 / total_files as f64
			} else {
				0.0
			},
			most_imported_files: ranked(&imported_by)
				.into_iter()
				.map(|(path, imported_by_count)| ImportedFile {
					path,
					imported_by_count,
				})
				.collect(),
			files_with_most_dependencies: ranked(&imports)
				.into_iter()
				.map(|(path, dependency_count)| DependentFile {
					path,
					dependency_count,
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::build;

	fn file(id: &str, imports: &[&str], external: &[&str]) -> FileRecord {
		FileRecord {
			id: id.into(),
			path: Some(format!("{id}.ts")),
			imports: imports.iter().map(|s| s.to_string()).collect(),
			external_imports: external.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	#[test]
	fn ranks_by_in_and_out_degree() {
		let files = vec![
			file("a", &["b.ts", "c.ts"], &["react"]),
			file("b", &["c.ts"], &["react", "lodash"]),
			file("c", &[], &[]),
		];
		let graph = build("repo", &files);
		let stats = DependencyStats::compute(&files, &graph);

		assert_eq!(stats.total_files, 3);
		assert_eq!(stats.total_internal_dependencies, 3);
		assert_eq!(stats.total_external_dependencies, 3);
		assert!((stats.average_dependencies_per_file - 1.0).abs() < f64::EPSILON);
		assert_eq!(
			stats.most_imported_files[0],
			ImportedFile {
				path: "c.ts".into(),
				imported_by_count: 2
			}
		);
		assert_eq!(
			stats.files_with_most_dependencies[0],
			DependentFile {
				path: "a.ts".into(),
				dependency_count: 2
			}
		);
	}

	#[test]
	fn repeated_imports_count_once() {
		let files = vec![
			file("a", &["b.ts", "b.ts", "b.ts"], &["react", "react"]),
			file("b", &[], &[]),
		];
		let graph = build("repo", &files);
		assert_eq!(graph.total_edges, 3);

		let stats = DependencyStats::compute(&files, &graph);
		assert_eq!(stats.total_internal_dependencies, 1);
		assert_eq!(stats.total_external_dependencies, 1);
		assert!((stats.average_dependencies_per_file - 0.5).abs() < f64::EPSILON);
		assert_eq!(stats.most_imported_files[0].path, "b.ts");
		assert_eq!(stats.most_imported_files[0].imported_by_count, 1);
		assert_eq!(stats.files_with_most_dependencies[0].dependency_count, 1);
	}

	#[test]
	fn ranked_entries_use_per_list_count_names() {
		let files = vec![file("a", &["b.ts"], &[]), file("b", &[], &[])];
		let graph = build("repo", &files);
		let value = serde_json::to_value(DependencyStats::compute(&files, &graph)).unwrap();

		assert_eq!(
			value["most_imported_files"][0],
			serde_json::json!({ "path": "b.ts", "imported_by_count": 1 })
		);
		assert_eq!(
			value["files_with_most_dependencies"][0],
			serde_json::json!({ "path": "a.ts", "dependency_count": 1 })
		);
	}

	#[test]
	fn ties_keep_listing_order_and_lists_are_capped() {
		let files: Vec<FileRecord> = (0..15).map(|i| file(&format!("f{i:02}"), &[], &[])).collect();
		let graph = build("repo", &files);
		let stats = DependencyStats::compute(&files, &graph);

		assert_eq!(stats.most_imported_files.len(), TOP_FILES);
		assert_eq!(stats.most_imported_files[0].path, "f00.ts");
		assert_eq!(stats.most_imported_files[9].path, "f09.ts");
	}

	#[test]
	fn empty_repository_has_zero_average() {
		let graph = build("repo", &[]);
		let stats = DependencyStats::compute(&[], &graph);
		assert_eq!(stats.average_dependencies_per_file, 0.0);
		assert!(stats.most_imported_files.is_empty());
	}
}
