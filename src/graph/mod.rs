//! Dependency graph construction.
//!
//! Turns the upstream parser's per-file records into the `{nodes, edges}`
//! payload the viewer consumes. Pure and synchronous: no I/O, no caching, safe
//! to call concurrently for different repositories.

mod builder;
pub mod stats;
mod types;

pub use builder::{BuildReport, build, build_with_report};
pub use stats::{DependencyStats, DependentFile, ImportedFile};
pub use types::{DependencyGraph, EdgeKind, FileRecord, GraphEdge, GraphNode};
