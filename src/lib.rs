//! repo-depgraph: file-level dependency graphs for parsed repositories.
//!
//! The [`graph`] module turns parsed file records into a `{nodes, edges}`
//! payload; [`components::force_graph`] renders such a payload as an
//! interactive force-directed graph in the browser. The optional `server`
//! feature exposes graphs over HTTP.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod api;
pub mod components;
pub mod error;
pub mod graph;
#[cfg(feature = "server")]
pub mod server;
pub mod service;

use api::{ApiClient, FetchState};
pub use components::force_graph::{ForceGraphCanvas, Theme};
use error::GraphError;
pub use graph::{DependencyGraph, FileRecord, GraphEdge, GraphNode};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("depgraph: logging initialized");
}

/// Viewer settings embedded in the page as
/// `<script id="depgraph-config" type="application/json">`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
	/// Base URL of the graph API.
	pub api_base: String,
	pub repo_id: String,
	/// `"dark"` or `"light"`.
	pub theme: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_base: "http://localhost:9999".to_string(),
			repo_id: String::new(),
			theme: "dark".to_string(),
		}
	}
}

impl ClientConfig {
	/// The repository to fetch, or a configuration error when none is set.
	pub fn repository(&self) -> Result<&str, GraphError> {
		let repo_id = self.repo_id.trim();
		if repo_id.is_empty() {
			return Err(GraphError::Config(
				"no repository configured in #depgraph-config".to_string(),
			));
		}
		Ok(repo_id)
	}
}

/// Parses the JSON text of the script element with the given id.
fn read_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("depgraph: failed to parse #{}: {}", id, e);
			None
		}
	}
}

fn load_client_config() -> ClientConfig {
	read_script_json("depgraph-config").unwrap_or_default()
}

/// A graph embedded in the page as `<script id="graph-data">`, used instead of
/// fetching when present.
fn load_graph_data() -> Option<DependencyGraph> {
	let graph: DependencyGraph = read_script_json("graph-data")?;
	info!(
		"depgraph: loaded embedded graph with {} nodes, {} edges",
		graph.total_nodes, graph.total_edges
	);
	Some(graph)
}

/// Main application component.
///
/// Shows the embedded graph if the page carries one, otherwise fetches the
/// configured repository's graph. Loading, failure and an empty repository
/// each get their own view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_client_config();
	let theme = Theme::by_name(&config.theme);
	let fetch = RwSignal::new(FetchState::Loading);
	let selected = RwSignal::new(None::<GraphNode>);

	match (load_graph_data(), config.repository()) {
		(Some(graph), _) => fetch.set(FetchState::Loaded(graph)),
		(None, Err(e)) => {
			warn!("depgraph: {}", e);
			fetch.set(FetchState::Failed(e));
		}
		(None, Ok(repo_id)) => {
			let client = ApiClient::new(&config.api_base);
			let repo_id = repo_id.to_string();
			spawn_local(async move {
				let result = client.dependency_graph(&repo_id).await;
				if let Err(e) = &result {
					warn!("depgraph: {}", e);
				}
				fetch.set(result.into());
			});
		}
	}

	let title = if config.repo_id.is_empty() {
		"Dependency Graph".to_string()
	} else {
		format!("Dependency Graph: {}", config.repo_id)
	};
	let selected_id = Signal::derive(move || selected.get().map(|n| n.id));
	let on_select = Callback::new(move |node: GraphNode| selected.set(Some(node)));
	let theme_name = theme.name;
	let heading = title.clone();

	let body = move || match fetch.get() {
		FetchState::Loading => view! {
			<div class="graph-status loading">"Loading dependency graph..."</div>
		}
		.into_any(),
		FetchState::Failed(GraphError::Config(detail)) => view! {
			<div class="graph-status unconfigured">
				<h2>"No repository configured"</h2>
				<p>{detail}</p>
			</div>
		}
		.into_any(),
		FetchState::Failed(e) => view! {
			<div class="graph-status failed">
				<h2>"Failed to load dependency graph"</h2>
				<p>{e.to_string()}</p>
			</div>
		}
		.into_any(),
		FetchState::Loaded(graph) if graph.is_empty() => view! {
			<div class="graph-status empty">"No files to display."</div>
		}
		.into_any(),
		FetchState::Loaded(graph) => {
			let summary = format!("{} files, {} imports", graph.total_nodes, graph.total_edges);
			let data = Signal::derive(move || graph.clone());
			view! {
				<ForceGraphCanvas
					data=data
					selected=selected_id
					on_select=on_select
					theme=theme.clone()
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>{heading.clone()}</h1>
					<p class="subtitle">{summary}</p>
					<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				</div>
			}
			.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=theme_name />
		<Title text=title />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{body}
			{move || selected.get().map(|node| view! { <NodeDetails node=node selected=selected /> })}
		</div>
	}
}

/// Side panel describing the selected file.
#[component]
fn NodeDetails(node: GraphNode, selected: RwSignal<Option<GraphNode>>) -> impl IntoView {
	let language = node.language.clone().unwrap_or_else(|| "unknown".to_string());
	let external = if node.has_external_dependencies {
		"Imports external packages"
	} else {
		"No external imports"
	};
	let functions = node
		.functions
		.into_iter()
		.map(|f| view! { <li>{f}</li> })
		.collect_view();
	let classes = node
		.classes
		.into_iter()
		.map(|c| view! { <li>{c}</li> })
		.collect_view();

	view! {
		<aside class="node-details">
			<button class="close" on:click=move |_| selected.set(None)>"x"</button>
			<h2>{node.filename}</h2>
			<p class="path">{node.path}</p>
			<p class="language">{language}</p>
			<p class="external">{external}</p>
			<h3>"Functions"</h3>
			<ul>{functions}</ul>
			<h3>"Classes"</h3>
			<ul>{classes}</ul>
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn client_config_fills_missing_fields() {
		let config: ClientConfig = serde_json::from_str(r#"{"repo_id": "r1"}"#).unwrap();
		assert_eq!(config.repo_id, "r1");
		assert_eq!(config.api_base, "http://localhost:9999");
		assert_eq!(config.theme, "dark");
	}

	#[test]
	fn missing_repository_is_a_configuration_error() {
		let config = ClientConfig::default();
		assert!(matches!(config.repository(), Err(GraphError::Config(_))));

		let blank = ClientConfig {
			repo_id: "  ".to_string(),
			..Default::default()
		};
		assert!(matches!(blank.repository(), Err(GraphError::Config(_))));

		let set = ClientConfig {
			repo_id: "r1".to_string(),
			..Default::default()
		};
		assert_eq!(set.repository(), Ok("r1"));
	}
}
