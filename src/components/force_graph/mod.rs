//! Interactive dependency graph component.
//!
//! Renders a dependency graph on an HTML canvas with:
//! - Force-directed layout (link, many-body, centering and collision forces)
//! - Pan, zoom and node dragging through a single interaction reducer
//! - Smooth highlight of the edges around the hovered node
//! - Click-to-select with a callback carrying the full node
//!
//! The physics ([`simulation`]) and pointer handling ([`interaction`]) are
//! plain data structures and can be driven without a browser.
//!
//! # Example
//!
//! ```ignore
//! use repo_depgraph::components::force_graph::ForceGraphCanvas;
//!
//! let graph = repo_depgraph::graph::build("repo", &files);
//! view! {
//!     <ForceGraphCanvas
//!         data=Signal::derive(move || graph.clone())
//!         on_select=Callback::new(|node| log::info!("{}", node.path))
//!         fullscreen=true
//!     />
//! }
//! ```

mod component;
pub mod interaction;
mod quadtree;
mod render;
pub mod scale;
pub mod simulation;
mod state;
pub mod theme;

pub use component::ForceGraphCanvas;
pub use simulation::{ForceConfig, Simulation, SimulationPhase};
pub use state::{ForceGraphState, HighlightState, ViewTransform};
pub use theme::Theme;
