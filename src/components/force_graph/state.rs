//! Graph simulation state and interaction tracking.
//!
//! Wraps the [`Simulation`] with per-node display metadata, the pan/zoom view
//! transform, the pointer [`Interaction`] reducer and highlight state for hover
//! effects with smooth intensity transitions.

use std::collections::HashMap;

use log::debug;

use super::interaction::{Command, Interaction, PointerEvent};
use super::scale::{ScaleConfig, ScaledValues, clamp_zoom};
use super::simulation::{ForceConfig, Simulation, SimulationPhase};
use super::theme::{Color, Theme};
use crate::graph::{DependencyGraph, GraphNode};

/// Content fills this share of the viewport after an auto-fit.
const FIT_MARGIN: f64 = 0.9;
/// Auto-fit never zooms in further than this.
const MAX_AUTO_ZOOM: f64 = 1.5;
/// Alpha given to the simulation by a wheel zoom or a resize.
const LIGHT_REHEAT: f64 = 0.1;

/// Per-node display metadata, indexed like the simulation nodes.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub label: String,
	pub color: Color,
	/// Radius in world units before zoom rules are applied.
	pub base_radius: f64,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..4.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` keeping the world point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.k = clamp_zoom(self.k * factor);
		self.x = sx - gx * self.k;
		self.y = sy - gy * self.k;
	}
}

/// Manages smooth highlight transitions for the focused node.
///
/// The focus is the hovered (or dragged) node. Every node has its own
/// intensity value (0.0 to 1.0) that animates toward 1.0 while it is the focus
/// and back to 0.0 afterwards. An edge takes the intensity of whichever
/// endpoint is brighter, so only edges incident to a focused node light up.
///
/// Uses exponential smoothing, and a minimum hold time to prevent flashing
/// when the pointer briefly skirts the edge of a node's hover zone.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	focus: Option<usize>,
	intensity: HashMap<usize, f64>,
	/// Time remaining before a released node may start fading out.
	hold_timer: HashMap<usize, f64>,
	cached_max: f64,
}

/// Minimum time (seconds) a highlight is held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	pub fn focus(&self) -> Option<usize> {
		self.focus
	}

	pub fn set_focus(&mut self, node: Option<usize>) {
		if self.focus == node {
			return;
		}
		self.focus = node;
		if let Some(idx) = node {
			self.hold_timer.insert(idx, MIN_HOLD_TIME);
		}
	}

	/// Animates intensities toward their targets. Returns whether anything is
	/// still in motion.
	///
	/// Exponential smoothing: value += (target - value) * (1 - e^(-speed * dt))
	pub fn tick(&mut self, dt: f64) -> bool {
		const FADE_IN_SPEED: f64 = 6.0; // ~150ms to 95%
		const FADE_OUT_SPEED: f64 = 4.0; // ~250ms to 95%

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();
		let focus = self.focus;
		let mut animating = false;

		if let Some(idx) = focus {
			let intensity = self.intensity.entry(idx).or_insert(0.0);
			if *intensity < 0.995 {
				*intensity += (1.0 - *intensity) * fade_in_factor;
				animating = true;
			} else {
				*intensity = 1.0;
			}
		}

		self.hold_timer.retain(|idx, timer| {
			if focus == Some(*idx) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let mut new_max: f64 = 0.0;
		self.intensity.retain(|idx, intensity| {
			if focus != Some(*idx) && !self.hold_timer.contains_key(idx) {
				*intensity *= fade_out_decay;
				animating = true;
			}
			new_max = new_max.max(*intensity);
			*intensity > 0.005
		});
		animating |= !self.hold_timer.is_empty() && self.hold_timer.keys().any(|&i| focus != Some(i));

		self.cached_max = new_max;
		animating
	}

	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	pub fn edge_intensity(&self, source: usize, target: usize) -> f64 {
		self.node_intensity(source).max(self.node_intensity(target))
	}

	/// Strongest intensity of any node, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Core graph state: simulation, view, interaction and highlight.
///
/// Created whenever a new graph arrives, then mutated each frame by the
/// animation loop and by pointer events.
pub struct ForceGraphState {
	pub sim: Simulation,
	pub nodes: Vec<GraphNode>,
	pub info: Vec<NodeInfo>,
	/// Edges as node indices, in payload order.
	pub edges: Vec<(usize, usize)>,
	pub transform: ViewTransform,
	pub interaction: Interaction,
	pub highlight: HighlightState,
	pub scale: ScaleConfig,
	pub selected: Option<usize>,
	pub width: f64,
	pub height: f64,
	/// Set once the user pans or zooms; suppresses auto-fit.
	user_adjusted: bool,
	settled_once: bool,
	grab_offset: (f64, f64),
	dirty: bool,
}

impl ForceGraphState {
	pub fn new(
		graph: &DependencyGraph,
		width: f64,
		height: f64,
		theme: &Theme,
		scale: ScaleConfig,
	) -> Self {
		Self::with_forces(graph, width, height, theme, scale, ForceConfig::default())
	}

	pub fn with_forces(
		graph: &DependencyGraph,
		width: f64,
		height: f64,
		theme: &Theme,
		scale: ScaleConfig,
		forces: ForceConfig,
	) -> Self {
		let mut sim = Simulation::new(forces);
		let mut id_to_idx = HashMap::with_capacity(graph.nodes.len());
		let mut info = Vec::with_capacity(graph.nodes.len());

		for node in &graph.nodes {
			let base_radius = scale.base_radius(node.has_external_dependencies);
			let idx = sim.add_node(base_radius);
			id_to_idx.insert(node.id.as_str(), idx);
			info.push(NodeInfo {
				label: node.filename.clone(),
				color: theme.language_color(node.language.as_deref()),
				base_radius,
			});
		}

		let edges: Vec<(usize, usize)> = graph
			.edges
			.iter()
			.filter_map(|e| Some((*id_to_idx.get(e.source.as_str())?, *id_to_idx.get(e.target.as_str())?)))
			.collect();
		if edges.len() != graph.edges.len() {
			debug!(
				"depgraph: {} edges reference unknown nodes",
				graph.edges.len() - edges.len()
			);
		}
		sim.set_links(edges.iter().copied());

		let mut state = Self {
			sim,
			nodes: graph.nodes.clone(),
			info,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			interaction: Interaction::default(),
			highlight: HighlightState::default(),
			scale,
			selected: None,
			width,
			height,
			user_adjusted: false,
			settled_once: false,
			grab_offset: (0.0, 0.0),
			dirty: true,
		};
		state.fit_to_viewport();
		state
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn phase(&self) -> SimulationPhase {
		self.sim.phase()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.screen_to_graph(sx, sy)
	}

	/// Sizes for the current zoom, with nodes capped to their collision space.
	pub fn scaled(&self) -> ScaledValues {
		ScaledValues::new(&self.scale, self.transform.k)
			.with_collide_padding(self.sim.config.collide_padding)
	}

	/// Topmost node under a screen point, honouring zoom-dependent radii.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scaled = self.scaled();
		// Later nodes are drawn on top.
		self.sim.nodes().iter().enumerate().rev().find_map(|(i, node)| {
			let r = scaled.node_radius(node.radius) + scaled.hit_slop;
			let (dx, dy) = (node.x - gx, node.y - gy);
			(dx * dx + dy * dy <= r * r).then_some(i)
		})
	}

	/// Whether an edge is incident to the focused node right now.
	pub fn is_edge_highlighted(&self, edge: usize) -> bool {
		match (self.highlight.focus(), self.edges.get(edge)) {
			(Some(f), Some(&(s, t))) => s == f || t == f,
			_ => false,
		}
	}

	/// Selects by node id; unknown ids clear the selection.
	pub fn set_selected(&mut self, id: Option<&str>) {
		let idx = id.and_then(|id| self.nodes.iter().position(|n| n.id == id));
		if idx != self.selected {
			self.selected = idx;
			self.dirty = true;
		}
	}

	/// Feeds a pointer event through the interaction reducer and applies the
	/// resulting commands. Returns the clicked node, if any.
	pub fn handle(&mut self, event: PointerEvent) -> Option<GraphNode> {
		let hit = match event {
			PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
				self.node_at_position(x, y)
			}
			PointerEvent::Leave | PointerEvent::Wheel { .. } => None,
		};

		let mut clicked = None;
		for command in self.interaction.reduce(event, hit) {
			self.dirty = true;
			match command {
				Command::Hover(node) => self.highlight.set_focus(node),
				Command::DragStart { node, x, y } => {
					let Some(n) = self.sim.node(node) else {
						continue;
					};
					let (nx, ny) = (n.x, n.y);
					let (gx, gy) = self.screen_to_graph(x, y);
					self.grab_offset = (nx - gx, ny - gy);
					self.sim.pin(node, nx, ny);
					let target = self.sim.config.drag_alpha_target;
					self.sim.set_alpha_target(target);
					self.sim.reheat(target);
				}
				Command::DragTo { node, x, y } => {
					let (gx, gy) = self.screen_to_graph(x, y);
					self.sim.pin(node, gx + self.grab_offset.0, gy + self.grab_offset.1);
				}
				Command::DragEnd { node } => {
					self.sim.unpin(node);
					self.sim.set_alpha_target(0.0);
				}
				Command::Pan { dx, dy } => {
					self.transform.x += dx;
					self.transform.y += dy;
					self.user_adjusted = true;
				}
				Command::Zoom { x, y, factor } => {
					self.transform.zoom_at(x, y, factor);
					self.user_adjusted = true;
					self.sim.reheat(LIGHT_REHEAT);
				}
				Command::Select(node) => clicked = self.nodes.get(node).cloned(),
			}
		}
		clicked
	}

	/// Advances physics and highlight animation by one frame. Returns whether
	/// the frame needs to be painted.
	pub fn tick(&mut self, dt: f64) -> bool {
		let moved = self.sim.tick();
		let animating = self.highlight.tick(dt);

		if !self.settled_once && self.sim.phase() == SimulationPhase::Settled {
			self.settled_once = true;
			if !self.user_adjusted {
				self.fit_to_viewport();
			}
			self.dirty = true;
		}

		let paint = moved || animating || self.dirty;
		self.dirty = false;
		paint
	}

	/// Updates the viewport and moves the centering target to the world point
	/// under the new viewport center. Node positions are kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		if width == self.width && height == self.height {
			return;
		}
		self.width = width;
		self.height = height;
		let (cx, cy) = self.screen_to_graph(width / 2.0, height / 2.0);
		self.sim.set_center(cx, cy);
		self.sim.reheat(LIGHT_REHEAT);
		self.dirty = true;
	}

	/// Zooms and pans so every node is in view.
	pub fn fit_to_viewport(&mut self) {
		let nodes = self.sim.nodes();
		if nodes.is_empty() || self.width <= 0.0 || self.height <= 0.0 {
			return;
		}
		let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
		let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for n in nodes {
			x0 = x0.min(n.x - n.radius);
			y0 = y0.min(n.y - n.radius);
			x1 = x1.max(n.x + n.radius);
			y1 = y1.max(n.y + n.radius);
		}
		let (bw, bh) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = clamp_zoom(
			(self.width * FIT_MARGIN / bw)
				.min(self.height * FIT_MARGIN / bh)
				.min(MAX_AUTO_ZOOM),
		);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
		self.dirty = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{FileRecord, build};

	fn file(id: &str, path: &str, imports: &[&str]) -> FileRecord {
		FileRecord {
			id: id.into(),
			path: Some(path.into()),
			language: Some("python".into()),
			imports: imports.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	/// a -> b, a -> c, c -> d
	fn state() -> ForceGraphState {
		let files = [
			file("a", "a.py", &["b.py", "c.py"]),
			file("b", "b.py", &[]),
			file("c", "c.py", &["d.py"]),
			file("d", "d.py", &[]),
		];
		let graph = build("r", &files);
		ForceGraphState::new(&graph, 800.0, 600.0, &Theme::dark(), ScaleConfig::default())
	}

	fn screen_pos(state: &ForceGraphState, idx: usize) -> (f64, f64) {
		let n = &state.sim.nodes()[idx];
		let t = &state.transform;
		(n.x * t.k + t.x, n.y * t.k + t.y)
	}

	fn settle(state: &mut ForceGraphState) {
		let mut frames = 0;
		while state.sim.phase() != SimulationPhase::Settled {
			state.tick(1.0 / 60.0);
			frames += 1;
			assert!(frames < 2_000);
		}
	}

	#[test]
	fn builds_index_edges() {
		let s = state();
		assert_eq!(s.edges, vec![(0, 1), (0, 2), (2, 3)]);
		assert_eq!(s.info[0].label, "a.py");
	}

	#[test]
	fn drag_release_frees_node_and_leaves_other_pins() {
		let mut s = state();
		settle(&mut s);
		s.sim.pin(3, 10.0, 10.0);

		let (x, y) = screen_pos(&s, 1);
		s.handle(PointerEvent::Down { x, y });
		assert!(s.sim.nodes()[1].is_pinned());
		assert_eq!(s.phase(), SimulationPhase::Simulating);

		s.handle(PointerEvent::Move { x: x + 40.0, y });
		s.tick(1.0 / 60.0);
		s.handle(PointerEvent::Up { x: x + 40.0, y });

		assert!(!s.sim.nodes()[1].is_pinned());
		assert_eq!(s.sim.nodes()[3].fx, Some(10.0));
		assert_eq!(s.sim.nodes()[3].fy, Some(10.0));
		assert!(!s.sim.nodes()[0].is_pinned());
	}

	#[test]
	fn drag_moves_pinned_node_with_pointer() {
		let mut s = state();
		settle(&mut s);
		let (x, y) = screen_pos(&s, 2);
		let before = s.sim.nodes()[2].x;
		s.handle(PointerEvent::Down { x, y });
		s.handle(PointerEvent::Move { x: x + 50.0, y });
		s.tick(1.0 / 60.0);
		let moved = s.sim.nodes()[2].x - before;
		assert!((moved - 50.0 / s.transform.k).abs() < 1e-6, "moved {moved}");
	}

	#[test]
	fn hover_highlights_exactly_incident_edges() {
		let mut s = state();
		settle(&mut s);
		let (x, y) = screen_pos(&s, 2);
		s.handle(PointerEvent::Move { x, y });

		let lit: Vec<usize> = (0..s.edges.len()).filter(|&e| s.is_edge_highlighted(e)).collect();
		assert_eq!(lit, vec![1, 2]);

		for _ in 0..60 {
			s.tick(1.0 / 60.0);
		}
		assert!(s.highlight.edge_intensity(0, 2) > 0.9);
		assert_eq!(s.highlight.edge_intensity(0, 1), 0.0);

		s.handle(PointerEvent::Leave);
		assert!((0..s.edges.len()).all(|e| !s.is_edge_highlighted(e)));
	}

	#[test]
	fn click_reports_node_without_moving_it() {
		let mut s = state();
		settle(&mut s);
		let (x, y) = screen_pos(&s, 3);
		let before = s.sim.nodes()[3].clone();
		assert!(s.handle(PointerEvent::Down { x, y }).is_none());
		let clicked = s.handle(PointerEvent::Up { x, y });
		assert_eq!(clicked.map(|n| n.id), Some("d".to_string()));
		assert_eq!(s.sim.nodes()[3].x, before.x);
		assert!(!s.sim.nodes()[3].is_pinned());
	}

	#[test]
	fn wheel_zoom_is_clamped() {
		let mut s = state();
		for _ in 0..100 {
			s.handle(PointerEvent::Wheel {
				x: 400.0,
				y: 300.0,
				delta_y: -1.0,
			});
		}
		assert_eq!(s.transform.k, 4.0);
		for _ in 0..200 {
			s.handle(PointerEvent::Wheel {
				x: 400.0,
				y: 300.0,
				delta_y: 1.0,
			});
		}
		assert_eq!(s.transform.k, 0.1);
	}

	#[test]
	fn zoomed_out_nodes_do_not_outgrow_collision_space() {
		let mut s = state();
		s.transform.k = 0.1;
		let pad = s.sim.config.collide_padding;
		let scaled = s.scaled();
		for node in s.sim.nodes() {
			assert!(scaled.node_radius(node.radius) <= node.radius + pad);
		}
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut t = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 1.0,
		};
		let before = t.screen_to_graph(300.0, 200.0);
		t.zoom_at(300.0, 200.0, 2.0);
		let after = t.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn resize_keeps_positions_and_recenters() {
		let mut s = state();
		settle(&mut s);
		let before = s.sim.nodes().to_vec();
		s.resize(1200.0, 600.0);
		assert_eq!(s.sim.nodes(), &before[..]);
		assert_eq!(s.sim.center(), s.screen_to_graph(600.0, 300.0));
		assert_eq!(s.phase(), SimulationPhase::Simulating);
	}

	#[test]
	fn settling_refits_unless_user_adjusted() {
		let mut s = state();
		s.handle(PointerEvent::Down { x: 1.0, y: 1.0 });
		s.handle(PointerEvent::Move { x: 21.0, y: 1.0 });
		s.handle(PointerEvent::Up { x: 21.0, y: 1.0 });
		let panned = s.transform.clone();
		settle(&mut s);
		assert_eq!(s.transform, panned);
	}

	#[test]
	fn empty_graph_paints_once_then_idles() {
		let graph = build("r", &[]);
		let mut s = ForceGraphState::new(&graph, 800.0, 600.0, &Theme::dark(), ScaleConfig::default());
		assert!(s.is_empty());
		assert_eq!(s.phase(), SimulationPhase::Empty);
		assert!(s.tick(0.016));
		assert!(!s.tick(0.016));
	}
}
