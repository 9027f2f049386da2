//! Force-directed layout simulation.
//!
//! Owns only numeric state: positions, velocities, pins and link indices.
//! Nothing here knows about canvases or graph payloads, so the physics can be
//! driven and inspected directly in tests.
//!
//! Each tick applies, in order, link attraction toward a target distance, a
//! many-body repulsion (Barnes-Hut over a [`QuadTree`]), a centering shift and
//! a collision force, then integrates velocities. A cooling parameter `alpha`
//! scales every force and decays toward `alpha_target`; once it drops below
//! `alpha_min` the simulation is settled and ticks become no-ops.
//!
//! # Usage
//! ```ignore
//! let mut sim = Simulation::new(ForceConfig::default());
//! let a = sim.add_node(6.0);
//! let b = sim.add_node(9.0);
//! sim.add_link(a, b);
//!
//! // Each frame:
//! sim.tick();
//! for node in sim.nodes() {
//!     draw_circle(node.x, node.y, node.radius);
//! }
//! ```

use std::f64::consts::PI;

use super::quadtree::{Point, QuadTree};

/// A simulated body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position. While set, the node ignores forces and stays here.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	/// Collision radius.
	pub radius: f64,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A spring between two node indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimLink {
	pub source: usize,
	pub target: usize,
}

/// Tunable force parameters.
#[derive(Clone, Debug)]
pub struct ForceConfig {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Barnes-Hut accuracy; cells smaller than `theta * distance` are merged.
	pub theta: f64,
	/// Lower bound on interaction distance, avoids blow-ups for close bodies.
	pub charge_distance_min: f64,
	/// Pull of the layout centroid toward the center point (0..1).
	pub center_strength: f64,
	/// Extra space kept between colliding circles.
	pub collide_padding: f64,
	/// Strength of the collision correction (0..1).
	pub collide_strength: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha below which the simulation is settled.
	pub alpha_min: f64,
	/// Per-tick interpolation factor of alpha toward its target.
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 80.0,
			charge_strength: -220.0,
			theta: 0.9,
			charge_distance_min: 1.0,
			center_strength: 1.0,
			collide_padding: 4.0,
			collide_strength: 0.7,
			velocity_decay: 0.4,
			alpha_min,
			// Cool from 1.0 to alpha_min in about 300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// Lifecycle of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
	/// No nodes; nothing to simulate or draw.
	Empty,
	/// Forces are being integrated every tick.
	Simulating,
	/// Cooled below `alpha_min`; positions are frozen until re-heated.
	Settled,
}

/// Small deterministic generator for separating coincident bodies.
#[derive(Clone, Debug)]
struct Jiggle(u64);

impl Jiggle {
	fn next(&mut self) -> f64 {
		self.0 = self
			.0
			.wrapping_mul(6364136223846793005)
			.wrapping_add(1442695040888963407);
		((self.0 >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 1e-6
	}
}

/// The simulation: nodes, links and cooling state.
#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	/// Per-link (strength, bias), recomputed when links change.
	link_params: Vec<(f64, f64)>,
	pub config: ForceConfig,
	alpha: f64,
	alpha_target: f64,
	center: (f64, f64),
	jiggle: Jiggle,
}

impl Simulation {
	pub fn new(config: ForceConfig) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			link_params: Vec::new(),
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			center: (0.0, 0.0),
			jiggle: Jiggle(0x9e37_79b9_7f4a_7c15),
		}
	}

	/// Adds a node on a phyllotaxis spiral around the center and returns its index.
	pub fn add_node(&mut self, radius: f64) -> usize {
		let i = self.nodes.len();
		let r = 10.0 * (0.5 + i as f64).sqrt();
		let angle = i as f64 * PI * (3.0 - 5.0_f64.sqrt());
		self.nodes.push(SimNode {
			x: self.center.0 + r * angle.cos(),
			y: self.center.1 + r * angle.sin(),
			radius,
			..Default::default()
		});
		i
	}

	/// Adds a spring between two existing nodes. Self links and out-of-range
	/// indices are ignored.
	pub fn add_link(&mut self, source: usize, target: usize) {
		if source == target || source >= self.nodes.len() || target >= self.nodes.len() {
			return;
		}
		self.links.push(SimLink { source, target });
		self.recompute_link_params();
	}

	/// Replaces all links at once.
	pub fn set_links(&mut self, links: impl IntoIterator<Item = (usize, usize)>) {
		let n = self.nodes.len();
		self.links = links
			.into_iter()
			.filter(|&(s, t)| s != t && s < n && t < n)
			.map(|(source, target)| SimLink { source, target })
			.collect();
		self.recompute_link_params();
	}

	fn recompute_link_params(&mut self) {
		let mut degree = vec![0usize; self.nodes.len()];
		for link in &self.links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		self.link_params = self
			.links
			.iter()
			.map(|link| {
				let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
				(1.0 / ds.min(dt), ds / (ds + dt))
			})
			.collect();
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, idx: usize) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn phase(&self) -> SimulationPhase {
		if self.nodes.is_empty() {
			SimulationPhase::Empty
		} else if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
			SimulationPhase::Settled
		} else {
			SimulationPhase::Simulating
		}
	}

	/// Raises alpha to at least `alpha` so the layout starts moving again.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha.min(1.0));
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Moves the point the centering force pulls toward. Positions are kept.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Fixes a node at `(x, y)` until [`Simulation::unpin`] is called.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Advances one step. Returns `false` without touching anything when the
	/// simulation is empty or settled.
	pub fn tick(&mut self) -> bool {
		if self.phase() != SimulationPhase::Simulating {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.apply_collision();

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
		true
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		let distance = self.config.link_distance;
		for (link, &(strength, bias)) in self.links.iter().zip(&self.link_params) {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.jiggle.next();
			}
			if dy == 0.0 {
				dy = self.jiggle.next();
			}
			let len = (dx * dx + dy * dy).sqrt();
			let l = (len - distance) / len * alpha * strength;
			dx *= l;
			dy *= l;

			let t = &mut self.nodes[link.target];
			t.vx -= dx * bias;
			t.vy -= dy * bias;
			let s = &mut self.nodes[link.source];
			s.vx += dx * (1.0 - bias);
			s.vy += dy * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self) {
		if self.config.charge_strength == 0.0 {
			return;
		}
		let points: Vec<Point> = self
			.nodes
			.iter()
			.map(|n| Point {
				x: n.x,
				y: n.y,
				weight: self.config.charge_strength,
				radius: n.radius,
			})
			.collect();
		let tree = QuadTree::build(&points);
		if tree.root().is_none() {
			return;
		}

		let theta2 = self.config.theta * self.config.theta;
		let dmin2 = self.config.charge_distance_min * self.config.charge_distance_min;
		let alpha = self.alpha;

		for i in 0..self.nodes.len() {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut fx, mut fy) = (0.0, 0.0);
			let mut stack = vec![0];
			while let Some(q) = stack.pop() {
				let quad = tree.quad(q);
				if quad.weight == 0.0 {
					continue;
				}
				let (mut dx, mut dy) = (quad.cx - xi, quad.cy - yi);
				let mut l = dx * dx + dy * dy;

				// Far enough away: treat the whole cell as one body.
				if !quad.is_leaf() && quad.size * quad.size / theta2 < l {
					if l < dmin2 {
						l = (dmin2 * l).sqrt();
					}
					fx += dx * quad.weight * alpha / l;
					fy += dy * quad.weight * alpha / l;
					continue;
				}

				if !quad.is_leaf() {
					stack.extend(quad.children());
					continue;
				}

				for &j in &quad.points {
					if j == i {
						continue;
					}
					dx = points[j].x - xi;
					dy = points[j].y - yi;
					if dx == 0.0 {
						dx = self.jiggle.next();
					}
					if dy == 0.0 {
						dy = self.jiggle.next();
					}
					l = dx * dx + dy * dy;
					if l < dmin2 {
						l = (dmin2 * l).sqrt();
					}
					fx += dx * points[j].weight * alpha / l;
					fy += dy * points[j].weight * alpha / l;
				}
			}
			self.nodes[i].vx += fx;
			self.nodes[i].vy += fy;
		}
	}

	fn apply_center(&mut self) {
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (shift_x, shift_y) = (
			(sx / n - self.center.0) * self.config.center_strength,
			(sy / n - self.center.1) * self.config.center_strength,
		);
		for node in &mut self.nodes {
			node.x -= shift_x;
			node.y -= shift_y;
		}
	}

	fn apply_collision(&mut self) {
		if self.config.collide_strength == 0.0 {
			return;
		}
		let pad = self.config.collide_padding;
		let points: Vec<Point> = self
			.nodes
			.iter()
			.map(|n| Point {
				x: n.x + n.vx,
				y: n.y + n.vy,
				weight: 1.0,
				radius: n.radius + pad,
			})
			.collect();
		let tree = QuadTree::build(&points);
		if tree.root().is_none() {
			return;
		}

		for i in 0..self.nodes.len() {
			let ri = points[i].radius;
			let ri2 = ri * ri;
			let (xi, yi) = (self.nodes[i].x + self.nodes[i].vx, self.nodes[i].y + self.nodes[i].vy);

			let mut stack = vec![0];
			while let Some(q) = stack.pop() {
				let quad = tree.quad(q);
				let reach = ri + quad.max_radius;
				if quad.x0 > xi + reach
					|| quad.x1() < xi - reach
					|| quad.y0 > yi + reach
					|| quad.y1() < yi - reach
				{
					continue;
				}
				if !quad.is_leaf() {
					stack.extend(quad.children());
					continue;
				}

				for &j in &quad.points {
					// Each pair is resolved once, from its lower index.
					if j <= i {
						continue;
					}
					let rj = points[j].radius;
					let r = ri + rj;
					let other = &self.nodes[j];
					let mut dx = xi - other.x - other.vx;
					let mut dy = yi - other.y - other.vy;
					let mut l = dx * dx + dy * dy;
					if l >= r * r {
						continue;
					}
					if dx == 0.0 {
						dx = self.jiggle.next();
						l += dx * dx;
					}
					if dy == 0.0 {
						dy = self.jiggle.next();
						l += dy * dy;
					}
					let len = l.sqrt();
					let k = (r - len) / len * self.config.collide_strength;
					dx *= k;
					dy *= k;
					let rj2 = rj * rj;
					let share = rj2 / (ri2 + rj2);

					let node = &mut self.nodes[i];
					node.vx += dx * share;
					node.vy += dy * share;
					let other = &mut self.nodes[j];
					other.vx -= dx * (1.0 - share);
					other.vy -= dy * (1.0 - share);
				}
			}
		}
	}
}

impl Default for Simulation {
	fn default() -> Self {
		Self::new(ForceConfig::default())
	}
}
