//! Zoom bounds and zoom-dependent sizing of graph visuals.
//!
//! Drawing happens in world space after the view transform is applied, so a
//! value that should look constant on screen has to be divided by the zoom
//! factor `k`. [`SizeRule`] captures the three ways a size can respond to
//! zoom; [`ScaledValues`] resolves a [`ScaleConfig`] for one frame.
//!
//! Drawn node radii never exceed the space the collision force reserves for a
//! node, so circles do not overlap when zoomed far out.

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Clamps a zoom factor into [`MIN_ZOOM`, `MAX_ZOOM`].
pub fn clamp_zoom(k: f64) -> f64 {
	k.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// How a size responds to zoom.
#[derive(Clone, Debug, PartialEq)]
pub enum SizeRule {
	/// Fixed in world units: grows on screen when zooming in.
	World,
	/// Fixed in screen pixels.
	Screen,
	/// World units, but never smaller or larger than the given screen sizes.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl SizeRule {
	/// World-space size for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			SizeRule::World => base,
			SizeRule::Screen => base / k,
			SizeRule::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Linear fade between two zoom levels: 0 at `hidden_k`, 1 at `visible_k`.
#[derive(Clone, Debug, PartialEq)]
pub struct Fade {
	pub hidden_k: f64,
	pub visible_k: f64,
}

impl Fade {
	pub fn apply(&self, k: f64) -> f64 {
		if self.hidden_k == self.visible_k {
			return 1.0;
		}
		((k - self.hidden_k) / (self.visible_k - self.hidden_k)).clamp(0.0, 1.0)
	}
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius in world units for files without external dependencies.
	pub node_radius: f64,
	/// Node radius for files with external dependencies.
	pub node_radius_external: f64,
	pub node_rule: SizeRule,
	/// Extra pick tolerance around a node, in screen pixels.
	pub hit_slop: f64,
	/// Edge stroke width in screen pixels.
	pub edge_width: f64,
	/// Arrow head length in world units.
	pub arrow_size: f64,
	pub arrow_rule: SizeRule,
	pub arrow_fade: Fade,
	/// Filename label font size in screen pixels.
	pub label_size: f64,
	/// Labels of non-highlighted nodes fade in with zoom.
	pub label_fade: Fade,
	/// Hover/selection ring stroke width and gap, in screen pixels.
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 6.0,
			node_radius_external: 9.0,
			node_rule: SizeRule::Clamped {
				min_screen: 2.5,
				max_screen: 40.0,
			},
			hit_slop: 4.0,
			edge_width: 1.2,
			arrow_size: 6.0,
			arrow_rule: SizeRule::Clamped {
				min_screen: 0.0,
				max_screen: 16.0,
			},
			arrow_fade: Fade {
				hidden_k: 0.25,
				visible_k: 0.6,
			},
			label_size: 11.0,
			label_fade: Fade {
				hidden_k: 0.9,
				visible_k: 1.4,
			},
			ring_width: 1.5,
			ring_offset: 2.5,
		}
	}
}

impl ScaleConfig {
	/// Base world radius of a node.
	pub fn base_radius(&self, has_external_dependencies: bool) -> f64 {
		if has_external_dependencies {
			self.node_radius_external
		} else {
			self.node_radius
		}
	}
}

/// A [`ScaleConfig`] resolved for one zoom level. Build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub hit_slop: f64,
	pub edge_width: f64,
	pub arrow_size: f64,
	pub arrow_alpha: f64,
	pub label_font: String,
	pub label_alpha: f64,
	pub ring_width: f64,
	pub ring_offset: f64,
	node_rule: SizeRule,
	/// Padding the collision force adds around each node, in world units.
	collide_padding: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			hit_slop: config.hit_slop / k,
			edge_width: config.edge_width / k,
			arrow_size: config.arrow_rule.apply(config.arrow_size, k),
			arrow_alpha: config.arrow_fade.apply(k),
			label_font: format!("{}px sans-serif", config.label_size / k),
			label_alpha: config.label_fade.apply(k),
			ring_width: config.ring_width / k,
			ring_offset: config.ring_offset / k,
			node_rule: config.node_rule.clone(),
			collide_padding: 0.0,
		}
	}

	/// Lets drawn nodes grow into the collision padding before being capped.
	pub fn with_collide_padding(mut self, padding: f64) -> Self {
		self.collide_padding = padding.max(0.0);
		self
	}

	/// Drawn radius for a node whose collision radius is `base`.
	pub fn node_radius(&self, base: f64) -> f64 {
		self.node_rule
			.apply(base, self.k)
			.min(base + self.collide_padding)
	}
}
