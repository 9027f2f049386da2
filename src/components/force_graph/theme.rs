//! Colors and visual style for the dependency graph.

use std::collections::HashMap;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Moves toward white (0.0 = unchanged, 1.0 = white).
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Moves toward black (0.0 = unchanged, 1.0 = black).
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a + (other.a - self.a) * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Node fill colors for well-known languages, keyed by the lowercase name the
/// parser reports.
pub fn language_colors() -> HashMap<&'static str, Color> {
	[
		("python", Color::rgb(55, 118, 171)),
		("javascript", Color::rgb(222, 196, 61)),
		("typescript", Color::rgb(49, 120, 198)),
		("go", Color::rgb(0, 173, 216)),
		("rust", Color::rgb(206, 112, 72)),
		("java", Color::rgb(176, 114, 25)),
		("php", Color::rgb(119, 123, 180)),
		("cpp", Color::rgb(243, 75, 125)),
		("c", Color::rgb(85, 85, 85)),
		("ruby", Color::rgb(204, 52, 45)),
		("csharp", Color::rgb(104, 33, 122)),
	]
	.into_iter()
	.collect()
}

#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Center color of the radial gradient.
	pub color_secondary: Color,
	pub use_gradient: bool,
	/// Edge darkening (0.0 = none).
	pub vignette: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Neutral color of edges at rest.
	pub color: Color,
	/// Opacity of edges not incident to the hovered node.
	pub dimmed_alpha: f64,
	/// Color of edges incident to the hovered node.
	pub accent: Color,
}

#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub use_gradient: bool,
	/// Fill for nodes without a recognised language.
	pub unknown_color: Color,
	/// Fallback palette for languages missing from [`language_colors`].
	pub palette: Vec<Color>,
	pub border_color: Color,
	/// Opacity of nodes outside the hovered neighbourhood.
	pub dimmed_alpha: f64,
	pub ring_color: Color,
	pub selected_ring_color: Color,
	pub label_color: Color,
}

#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	languages: HashMap<&'static str, Color>,
}

impl Theme {
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.55),
				dimmed_alpha: 0.12,
				accent: Color::rgb(255, 170, 60),
			},
			node: NodeStyle {
				use_gradient: true,
				unknown_color: Color::rgb(120, 130, 140),
				palette: vec![
					Color::rgb(94, 129, 172),
					Color::rgb(100, 148, 160),
					Color::rgb(130, 120, 150),
					Color::rgb(125, 145, 140),
					Color::rgb(180, 136, 100),
					Color::rgb(143, 163, 180),
				],
				border_color: Color::rgba(255, 255, 255, 0.25),
				dimmed_alpha: 0.3,
				ring_color: Color::rgb(255, 255, 255),
				selected_ring_color: Color::rgb(255, 170, 60),
				label_color: Color::rgba(235, 240, 245, 0.9),
			},
			languages: language_colors(),
		}
	}

	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(246, 247, 249),
				color_secondary: Color::rgb(255, 255, 255),
				use_gradient: true,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				color: Color::rgba(110, 120, 135, 0.5),
				dimmed_alpha: 0.1,
				accent: Color::rgb(230, 120, 20),
			},
			node: NodeStyle {
				use_gradient: false,
				unknown_color: Color::rgb(160, 165, 172),
				palette: vec![
					Color::rgb(70, 110, 140),
					Color::rgb(80, 130, 150),
					Color::rgb(120, 130, 160),
					Color::rgb(100, 145, 135),
					Color::rgb(180, 120, 100),
					Color::rgb(155, 120, 95),
				],
				border_color: Color::rgba(0, 0, 0, 0.2),
				dimmed_alpha: 0.25,
				ring_color: Color::rgb(40, 44, 52),
				selected_ring_color: Color::rgb(230, 120, 20),
				label_color: Color::rgba(30, 34, 40, 0.9),
			},
			languages: language_colors(),
		}
	}

	/// Picks a theme by name, falling back to dark.
	pub fn by_name(name: &str) -> Self {
		match name {
			"light" => Self::light(),
			_ => Self::dark(),
		}
	}

	/// Fill color for a node of the given language.
	pub fn language_color(&self, language: Option<&str>) -> Color {
		let Some(language) = language.map(str::to_ascii_lowercase) else {
			return self.node.unknown_color;
		};
		if let Some(&c) = self.languages.get(language.as_str()) {
			return c;
		}
		if self.node.palette.is_empty() {
			return self.node.unknown_color;
		}
		// Stable per-name pick so a language keeps its color across reloads.
		let hash = language
			.bytes()
			.fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
		self.node.palette[hash % self.node.palette.len()]
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
