//! Canvas rendering for the dependency graph.
//!
//! Reads node positions straight from the simulation every frame; nothing is
//! cached between frames. Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Resting edges, then highlighted edges on top (world space)
//! 3. Nodes, rings and labels
//! 4. Vignette (screen space)

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::state::ForceGraphState;
use super::theme::{Color, Theme};

/// Eases a 0..1 intensity so transitions start and end softly.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(state, ctx, theme);

	if state.is_empty() {
		return;
	}

	let scale = state.scaled();
	let lit = node_highlight(state);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme, &lit);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

/// Per-node brightness: the focused node and every node sharing an edge with it.
fn node_highlight(state: &ForceGraphState) -> Vec<f64> {
	let mut lit: Vec<f64> = (0..state.nodes.len())
		.map(|i| state.highlight.node_intensity(i))
		.collect();
	if state.highlight.max_intensity() <= 0.0 {
		return lit;
	}
	for &(s, t) in &state.edges {
		let e = state.highlight.edge_intensity(s, t);
		lit[s] = lit[s].max(e);
		lit[t] = lit[t].max(e);
	}
	lit
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8))
		.and_then(Result::ok);

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let Ok(gradient) = ctx.create_radial_gradient(
		cx,
		cy,
		state.width.min(state.height) * 0.3,
		cx,
		cy,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(1.0, &Color::rgba(0, 0, 0, theme.background.vignette).to_css());

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let rest = theme.edge.color;
	let dimmed = rest.with_alpha(rest.a + (theme.edge.dimmed_alpha - rest.a) * max_t);

	// Pass 1: everything not touching the focus, dimmed while a highlight is up.
	let mut highlighted = Vec::new();
	for (i, &(s, t)) in state.edges.iter().enumerate() {
		let edge_t = smooth_step(state.highlight.edge_intensity(s, t));
		if edge_t > 0.001 {
			highlighted.push((i, edge_t));
			continue;
		}
		draw_edge(state, ctx, scale, s, t, dimmed, scale.edge_width);
	}

	// Pass 2: incident edges on top, blending toward the accent color.
	for (i, edge_t) in highlighted {
		let (s, t) = state.edges[i];
		let color = dimmed.lerp(theme.edge.accent, edge_t);
		draw_edge(state, ctx, scale, s, t, color, scale.edge_width * (1.0 + 0.5 * edge_t));
	}
}

fn draw_edge(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	source: usize,
	target: usize,
	color: Color,
	width: f64,
) {
	let nodes = state.sim.nodes();
	let (Some(a), Some(b)) = (nodes.get(source), nodes.get(target)) else {
		return;
	};
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let r_source = scale.node_radius(a.radius);
	let r_target = scale.node_radius(b.radius);
	let arrow_alpha = scale.arrow_alpha;
	let arrow = if arrow_alpha > 0.0 { scale.arrow_size } else { 0.0 };

	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(a.x + ux * r_source, a.y + uy * r_source);
	ctx.line_to(b.x - ux * (r_target + arrow), b.y - uy * (r_target + arrow));
	ctx.stroke();

	if arrow > 0.0 {
		ctx.set_fill_style_str(&color.with_alpha(color.a * arrow_alpha).to_css());
		let (tip_x, tip_y) = (b.x - ux * r_target, b.y - uy * r_target);
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	lit: &[f64],
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let dim_alpha = 1.0 + (theme.node.dimmed_alpha - 1.0) * max_t;

	// Dimmed nodes first, highlighted ones on top.
	let (bright, rest): (Vec<usize>, Vec<usize>) = (0..state.nodes.len()).partition(|&i| lit[i] > 0.001);
	for i in rest.into_iter().chain(bright) {
		let node_t = smooth_step(lit[i]);
		let alpha = dim_alpha + (1.0 - dim_alpha) * node_t;
		draw_node(state, ctx, scale, theme, i, alpha, node_t);
	}
}

fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	idx: usize,
	alpha: f64,
	node_t: f64,
) {
	let (Some(node), Some(info)) = (state.sim.node(idx), state.info.get(idx)) else {
		return;
	};
	let (x, y) = (node.x, node.y);
	let focus_t = smooth_step(state.highlight.node_intensity(idx));
	let radius = scale.node_radius(node.radius) * (1.0 + 0.15 * node_t + 0.15 * focus_t);
	let color = info.color;

	ctx.set_global_alpha(alpha);

	let gradient = theme
		.node
		.use_gradient
		.then(|| ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius))
		.and_then(Result::ok);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();

	ctx.set_stroke_style_str(&theme.node.border_color.to_css());
	ctx.set_line_width(1.0 / scale.k);
	ctx.stroke();

	ctx.set_global_alpha(1.0);

	if focus_t > 0.01 {
		draw_ring(
			ctx,
			x,
			y,
			radius + scale.ring_offset,
			theme.node.ring_color.with_alpha(0.8 * focus_t),
			scale.ring_width,
		);
	}
	if state.selected == Some(idx) {
		draw_ring(
			ctx,
			x,
			y,
			radius + scale.ring_offset * 2.0,
			theme.node.selected_ring_color,
			scale.ring_width * 1.5,
		);
	}

	let label_alpha = scale.label_alpha.max(node_t) * alpha;
	if label_alpha > 0.05 && !info.label.is_empty() {
		let label_color = theme.node.label_color;
		ctx.set_fill_style_str(&label_color.with_alpha(label_color.a * label_alpha).to_css());
		ctx.set_font(&scale.label_font);
		let _ = ctx.fill_text(&info.label, x + radius + 4.0 / scale.k, y + 3.0 / scale.k);
	}
}

fn draw_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: Color, width: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	ctx.stroke();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn smooth_step_is_anchored() {
		assert_eq!(smooth_step(0.0), 0.0);
		assert_eq!(smooth_step(1.0), 1.0);
		assert_eq!(smooth_step(0.5), 0.5);
	}
}
