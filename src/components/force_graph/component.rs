//! Leptos component wrapping the dependency graph canvas.
//!
//! The component creates an HTML canvas element and forwards mouse/wheel
//! events to the interaction reducer in [`ForceGraphState`]. An animation loop
//! runs via `requestAnimationFrame`, ticking the simulation and repainting only
//! when something changed. Unmounting clears a liveness flag; the loop sees it
//! on its next frame, removes the resize listener and drops itself.
//!
//! In fullscreen mode the window's `resize` event drives resizing. In
//! container mode the loop measures the parent element each frame and follows
//! it, unless both `width` and `height` are fixed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::interaction::PointerEvent;
use super::render;
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::theme::Theme;
use crate::graph::{DependencyGraph, GraphNode};

/// Frame step assumed for the first frame, and the cap after a stall.
const FRAME_DT: f64 = 0.016;
const MAX_FRAME_DT: f64 = 0.1;

/// Bundles graph state with what is needed to paint it.
struct GraphContext {
	state: ForceGraphState,
	theme: Theme,
	ctx: CanvasRenderingContext2d,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Renders an interactive dependency graph on a canvas element.
///
/// Pass the graph via the reactive `data` signal; a new graph replaces the
/// running simulation wholesale. Clicking a node (press and release without
/// dragging) calls `on_select` with the full node. When `selected` is given it
/// drives the selection ring; otherwise the component tracks its own.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<DependencyGraph>,
	#[prop(optional, into)] selected: Option<Signal<Option<String>>>,
	#[prop(optional, into)] on_select: Option<Callback<GraphNode>>,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let theme = theme.unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let started = Rc::new(Cell::new(false));
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (context_init, animate_init, resize_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("depgraph: canvas has no 2d context");
			return;
		};

		let mut state = ForceGraphState::new(&graph, w, h, &theme, ScaleConfig::default());
		if let Some(selected) = selected {
			state.set_selected(selected.get_untracked().as_deref());
		}
		debug!(
			"depgraph: simulating {} nodes, {} edges",
			state.nodes.len(),
			state.edges.len()
		);
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			theme: theme.clone(),
			ctx,
		});

		if started.replace(true) {
			return;
		}

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let measured = canvas_size(&win, &canvas_resize, true, None, None);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					apply_size(&canvas_resize, &mut c.state, measured);
				}
			}));
			if let Some(ref cb) = *resize_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, resize_inner, alive_anim) =
			(context_init.clone(), animate_init.clone(), resize_init.clone(), alive.clone());
		let follow_parent = !fullscreen && (width.is_none() || height.is_none());
		let mut last_frame: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				teardown(&resize_inner);
				context_anim.borrow_mut().take();
				// Dropping our own handle frees the closure once this call returns.
				let _ = animate_inner.borrow_mut().take();
				return;
			}
			let now = js_sys::Date::now();
			let dt = last_frame.map_or(FRAME_DT, |t| ((now - t) / 1000.0).clamp(0.0, MAX_FRAME_DT));
			last_frame = Some(now);
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				if follow_parent {
					if let Some(win) = web_sys::window() {
						let measured = canvas_size(&win, &canvas, false, width, height);
						apply_size(&canvas, &mut c.state, measured);
					}
				}
				if c.state.tick(dt) {
					render::render(&c.state, &c.ctx, &c.theme);
				}
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	if let Some(selected) = selected {
		let context_sel = context.clone();
		Effect::new(move |_| {
			let id = selected.get();
			if let Some(ref mut c) = *context_sel.borrow_mut() {
				c.state.set_selected(id.as_deref());
			}
		});
	}

	let dispatch = {
		let context = context.clone();
		Rc::new(move |event: PointerEvent| {
			let clicked = match *context.borrow_mut() {
				Some(ref mut c) => {
					let clicked = c.state.handle(event);
					if selected.is_none() {
						if let Some(node) = &clicked {
							c.state.set_selected(Some(&node.id));
						}
					}
					clicked
				}
				None => None,
			};
			// Borrow released: the callback may update signals that reach back in.
			if let (Some(node), Some(on_select)) = (clicked, on_select) {
				on_select.run(node);
			}
		})
	};

	let position = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let dispatch_md = dispatch.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = position(&ev) {
			dispatch_md(PointerEvent::Down { x, y });
		}
	};

	let dispatch_mm = dispatch.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = position(&ev) {
			dispatch_mm(PointerEvent::Move { x, y });
		}
	};

	let dispatch_mu = dispatch.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = position(&ev) {
			dispatch_mu(PointerEvent::Up { x, y });
		}
	};

	let dispatch_ml = dispatch.clone();
	let on_mouseleave = move |_: MouseEvent| dispatch_ml(PointerEvent::Leave);

	let dispatch_wh = dispatch;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = position(&ev) {
			dispatch_wh(PointerEvent::Wheel {
				x,
				y,
				delta_y: ev.delta_y(),
			});
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		return (
			dim(window.inner_width(), 800.0),
			dim(window.inner_height(), 600.0),
		);
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

/// Canvas dimensions to switch to, if `measured` differs from `current`.
fn resized(current: (u32, u32), measured: (f64, f64)) -> Option<(u32, u32)> {
	let next = (measured.0.max(1.0) as u32, measured.1.max(1.0) as u32);
	(next != current).then_some(next)
}

/// Resizes the canvas and the graph state when the measured size changed.
fn apply_size(canvas: &HtmlCanvasElement, state: &mut ForceGraphState, measured: (f64, f64)) {
	if let Some((w, h)) = resized((canvas.width(), canvas.height()), measured) {
		canvas.set_width(w);
		canvas.set_height(h);
		state.resize(w as f64, h as f64);
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn teardown(resize_cb: &FrameCallback) {
	if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb.borrow_mut().take()) {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	debug!("depgraph: canvas unmounted, animation stopped");
}
