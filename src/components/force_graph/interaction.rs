//! Pointer interaction as a single reducer.
//!
//! Raw pointer events go in together with the node under the pointer (if
//! any); the reducer updates its mode and returns the [`Command`]s the graph
//! state must carry out. The mode is the only interaction state: there are no
//! separate drag/pan/hover flags to keep in sync.

/// Pointer input in canvas (screen) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	Down { x: f64, y: f64 },
	Move { x: f64, y: f64 },
	Up { x: f64, y: f64 },
	Leave,
	Wheel { x: f64, y: f64, delta_y: f64 },
}

/// What the pointer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionMode {
	#[default]
	Idle,
	Hovering(usize),
	Dragging {
		node: usize,
		origin_x: f64,
		origin_y: f64,
		moved: bool,
	},
	Panning {
		last_x: f64,
		last_y: f64,
	},
}

/// Side effects requested by the reducer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
	/// Change the hovered node.
	Hover(Option<usize>),
	/// Pin the node where it is and keep the simulation warm.
	DragStart { node: usize, x: f64, y: f64 },
	/// Move the pinned node with the pointer.
	DragTo { node: usize, x: f64, y: f64 },
	/// Release the pin and let the simulation cool.
	DragEnd { node: usize },
	/// Translate the view by a screen-space delta.
	Pan { dx: f64, dy: f64 },
	/// Scale the view by `factor` around a screen point.
	Zoom { x: f64, y: f64, factor: f64 },
	/// The node was clicked.
	Select(usize),
}

/// Pointer travel (pixels) below which a press and release counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

/// Zoom step applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

#[derive(Clone, Debug, Default)]
pub struct Interaction {
	mode: InteractionMode,
}

impl Interaction {
	pub fn mode(&self) -> InteractionMode {
		self.mode
	}

	/// The node that should drive highlighting: dragged or hovered.
	pub fn focus(&self) -> Option<usize> {
		match self.mode {
			InteractionMode::Hovering(n) | InteractionMode::Dragging { node: n, .. } => Some(n),
			_ => None,
		}
	}

	pub fn dragged(&self) -> Option<usize> {
		match self.mode {
			InteractionMode::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Forgets everything, e.g. when the graph is replaced.
	pub fn reset(&mut self) {
		self.mode = InteractionMode::Idle;
	}

	/// Applies `event`. `hit` is the node under the pointer for positional
	/// events.
	pub fn reduce(&mut self, event: PointerEvent, hit: Option<usize>) -> Vec<Command> {
		let mut commands = Vec::new();

		if let PointerEvent::Wheel { x, y, delta_y } = event {
			let factor = if delta_y > 0.0 {
				1.0 / WHEEL_ZOOM_STEP
			} else {
				WHEEL_ZOOM_STEP
			};
			commands.push(Command::Zoom { x, y, factor });
			return commands;
		}

		let focus_before = self.focus();

		self.mode = match (self.mode, event) {
			(InteractionMode::Dragging { node, .. }, PointerEvent::Leave) => {
				commands.push(Command::DragEnd { node });
				InteractionMode::Idle
			}
			(_, PointerEvent::Leave) => InteractionMode::Idle,

			(
				InteractionMode::Dragging {
					node,
					origin_x,
					origin_y,
					moved,
				},
				PointerEvent::Move { x, y },
			) => {
				let moved = moved || (x - origin_x).hypot(y - origin_y) >= CLICK_SLOP;
				if moved {
					commands.push(Command::DragTo { node, x, y });
				}
				InteractionMode::Dragging {
					node,
					origin_x,
					origin_y,
					moved,
				}
			}
			(InteractionMode::Dragging { node, moved, .. }, PointerEvent::Up { .. }) => {
				commands.push(Command::DragEnd { node });
				if !moved {
					commands.push(Command::Select(node));
				}
				hovering(hit)
			}
			(mode @ InteractionMode::Dragging { .. }, PointerEvent::Down { .. }) => mode,

			(InteractionMode::Panning { last_x, last_y }, PointerEvent::Move { x, y }) => {
				commands.push(Command::Pan {
					dx: x - last_x,
					dy: y - last_y,
				});
				InteractionMode::Panning {
					last_x: x,
					last_y: y,
				}
			}
			(InteractionMode::Panning { .. }, PointerEvent::Up { .. }) => hovering(hit),
			(mode @ InteractionMode::Panning { .. }, PointerEvent::Down { .. }) => mode,

			(_, PointerEvent::Down { x, y }) => match hit {
				Some(node) => {
					commands.push(Command::DragStart { node, x, y });
					InteractionMode::Dragging {
						node,
						origin_x: x,
						origin_y: y,
						moved: false,
					}
				}
				None => InteractionMode::Panning {
					last_x: x,
					last_y: y,
				},
			},
			(_, PointerEvent::Move { .. }) | (_, PointerEvent::Up { .. }) => hovering(hit),

			(mode, PointerEvent::Wheel { .. }) => mode,
		};

		let focus_after = self.focus();
		if focus_after != focus_before {
			// Hover changes go first so highlighting follows the pointer before
			// any drag side effects are applied.
			commands.insert(0, Command::Hover(focus_after));
		}
		commands
	}
}

fn hovering(hit: Option<usize>) -> InteractionMode {
	hit.map_or(InteractionMode::Idle, InteractionMode::Hovering)
}
