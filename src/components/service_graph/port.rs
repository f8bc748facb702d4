//! Boundary between the interaction core and whatever draws the scene.
//!
//! The controllers never touch meshes, canvases or DOM nodes. They issue
//! commands against a [`RenderPort`] and report [`HostEvent`]s to the
//! embedding application.

use super::error::GraphError;
use super::types::{Link, Vec3};

/// Pointer position in viewport pixels, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
	pub x: f64,
	pub y: f64,
}

impl ScreenPoint {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance_to(self, other: ScreenPoint) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// What a decoration is attached to.
#[derive(Clone, Debug, PartialEq)]
pub enum DecorationTarget {
	Node(String),
	Link(Link),
}

/// How the renderer should dress a decorated element.
#[derive(Clone, Debug, PartialEq)]
pub enum DecorationStyle {
	/// Halo around the selected service.
	Halo,
	/// Highlighted connector from the selected service to a table.
	Connector,
	/// Table placed on the detail ring after expansion.
	RingSlot {
		position: Vec3,
		label: String,
		count: Option<u32>,
	},
}

/// Rendering capability consumed by the viewport controller.
pub trait RenderPort {
	fn place_node(&mut self, id: &str, position: Vec3);

	/// Id of the nearest node under `point`, if any.
	fn raycast_nodes(&self, point: ScreenPoint) -> Option<String>;

	fn decorate(&mut self, target: DecorationTarget, style: DecorationStyle);

	fn clear_decorations(&mut self);

	fn set_camera_azimuth(&mut self, angle: f64);

	fn camera_azimuth(&self) -> f64;

	fn set_camera_distance(&mut self, distance: f64);
}

/// Notifications for the host application (cursor, legend, buttons).
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
	/// The hovered service changed.
	Hover(Option<String>),
	/// A service finished expanding; its neighborhood tables in ring order.
	Expand {
		service_id: String,
		table_ids: Vec<String>,
	},
	/// The view returned to the idle globe.
	Reset,
	/// A pointer interaction was rejected.
	Rejected(GraphError),
}
