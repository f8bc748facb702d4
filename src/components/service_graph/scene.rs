//! Canvas-side implementation of the rendering port.
//!
//! Holds what the renderer needs to draw a frame: placed nodes, active
//! decorations and a perspective camera orbiting the Y axis. Picking casts a
//! ray from the camera through the pointer and intersects it with a sphere
//! around every node; the closest hit wins and equal distances resolve to the
//! node placed first.

use super::port::{DecorationStyle, DecorationTarget, RenderPort, ScreenPoint};
use super::types::Vec3;

/// Vertical field of view of the camera.
pub const FOV_Y_DEGREES: f64 = 75.0;

/// Anything closer to the camera than this is not drawn.
const NEAR_PLANE: f64 = 0.1;

/// Radius of the pick sphere around a node, in world units.
const DEFAULT_PICK_RADIUS: f64 = 0.3;

/// A node position as the renderer sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	pub id: String,
	pub position: Vec3,
}

/// A world point projected to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Distance from the camera along its view axis.
	pub depth: f64,
	/// Pixels per world unit at this depth.
	pub scale: f64,
}

/// Scene state backing the canvas renderer.
#[derive(Clone, Debug)]
pub struct CanvasPort {
	nodes: Vec<PlacedNode>,
	decorations: Vec<(DecorationTarget, DecorationStyle)>,
	azimuth: f64,
	distance: f64,
	width: f64,
	height: f64,
	pick_radius: f64,
}

impl CanvasPort {
	pub fn new(width: f64, height: f64, distance: f64) -> Self {
		Self {
			nodes: Vec::new(),
			decorations: Vec::new(),
			azimuth: 0.0,
			distance,
			width,
			height,
			pick_radius: DEFAULT_PICK_RADIUS,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	pub fn distance(&self) -> f64 {
		self.distance
	}

	pub fn nodes(&self) -> &[PlacedNode] {
		&self.nodes
	}

	pub fn decorations(&self) -> &[(DecorationTarget, DecorationStyle)] {
		&self.decorations
	}

	pub fn is_decorated(&self, target: &DecorationTarget) -> bool {
		self.decorations.iter().any(|(t, _)| t == target)
	}

	/// Whether the detail ring is showing instead of the globe.
	pub fn is_detail_view(&self) -> bool {
		self.decorations
			.iter()
			.any(|(_, style)| matches!(style, DecorationStyle::RingSlot { .. }))
	}

	/// Table ids and camera-frame positions of the detail ring.
	pub fn ring_slots(&self) -> impl Iterator<Item = (&str, Vec3)> {
		self.decorations.iter().filter_map(|(target, style)| match (target, style) {
			(DecorationTarget::Node(id), DecorationStyle::RingSlot { position, .. }) => {
				Some((id.as_str(), *position))
			}
			_ => None,
		})
	}

	/// Focal length in pixels for the current viewport height.
	fn focal(&self) -> f64 {
		(self.height / 2.0) / (FOV_Y_DEGREES.to_radians() / 2.0).tan()
	}

	/// World point rotated into the camera frame, camera on +Z.
	fn camera_space(&self, p: Vec3) -> Vec3 {
		let (sin, cos) = self.azimuth.sin_cos();
		Vec3::new(p.x * cos - p.z * sin, p.y, p.x * sin + p.z * cos)
	}

	/// Project a world point; `None` if it is behind the near plane.
	pub fn project(&self, p: Vec3) -> Option<Projected> {
		self.project_camera_space(self.camera_space(p))
	}

	/// Project a point already expressed in the camera frame. The detail
	/// ring is laid out facing the camera and goes through here.
	pub fn project_camera_space(&self, c: Vec3) -> Option<Projected> {
		let depth = self.distance - c.z;
		if depth <= NEAR_PLANE {
			return None;
		}
		let scale = self.focal() / depth;
		Some(Projected {
			x: self.width / 2.0 + c.x * scale,
			y: self.height / 2.0 - c.y * scale,
			depth,
			scale,
		})
	}

	fn ray_direction(&self, point: ScreenPoint) -> Option<Vec3> {
		let f = self.focal();
		Vec3::new(
			(point.x - self.width / 2.0) / f,
			-(point.y - self.height / 2.0) / f,
			-1.0,
		)
		.normalized()
	}
}

/// Distance along a unit ray to the first intersection with a sphere.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f64) -> Option<f64> {
	let oc = origin.sub(center);
	let b = oc.dot(dir);
	let c = oc.dot(oc) - radius * radius;
	let disc = b * b - c;
	if disc < 0.0 {
		return None;
	}
	let root = disc.sqrt();
	[-b - root, -b + root].into_iter().find(|t| *t >= 0.0)
}

impl RenderPort for CanvasPort {
	fn place_node(&mut self, id: &str, position: Vec3) {
		match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) => node.position = position,
			None => self.nodes.push(PlacedNode {
				id: id.to_string(),
				position,
			}),
		}
	}

	fn raycast_nodes(&self, point: ScreenPoint) -> Option<String> {
		let dir = self.ray_direction(point)?;
		let origin = Vec3::new(0.0, 0.0, self.distance);

		// The detail view hides the globe; only ring slots can be hit.
		let candidates: Vec<(&str, Vec3)> = if self.is_detail_view() {
			self.ring_slots().collect()
		} else {
			self.nodes
				.iter()
				.map(|n| (n.id.as_str(), self.camera_space(n.position)))
				.collect()
		};

		let mut best: Option<(f64, &str)> = None;
		for (id, center) in candidates {
			let Some(t) = ray_sphere(origin, dir, center, self.pick_radius) else {
				continue;
			};
			if best.is_none_or(|(best_t, _)| t < best_t) {
				best = Some((t, id));
			}
		}
		best.map(|(_, id)| id.to_string())
	}

	fn decorate(&mut self, target: DecorationTarget, style: DecorationStyle) {
		self.decorations.push((target, style));
	}

	fn clear_decorations(&mut self) {
		self.decorations.clear();
	}

	fn set_camera_azimuth(&mut self, angle: f64) {
		self.azimuth = angle;
	}

	fn camera_azimuth(&self) -> f64 {
		self.azimuth
	}

	fn set_camera_distance(&mut self, distance: f64) {
		self.distance = distance;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::f64::consts::FRAC_PI_2;

	fn port() -> CanvasPort {
		CanvasPort::new(800.0, 600.0, 11.0)
	}

	fn screen_of(port: &CanvasPort, p: Vec3) -> ScreenPoint {
		let projected = port.project(p).unwrap();
		ScreenPoint::new(projected.x, projected.y)
	}

	#[test]
	fn test_front_node_projects_to_center() {
		let port = port();
		let p = port.project(Vec3::new(0.0, 0.0, 3.0)).unwrap();
		assert_eq!((p.x, p.y), (400.0, 300.0));
		assert_eq!(p.depth, 8.0);
	}

	#[test]
	fn test_up_is_up_on_screen() {
		let port = port();
		let p = port.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
		assert!(p.y < 300.0);
		let q = port.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
		assert!(q.x > 400.0);
	}

	#[test]
	fn test_azimuth_brings_node_to_front() {
		let mut port = port();
		let side = Vec3::new(3.0, 0.0, 0.0);
		port.set_camera_azimuth(side.azimuth());
		let p = port.project(side).unwrap();
		assert!((p.x - 400.0).abs() < 1e-9);
		assert!((p.depth - 8.0).abs() < 1e-9);
		assert_eq!(port.camera_azimuth(), FRAC_PI_2);
	}

	#[test]
	fn test_points_behind_camera_are_culled() {
		let port = port();
		assert_eq!(port.project(Vec3::new(0.0, 0.0, 20.0)), None);
	}

	#[test]
	fn test_raycast_hits_placed_node() {
		let mut port = port();
		port.place_node("a", Vec3::new(1.5, -0.5, 2.0));
		let hit = port.raycast_nodes(screen_of(&port, Vec3::new(1.5, -0.5, 2.0)));
		assert_eq!(hit.as_deref(), Some("a"));
		assert_eq!(port.raycast_nodes(ScreenPoint::new(5.0, 5.0)), None);
	}

	#[test]
	fn test_raycast_prefers_nearest_node() {
		let mut port = port();
		port.place_node("back", Vec3::new(0.0, 0.0, -3.0));
		port.place_node("front", Vec3::new(0.0, 0.0, 3.0));
		assert_eq!(
			port.raycast_nodes(ScreenPoint::new(400.0, 300.0)).as_deref(),
			Some("front")
		);

		port.set_camera_azimuth(std::f64::consts::PI);
		assert_eq!(
			port.raycast_nodes(ScreenPoint::new(400.0, 300.0)).as_deref(),
			Some("back")
		);
	}

	#[test]
	fn test_place_node_replaces_existing_position() {
		let mut port = port();
		port.place_node("a", Vec3::ZERO);
		port.place_node("a", Vec3::new(0.0, 1.0, 0.0));
		assert_eq!(
			port.nodes(),
			&[PlacedNode {
				id: "a".into(),
				position: Vec3::new(0.0, 1.0, 0.0),
			}]
		);
	}

	#[test]
	fn test_decorations_are_recorded_and_cleared() {
		let mut port = port();
		port.decorate(DecorationTarget::Node("s1".into()), DecorationStyle::Halo);
		assert!(port.is_decorated(&DecorationTarget::Node("s1".into())));
		assert!(!port.is_detail_view());

		port.decorate(
			DecorationTarget::Node("t1".into()),
			DecorationStyle::RingSlot {
				position: Vec3::new(0.0, 3.0, 0.0),
				label: "Users".into(),
				count: Some(5),
			},
		);
		assert!(port.is_detail_view());

		port.clear_decorations();
		assert!(port.decorations().is_empty());
	}

	#[test]
	fn test_detail_view_only_hits_ring_slots() {
		let mut port = port();
		port.place_node("s1", Vec3::new(0.0, 0.0, 3.0));
		port.decorate(
			DecorationTarget::Node("t1".into()),
			DecorationStyle::RingSlot {
				position: Vec3::new(0.0, 3.0, 0.0),
				label: "Users".into(),
				count: Some(5),
			},
		);

		assert_eq!(port.raycast_nodes(ScreenPoint::new(400.0, 300.0)), None);
		let slot = port.project_camera_space(Vec3::new(0.0, 3.0, 0.0)).unwrap();
		assert_eq!(
			port.raycast_nodes(ScreenPoint::new(slot.x, slot.y)).as_deref(),
			Some("t1")
		);
	}
}
