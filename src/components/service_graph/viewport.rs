//! Pointer and camera handling for one widget instance.
//!
//! Translates raw pointer events into selection transitions, forwards the
//! selection's intents to the rendering port, and keeps the camera state
//! (azimuth, distance) that the host cannot derive on its own. Clicks are
//! dispatched through a per-node action table; rendering objects only carry
//! ids.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::{debug, info, warn};

use super::config::WidgetConfig;
use super::error::GraphError;
use super::graph::Graph;
use super::layout::SphereLayout;
use super::port::{DecorationStyle, DecorationTarget, HostEvent, RenderPort, ScreenPoint};
use super::selection::{Intent, Phase, SelectionController};
use super::types::{Dataset, NodeKind};

/// What a click on a node does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeAction {
	/// Highlight, rotate to and expand the service.
	Expand,
	/// Nothing; tables only carry labels.
	Inert,
}

/// Result of a click, mostly useful to hosts that give feedback.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
	Selected(String),
	/// Nothing under the pointer.
	Missed,
	/// The click ended a drag and was swallowed.
	Dragging,
	/// A selection is still highlighting or rotating.
	Busy,
	/// A node without a click action.
	Inert(String),
	Rejected(GraphError),
}

/// Tracks a press that may turn into a drag of the camera.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub pressed: bool,
	pub active: bool,
	pub origin: ScreenPoint,
	/// Swallow the click the browser fires right after a drag release.
	suppress_click: bool,
}

/// Owns the graph, the selection state and the camera of one widget.
pub struct ViewportController<P: RenderPort> {
	graph: Graph,
	config: WidgetConfig,
	selection: SelectionController,
	port: P,
	actions: HashMap<String, NodeAction>,
	drag: DragState,
	hovered: Option<String>,
	distance: f64,
	events: Vec<HostEvent>,
}

impl<P: RenderPort> ViewportController<P> {
	/// Lay out `graph`, place every node on `port` and set the default camera.
	pub fn new(mut graph: Graph, config: WidgetConfig, mut port: P) -> Result<Self, GraphError> {
		config.validate()?;

		let layout = SphereLayout::from_config(&config);
		graph.apply_layout(&layout);
		for node in graph.nodes() {
			port.place_node(&node.id, node.position);
		}
		port.set_camera_azimuth(config.default_azimuth);
		port.set_camera_distance(config.camera_distance);

		let actions = graph
			.nodes()
			.iter()
			.map(|node| {
				let action = match node.kind {
					NodeKind::Service => NodeAction::Expand,
					NodeKind::Table => NodeAction::Inert,
				};
				(node.id.clone(), action)
			})
			.collect();
		let radius = layout.radius(graph.len());
		info!(
			"service-sphere: placed {} nodes on a sphere of radius {radius}",
			graph.len()
		);

		Ok(Self {
			selection: SelectionController::new(&config, radius),
			distance: config.camera_distance,
			graph,
			config,
			port,
			actions,
			drag: DragState::default(),
			hovered: None,
			events: Vec::new(),
		})
	}

	/// Build the graph from a dataset, then behave like [`Self::new`].
	pub fn from_dataset(dataset: &Dataset, config: WidgetConfig, port: P) -> Result<Self, GraphError> {
		let graph = Graph::build(dataset.services())?;
		Self::new(graph, config, port)
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn config(&self) -> &WidgetConfig {
		&self.config
	}

	pub fn selection(&self) -> &SelectionController {
		&self.selection
	}

	pub fn phase(&self) -> Phase {
		self.selection.phase()
	}

	pub fn port(&self) -> &P {
		&self.port
	}

	pub fn port_mut(&mut self) -> &mut P {
		&mut self.port
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn distance(&self) -> f64 {
		self.distance
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.active
	}

	/// Take the host events raised since the last call.
	pub fn take_events(&mut self) -> Vec<HostEvent> {
		std::mem::take(&mut self.events)
	}

	pub fn pointer_down(&mut self, point: ScreenPoint) {
		self.drag = DragState {
			pressed: true,
			active: false,
			origin: point,
			suppress_click: false,
		};
	}

	/// Update drag tracking and return the service under the pointer.
	///
	/// Nothing is hovered while a drag is active or a service is expanded.
	pub fn pointer_move(&mut self, point: ScreenPoint) -> Option<String> {
		if self.drag.pressed
			&& !self.drag.active
			&& point.distance_to(self.drag.origin) > self.config.drag_threshold
		{
			self.begin_drag();
		}

		let hovered = if self.drag.active || self.selection.phase() == Phase::Expanded {
			None
		} else {
			self.port
				.raycast_nodes(point)
				.filter(|id| self.actions.get(id) == Some(&NodeAction::Expand))
		};
		self.set_hover(hovered.clone());
		hovered
	}

	pub fn pointer_up(&mut self) {
		self.end_drag();
		self.drag.pressed = false;
	}

	/// The pointer left the viewport: drop hover and any drag in progress.
	pub fn pointer_leave(&mut self) {
		self.drag = DragState::default();
		self.set_hover(None);
	}

	/// Start a camera drag. Node clicks are ignored until [`Self::end_drag`].
	pub fn begin_drag(&mut self) {
		if !self.drag.active {
			debug!("service-sphere: drag started");
		}
		self.drag.active = true;
		self.set_hover(None);
	}

	pub fn end_drag(&mut self) {
		if self.drag.active {
			debug!("service-sphere: drag ended");
			self.drag.active = false;
			self.drag.suppress_click = true;
		}
	}

	/// Resolve the node under `point` and dispatch its action.
	pub fn pointer_click(&mut self, point: ScreenPoint) -> ClickOutcome {
		if self.drag.active || std::mem::take(&mut self.drag.suppress_click) {
			return ClickOutcome::Dragging;
		}
		if self.selection.phase().is_transitioning() {
			debug!("service-sphere: click ignored during transition");
			return ClickOutcome::Busy;
		}
		let Some(id) = self.port.raycast_nodes(point) else {
			return ClickOutcome::Missed;
		};

		match self.actions.get(&id) {
			Some(NodeAction::Expand) => match self.select_service(&id) {
				Ok(()) => ClickOutcome::Selected(id),
				Err(err) => self.reject(err),
			},
			Some(NodeAction::Inert) => ClickOutcome::Inert(id),
			None => self.reject(GraphError::UnknownNode(id)),
		}
	}

	/// Programmatic selection; unlike clicks it is never debounced.
	pub fn select_service(&mut self, service_id: &str) -> Result<(), GraphError> {
		self.selection.select_service(&self.graph, service_id)?;
		self.flush();
		Ok(())
	}

	/// Advance animations by `dt` milliseconds. Call once per frame.
	pub fn tick(&mut self, dt: f64) {
		let azimuth = self.port.camera_azimuth();
		if let Some(next) = self.selection.tick(&self.graph, dt, azimuth) {
			self.port.set_camera_azimuth(next);
		} else if self.selection.phase() == Phase::Idle
			&& !self.drag.active
			&& self.config.rotation_speed > 0.0
		{
			let spun = azimuth + self.config.rotation_speed * dt.max(0.0) / 1000.0;
			self.port.set_camera_azimuth(spun.rem_euclid(TAU));
		}
		self.flush();
	}

	/// Collapse any selection and restore the default camera.
	pub fn reset(&mut self) {
		if self.selection.reset() {
			debug!("service-sphere: selection reset");
		}
		self.flush();
		self.port.set_camera_azimuth(self.config.default_azimuth);
		self.distance = self.config.camera_distance;
		self.port.set_camera_distance(self.distance);
		self.events.push(HostEvent::Reset);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(1.0 / self.config.zoom_factor);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(self.config.zoom_factor);
	}

	/// Wheel zoom: scrolling down moves the camera away.
	pub fn wheel(&mut self, delta_y: f64) {
		if delta_y > 0.0 {
			self.zoom_out();
		} else if delta_y < 0.0 {
			self.zoom_in();
		}
	}

	fn zoom_by(&mut self, factor: f64) {
		self.distance = self.config.clamp_distance(self.distance * factor);
		self.port.set_camera_distance(self.distance);
	}

	fn set_hover(&mut self, hovered: Option<String>) {
		if self.hovered != hovered {
			self.hovered = hovered.clone();
			self.events.push(HostEvent::Hover(hovered));
		}
	}

	fn reject(&mut self, err: GraphError) -> ClickOutcome {
		warn!("service-sphere: click rejected: {err}");
		self.events.push(HostEvent::Rejected(err.clone()));
		ClickOutcome::Rejected(err)
	}

	/// Forward queued selection intents to the port and the host.
	fn flush(&mut self) {
		for intent in self.selection.drain_intents() {
			match intent {
				Intent::DecorateNode(id) => {
					self.port
						.decorate(DecorationTarget::Node(id), DecorationStyle::Halo);
				}
				Intent::DecorateLink(link) => {
					self.port
						.decorate(DecorationTarget::Link(link), DecorationStyle::Connector);
				}
				Intent::ShowDetailRing { service_id, slots } => {
					let table_ids = slots.iter().map(|s| s.table_id.clone()).collect();
					for slot in slots {
						self.port.decorate(
							DecorationTarget::Node(slot.table_id),
							DecorationStyle::RingSlot {
								position: slot.position,
								label: slot.label,
								count: slot.count,
							},
						);
					}
					info!("service-sphere: expanded {service_id}");
					self.events.push(HostEvent::Expand {
						service_id,
						table_ids,
					});
				}
				Intent::ClearAll => self.port.clear_decorations(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::service_graph::fixtures::sample_dataset;
	use crate::components::service_graph::scene::CanvasPort;
	use crate::components::service_graph::selection::shortest_angle;
	use crate::components::service_graph::types::{Link, Vec3};
	use pretty_assertions::assert_eq;
	use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

	const DURATION: f64 = 1000.0;

	fn viewport() -> ViewportController<CanvasPort> {
		let config = WidgetConfig {
			rotate_duration: DURATION,
			rotation_speed: 0.0,
			..WidgetConfig::default()
		};
		let port = CanvasPort::new(config.viewport_width, config.viewport_height, 1.0);
		ViewportController::from_dataset(&sample_dataset(), config, port).unwrap()
	}

	/// Screen position of a node under the current camera.
	fn screen_of(vp: &ViewportController<CanvasPort>, id: &str) -> ScreenPoint {
		let node = vp.graph().node(id).unwrap();
		let p = vp.port().project(node.position).unwrap();
		ScreenPoint::new(p.x, p.y)
	}

	/// Turn the camera so `id` faces it, leaving it unoccluded.
	fn face(vp: &mut ViewportController<CanvasPort>, id: &str) -> ScreenPoint {
		let azimuth = vp.graph().node(id).unwrap().position.azimuth();
		vp.port_mut().set_camera_azimuth(azimuth);
		screen_of(vp, id)
	}

	fn run_to_expanded(vp: &mut ViewportController<CanvasPort>) {
		for _ in 0..100 {
			if vp.phase() == Phase::Expanded {
				return;
			}
			vp.tick(DURATION / 10.0);
		}
		panic!("selection never expanded");
	}

	#[test]
	fn test_new_places_nodes_and_camera() {
		let vp = viewport();
		assert_eq!(vp.port().nodes().len(), vp.graph().len());
		assert_eq!(vp.port().distance(), 11.0);
		assert_eq!(vp.port().camera_azimuth(), 0.0);
		for node in vp.graph().nodes() {
			assert!((node.position.length() - 3.0).abs() < 1e-9);
		}
	}

	#[test]
	fn test_invalid_config_prevents_initialization() {
		let config = WidgetConfig {
			min_radius: 0.0,
			..WidgetConfig::default()
		};
		let port = CanvasPort::new(800.0, 600.0, 11.0);
		let result = ViewportController::from_dataset(&sample_dataset(), config, port);
		assert!(matches!(result, Err(GraphError::MalformedInput(_))));
	}

	#[test]
	fn test_hover_reports_services_only() {
		let mut vp = viewport();
		let at = face(&mut vp, "s1");
		assert_eq!(vp.pointer_move(at), Some("s1".to_string()));
		assert_eq!(vp.hovered(), Some("s1"));
		assert_eq!(vp.take_events(), vec![HostEvent::Hover(Some("s1".into()))]);

		// Same target again raises no new event.
		vp.pointer_move(at);
		assert!(vp.take_events().is_empty());

		let table = face(&mut vp, "t3");
		assert_eq!(vp.pointer_move(table), None);
		assert_eq!(vp.take_events(), vec![HostEvent::Hover(None)]);
	}

	#[test]
	fn test_no_hover_while_expanded() {
		let mut vp = viewport();
		// s3 has no tables, so the globe stays visible after expansion.
		vp.select_service("s3").unwrap();
		run_to_expanded(&mut vp);
		assert!(!vp.port().is_detail_view());
		vp.take_events();

		let at = face(&mut vp, "s1");
		assert_eq!(vp.port().raycast_nodes(at).as_deref(), Some("s1"));
		assert_eq!(vp.pointer_move(at), None);
		assert_eq!(vp.hovered(), None);
		assert!(vp.take_events().is_empty());

		vp.reset();
		vp.take_events();
		let at = face(&mut vp, "s1");
		assert_eq!(vp.pointer_move(at), Some("s1".to_string()));
	}

	#[test]
	fn test_click_runs_full_expand_cycle() {
		let mut vp = viewport();
		let at = face(&mut vp, "s2");
		// Start the rotation from a quarter turn away.
		let target = vp.port().camera_azimuth();
		assert_eq!(vp.pointer_click(at), ClickOutcome::Selected("s2".into()));
		vp.port_mut().set_camera_azimuth(target - FRAC_PI_2);

		assert_eq!(vp.phase(), Phase::Highlighting);
		assert!(vp.port().is_decorated(&DecorationTarget::Node("s2".into())));
		assert!(vp.port().is_decorated(&DecorationTarget::Link(Link::new("s2", "t3"))));

		vp.tick(DURATION / 2.0);
		let halfway = vp.port().camera_azimuth();
		assert!((halfway - (target - FRAC_PI_4)).abs() < 1e-9);

		run_to_expanded(&mut vp);
		assert!(shortest_angle(vp.port().camera_azimuth(), target).abs() < 1e-9);
		assert!(vp.port().is_detail_view());
		assert_eq!(
			vp.take_events(),
			vec![HostEvent::Expand {
				service_id: "s2".into(),
				table_ids: vec!["t2".into(), "t3".into()],
			}]
		);
	}

	#[test]
	fn test_clicks_are_debounced_mid_transition() {
		let mut vp = viewport();
		let s1 = face(&mut vp, "s1");
		assert_eq!(vp.pointer_click(s1), ClickOutcome::Selected("s1".into()));
		assert_eq!(vp.pointer_click(s1), ClickOutcome::Busy);
		vp.tick(DURATION / 4.0);
		assert_eq!(vp.phase(), Phase::Rotating);
		assert_eq!(vp.pointer_click(s1), ClickOutcome::Busy);
		assert_eq!(vp.selection().selected(), Some("s1"));
	}

	#[test]
	fn test_drag_suppresses_click() {
		let mut vp = viewport();
		let at = face(&mut vp, "s1");

		vp.pointer_down(at);
		vp.pointer_move(ScreenPoint::new(at.x + 30.0, at.y));
		assert!(vp.is_dragging());
		assert_eq!(vp.pointer_click(at), ClickOutcome::Dragging);
		vp.pointer_up();
		assert!(!vp.is_dragging());
		// The click fired after the release is swallowed too.
		assert_eq!(vp.pointer_click(at), ClickOutcome::Dragging);
		assert_eq!(vp.phase(), Phase::Idle);

		// A plain press/release afterwards selects.
		vp.pointer_down(at);
		vp.pointer_move(ScreenPoint::new(at.x + 1.0, at.y));
		vp.pointer_up();
		assert!(!vp.is_dragging());
		assert_eq!(vp.pointer_click(at), ClickOutcome::Selected("s1".into()));
	}

	#[test]
	fn test_explicit_drag_events_suppress_click() {
		let mut vp = viewport();
		let at = face(&mut vp, "s3");
		vp.begin_drag();
		assert_eq!(vp.pointer_move(at), None);
		vp.end_drag();
		assert_eq!(vp.pointer_click(at), ClickOutcome::Dragging);
		assert_eq!(vp.pointer_click(at), ClickOutcome::Selected("s3".into()));
	}

	#[test]
	fn test_table_click_is_inert() {
		let mut vp = viewport();
		let at = face(&mut vp, "t1");
		assert_eq!(vp.pointer_click(at), ClickOutcome::Inert("t1".into()));
		assert_eq!(vp.phase(), Phase::Idle);
	}

	#[test]
	fn test_click_on_empty_space_misses() {
		let mut vp = viewport();
		assert_eq!(vp.pointer_click(ScreenPoint::new(2.0, 2.0)), ClickOutcome::Missed);
	}

	#[test]
	fn test_programmatic_selection_is_guarded() {
		let mut vp = viewport();
		assert_eq!(
			vp.select_service("ghost"),
			Err(GraphError::UnknownNode("ghost".into()))
		);
		assert!(matches!(
			vp.select_service("t2"),
			Err(GraphError::InvalidTransition(_))
		));
		assert_eq!(vp.phase(), Phase::Idle);
		assert!(vp.port().decorations().is_empty());
	}

	#[test]
	fn test_reset_mid_rotation_restores_camera() {
		let mut vp = viewport();
		vp.select_service("s1").unwrap();
		vp.zoom_in();
		vp.tick(DURATION / 2.0);
		assert_eq!(vp.phase(), Phase::Rotating);

		vp.reset();
		assert_eq!(vp.phase(), Phase::Idle);
		assert_eq!(vp.port().camera_azimuth(), 0.0);
		assert_eq!(vp.distance(), 11.0);
		assert!(vp.port().decorations().is_empty());

		for _ in 0..20 {
			vp.tick(DURATION);
		}
		assert_eq!(vp.port().camera_azimuth(), 0.0);
		let events = vp.take_events();
		assert_eq!(events, vec![HostEvent::Reset]);
	}

	#[test]
	fn test_reset_twice_matches_once() {
		let mut vp = viewport();
		vp.select_service("s2").unwrap();
		run_to_expanded(&mut vp);

		vp.reset();
		let state = vp.selection().state().clone();
		let azimuth = vp.port().camera_azimuth();
		vp.reset();
		assert_eq!(vp.selection().state(), &state);
		assert_eq!(vp.port().camera_azimuth(), azimuth);
		assert!(vp.port().decorations().is_empty());
	}

	#[test]
	fn test_reselect_clears_previous_decorations() {
		let mut vp = viewport();
		vp.select_service("s1").unwrap();
		vp.tick(DURATION / 3.0);
		vp.select_service("s2").unwrap();

		assert!(!vp.port().is_decorated(&DecorationTarget::Node("s1".into())));
		assert!(!vp.port().is_decorated(&DecorationTarget::Link(Link::new("s1", "t1"))));
		assert!(vp.port().is_decorated(&DecorationTarget::Node("s2".into())));

		run_to_expanded(&mut vp);
		assert_eq!(vp.selection().expanded_node_id(), Some("s2"));
	}

	#[test]
	fn test_zoom_is_clamped() {
		let mut vp = viewport();
		vp.zoom_in();
		assert!((vp.distance() - 10.0).abs() < 1e-9);
		for _ in 0..50 {
			vp.zoom_in();
		}
		assert_eq!(vp.distance(), 6.0);
		for _ in 0..100 {
			vp.wheel(1.0);
		}
		assert_eq!(vp.distance(), 60.0);
		assert_eq!(vp.port().distance(), 60.0);
	}

	#[test]
	fn test_idle_spin_advances_azimuth() {
		let config = WidgetConfig {
			rotation_speed: 0.5,
			..WidgetConfig::default()
		};
		let port = CanvasPort::new(800.0, 600.0, 11.0);
		let mut vp = ViewportController::from_dataset(&sample_dataset(), config, port).unwrap();

		vp.tick(1000.0);
		assert!((vp.port().camera_azimuth() - 0.5).abs() < 1e-9);

		vp.begin_drag();
		vp.tick(1000.0);
		assert!((vp.port().camera_azimuth() - 0.5).abs() < 1e-9);
		vp.end_drag();

		vp.select_service("s3").unwrap();
		vp.tick(0.0);
		vp.tick(100_000.0);
		assert_eq!(vp.phase(), Phase::Expanded);
		let parked = vp.port().camera_azimuth();
		vp.tick(1000.0);
		assert_eq!(vp.port().camera_azimuth(), parked);
	}

	#[test]
	fn test_unknown_id_from_port_is_reported() {
		let mut vp = viewport();
		vp.port_mut().place_node("stray", Vec3::new(0.0, 0.0, 5.0));
		let outcome = vp.pointer_click(ScreenPoint::new(400.0, 300.0));
		assert_eq!(outcome, ClickOutcome::Rejected(GraphError::UnknownNode("stray".into())));
		assert_eq!(
			vp.take_events(),
			vec![HostEvent::Rejected(GraphError::UnknownNode("stray".into()))]
		);
	}
}
