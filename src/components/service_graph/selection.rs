//! Expand/collapse state machine for service nodes.
//!
//! ```text
//!            select_service              tick               tick (progress = 1)
//!   Idle ─────────────────► Highlighting ────► Rotating ───────────────────► Expanded
//!    ▲                                            │                             │
//!    └──────────────────── reset ◄────────────────┴─────────────────────────────┘
//! ```
//!
//! Selecting while a service is highlighted, rotating or expanded performs a
//! reset first, so at most one service is ever expanded. Effects are queued
//! as [`Intent`]s for the viewport to forward; the controller holds no
//! rendering handles.

use std::f64::consts::{PI, TAU};

use log::{debug, warn};

use super::config::WidgetConfig;
use super::error::GraphError;
use super::graph::Graph;
use super::layout::ring_position;
use super::types::{Link, NodeKind, Vec3};

/// Interaction phase of the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	#[default]
	Idle,
	Highlighting,
	Rotating,
	Expanded,
}

impl Phase {
	/// Whether a selection is under way but not yet expanded.
	pub fn is_transitioning(self) -> bool {
		matches!(self, Phase::Highlighting | Phase::Rotating)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
	pub expanded_node_id: Option<String>,
	pub phase: Phase,
}

/// One table on the detail ring.
#[derive(Clone, Debug, PartialEq)]
pub struct RingSlot {
	pub table_id: String,
	pub label: String,
	pub count: Option<u32>,
	pub position: Vec3,
}

/// Effects produced by state transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	DecorateNode(String),
	DecorateLink(Link),
	ShowDetailRing {
		service_id: String,
		slots: Vec<RingSlot>,
	},
	ClearAll,
}

/// Linear azimuth interpolation towards the selected node.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Rotation {
	from: f64,
	to: f64,
	elapsed: f64,
	duration: f64,
}

impl Rotation {
	fn progress(&self) -> f64 {
		if self.duration <= 0.0 {
			1.0
		} else {
			(self.elapsed / self.duration).min(1.0)
		}
	}

	fn azimuth(&self) -> f64 {
		self.from + (self.to - self.from) * self.progress()
	}
}

/// Signed angle in `(-PI, PI]` that turns `from` onto `to`.
pub fn shortest_angle(from: f64, to: f64) -> f64 {
	let delta = (to - from).rem_euclid(TAU);
	if delta > PI { delta - TAU } else { delta }
}

/// Owns the [`SelectionState`] of one widget instance.
#[derive(Clone, Debug)]
pub struct SelectionController {
	state: SelectionState,
	/// Service being highlighted or rotated to.
	target: Option<String>,
	rotation: Option<Rotation>,
	neighborhood: Vec<Link>,
	intents: Vec<Intent>,
	rotate_duration: f64,
	ring_radius: f64,
	ring_offset: f64,
}

impl SelectionController {
	/// `ring_radius` is the radius of the detail ring, normally the layout
	/// radius of the graph.
	pub fn new(config: &WidgetConfig, ring_radius: f64) -> Self {
		Self {
			state: SelectionState::default(),
			target: None,
			rotation: None,
			neighborhood: Vec::new(),
			intents: Vec::new(),
			rotate_duration: config.rotate_duration,
			ring_radius,
			ring_offset: config.ring_offset,
		}
	}

	pub fn state(&self) -> &SelectionState {
		&self.state
	}

	pub fn phase(&self) -> Phase {
		self.state.phase
	}

	pub fn expanded_node_id(&self) -> Option<&str> {
		self.state.expanded_node_id.as_deref()
	}

	/// The service currently highlighted, rotating or expanded.
	pub fn selected(&self) -> Option<&str> {
		self.target.as_deref().or(self.expanded_node_id())
	}

	/// Links decorated for the current selection.
	pub fn neighborhood(&self) -> &[Link] {
		&self.neighborhood
	}

	/// Rotation progress in `[0, 1]` while rotating.
	pub fn progress(&self) -> Option<f64> {
		self.rotation.as_ref().map(Rotation::progress)
	}

	/// Start highlighting `service_id`.
	///
	/// Unknown ids and table nodes are rejected without touching the current
	/// state. Any previous selection is reset first.
	pub fn select_service(&mut self, graph: &Graph, service_id: &str) -> Result<(), GraphError> {
		let node = graph
			.node(service_id)
			.ok_or_else(|| GraphError::UnknownNode(service_id.to_string()))?;
		if node.kind != NodeKind::Service {
			return Err(GraphError::InvalidTransition(format!(
				"{service_id:?} is a table node and cannot be expanded"
			)));
		}

		self.reset();

		self.neighborhood = graph.neighborhood(service_id).into_iter().cloned().collect();
		self.intents.push(Intent::DecorateNode(service_id.to_string()));
		self.intents.extend(
			self.neighborhood
				.iter()
				.cloned()
				.map(Intent::DecorateLink),
		);
		self.target = Some(service_id.to_string());
		self.state.phase = Phase::Highlighting;
		debug!(
			"service-sphere: highlighting {service_id} ({} tables)",
			self.neighborhood.len()
		);
		Ok(())
	}

	/// Advance the transition by `dt` milliseconds.
	///
	/// Returns the camera azimuth to apply while a rotation is running, or
	/// `None` when there is nothing to animate.
	pub fn tick(&mut self, graph: &Graph, dt: f64, current_azimuth: f64) -> Option<f64> {
		match self.state.phase {
			Phase::Idle | Phase::Expanded => return None,
			Phase::Highlighting => self.begin_rotation(graph, current_azimuth)?,
			Phase::Rotating => {}
		}

		let rotation = self.rotation.as_mut()?;
		rotation.elapsed += dt.max(0.0);
		let (azimuth, done) = (rotation.azimuth(), rotation.progress() >= 1.0);
		if done {
			self.finish_expand(graph);
		}
		Some(azimuth)
	}

	/// Return to `Idle`, dropping every queued decoration.
	///
	/// Returns `false` (and changes nothing) when already idle.
	pub fn reset(&mut self) -> bool {
		if self.state.phase == Phase::Idle {
			return false;
		}
		if self.state.phase == Phase::Rotating {
			debug!("service-sphere: rotation cancelled");
		}
		self.intents.clear();
		self.intents.push(Intent::ClearAll);
		self.state = SelectionState::default();
		self.target = None;
		self.rotation = None;
		self.neighborhood.clear();
		true
	}

	/// Take the intents queued since the last call.
	pub fn drain_intents(&mut self) -> Vec<Intent> {
		std::mem::take(&mut self.intents)
	}

	fn begin_rotation(&mut self, graph: &Graph, current_azimuth: f64) -> Option<()> {
		let target = self.target.as_deref()?;
		let Some(node) = graph.node(target) else {
			warn!("service-sphere: selected node {target} vanished from the graph");
			self.reset();
			return None;
		};
		let to = current_azimuth + shortest_angle(current_azimuth, node.position.azimuth());
		self.rotation = Some(Rotation {
			from: current_azimuth,
			to,
			elapsed: 0.0,
			duration: self.rotate_duration,
		});
		self.state.phase = Phase::Rotating;
		Some(())
	}

	fn finish_expand(&mut self, graph: &Graph) {
		self.rotation = None;
		let Some(service_id) = self.target.take() else {
			return;
		};

		let count = self.neighborhood.len();
		let slots = self
			.neighborhood
			.iter()
			.enumerate()
			.filter_map(|(i, link)| {
				let table = graph.node(&link.target_id)?;
				Some(RingSlot {
					table_id: table.id.clone(),
					label: table.name.clone(),
					count: table.related_count,
					position: ring_position(self.ring_radius, i, count, self.ring_offset),
				})
			})
			.collect();

		debug!("service-sphere: expanded {service_id}");
		self.state = SelectionState {
			expanded_node_id: Some(service_id.clone()),
			phase: Phase::Expanded,
		};
		self.intents.push(Intent::ShowDetailRing { service_id, slots });
	}
}
