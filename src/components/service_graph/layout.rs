//! Deterministic node placement.
//!
//! Nodes are spread over a sphere with a Fibonacci lattice: the polar angle
//! walks down the sphere in equal-area bands while the azimuth advances by a
//! golden-ratio step, which avoids the banding a uniform azimuth would give.
//! Service and table nodes use the same formula.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use super::config::WidgetConfig;
use super::types::{Node, Vec3};

/// Fibonacci-lattice sphere layout with a clamped radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereLayout {
	pub min_radius: f64,
	pub max_radius: f64,
}

impl Default for SphereLayout {
	fn default() -> Self {
		Self::from_config(&WidgetConfig::default())
	}
}

impl SphereLayout {
	pub fn new(min_radius: f64, max_radius: f64) -> Self {
		Self {
			min_radius,
			max_radius,
		}
	}

	pub fn from_config(config: &WidgetConfig) -> Self {
		Self::new(config.min_radius, config.max_radius)
	}

	/// Sphere radius for `n` nodes: `n / 10` clamped to the configured range.
	///
	/// The lower bound wins if the range is inverted.
	pub fn radius(&self, n: usize) -> f64 {
		self.min_radius.max(self.max_radius.min(n as f64 / 10.0))
	}

	/// Position of the `index`-th of `n` nodes. `n` must be non-zero.
	pub fn position(&self, index: usize, n: usize) -> Vec3 {
		let golden_ratio = (1.0 + 5f64.sqrt()) / 2.0;
		let i = index as f64;
		let count = n as f64;

		// Clamp guards against the argument drifting just outside [-1, 1].
		let phi = (1.0 - (2.0 * i + 1.0) / count).clamp(-1.0, 1.0).acos();
		let theta = 2.0 * PI * (i + 0.5) / golden_ratio;
		let r = self.radius(n);

		Vec3::new(
			r * theta.cos() * phi.sin(),
			r * phi.cos(),
			r * theta.sin() * phi.sin(),
		)
	}

	/// Positions for `nodes`, keyed by node id, in the order given.
	pub fn layout(&self, nodes: &[Node]) -> HashMap<String, Vec3> {
		let n = nodes.len();
		nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), self.position(i, n)))
			.collect()
	}
}

/// Slot `index` of `count` on a flat ring of `radius` in the XY plane,
/// facing a camera on the +Z axis.
pub fn ring_position(radius: f64, index: usize, count: usize, offset: f64) -> Vec3 {
	if count == 0 {
		return Vec3::ZERO;
	}
	let angle = TAU * index as f64 / count as f64 + offset;
	Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}
