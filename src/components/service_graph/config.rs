//! Widget configuration.
//!
//! All options are read once at initialization and stay fixed for the
//! lifetime of the widget. Hosts may supply any subset as camelCase JSON;
//! missing options take the defaults below.

use std::f64::consts::FRAC_PI_2;

use serde::Deserialize;

use super::error::GraphError;

/// Recognized widget options.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
	/// Idle auto-spin speed of the camera azimuth in radians per second.
	/// Zero disables the spin.
	pub rotation_speed: f64,
	/// Lower clamp for the sphere radius.
	pub min_radius: f64,
	/// Upper clamp for the sphere radius.
	pub max_radius: f64,
	/// Duration of the rotate-to-front transition in milliseconds.
	pub rotate_duration: f64,
	/// Multiplicative step applied by one zoom command.
	pub zoom_factor: f64,
	pub viewport_width: f64,
	pub viewport_height: f64,
	/// Camera distance restored on reset.
	pub camera_distance: f64,
	pub min_distance: f64,
	pub max_distance: f64,
	/// Camera azimuth restored on reset.
	pub default_azimuth: f64,
	/// Angle of the first detail-ring slot.
	pub ring_offset: f64,
	/// Pointer travel in pixels before a press becomes a drag.
	pub drag_threshold: f64,
}

impl Default for WidgetConfig {
	fn default() -> Self {
		Self {
			rotation_speed: 0.12,
			min_radius: 3.0,
			max_radius: 5.0,
			rotate_duration: 1500.0,
			zoom_factor: 1.1,
			viewport_width: 800.0,
			viewport_height: 600.0,
			camera_distance: 11.0,
			min_distance: 6.0,
			max_distance: 60.0,
			default_azimuth: 0.0,
			ring_offset: FRAC_PI_2,
			drag_threshold: 4.0,
		}
	}
}

impl WidgetConfig {
	/// Parse a camelCase JSON object and validate it.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		let config: WidgetConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reject values the controllers cannot work with.
	pub fn validate(&self) -> Result<(), GraphError> {
		let fields = [
			("rotationSpeed", self.rotation_speed),
			("minRadius", self.min_radius),
			("maxRadius", self.max_radius),
			("rotateDuration", self.rotate_duration),
			("zoomFactor", self.zoom_factor),
			("viewportWidth", self.viewport_width),
			("viewportHeight", self.viewport_height),
			("cameraDistance", self.camera_distance),
			("minDistance", self.min_distance),
			("maxDistance", self.max_distance),
			("defaultAzimuth", self.default_azimuth),
			("ringOffset", self.ring_offset),
			("dragThreshold", self.drag_threshold),
		];
		for (name, value) in fields {
			if !value.is_finite() {
				return Err(GraphError::MalformedInput(format!(
					"config option {name} must be finite, got {value}"
				)));
			}
		}

		if self.min_radius <= 0.0 || self.min_radius > self.max_radius {
			return Err(GraphError::MalformedInput(format!(
				"radius clamp must satisfy 0 < minRadius <= maxRadius, got {}..{}",
				self.min_radius, self.max_radius
			)));
		}
		if self.min_distance <= 0.0 || self.min_distance > self.max_distance {
			return Err(GraphError::MalformedInput(format!(
				"distance clamp must satisfy 0 < minDistance <= maxDistance, got {}..{}",
				self.min_distance, self.max_distance
			)));
		}
		if self.zoom_factor <= 1.0 {
			return Err(GraphError::MalformedInput(format!(
				"zoomFactor must be greater than 1, got {}",
				self.zoom_factor
			)));
		}
		if self.rotate_duration < 0.0 || self.rotation_speed < 0.0 || self.drag_threshold < 0.0 {
			return Err(GraphError::MalformedInput(
				"rotateDuration, rotationSpeed and dragThreshold must not be negative".into(),
			));
		}
		if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
			return Err(GraphError::MalformedInput(format!(
				"viewport must have a positive size, got {}x{}",
				self.viewport_width, self.viewport_height
			)));
		}
		Ok(())
	}

	/// Camera distance clamped to the configured zoom range.
	pub fn clamp_distance(&self, distance: f64) -> f64 {
		distance.clamp(self.min_distance, self.max_distance)
	}
}
