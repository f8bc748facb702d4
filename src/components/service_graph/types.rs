//! Input records and graph data structures.

use serde::Deserialize;

/// A related table as it appears in the raw dataset.
///
/// Fields are optional at the serde level so that missing ids and names can
/// be reported as [`GraphError::MalformedInput`](super::GraphError) instead of
/// a bare parse failure.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TableRecord {
	pub id: Option<String>,
	pub name: Option<String>,
	/// Number of records in the table. Displayed next to the table label.
	#[serde(default)]
	pub count: Option<u32>,
}

/// A web service as it appears in the raw dataset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ServiceRecord {
	pub id: Option<String>,
	pub name: Option<String>,
	/// Optional CSS color override. Falls back to the theme palette.
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default, rename = "relatedTables")]
	pub related_tables: Vec<TableRecord>,
}

/// Complete dataset, accepted either wrapped in `{ "webServices": [...] }`
/// or as a bare array of services.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Dataset {
	Wrapped {
		#[serde(rename = "webServices")]
		web_services: Vec<ServiceRecord>,
	},
	Flat(Vec<ServiceRecord>),
}

impl Dataset {
	pub fn services(&self) -> &[ServiceRecord] {
		match self {
			Dataset::Wrapped { web_services } => web_services,
			Dataset::Flat(services) => services,
		}
	}
}

impl Default for Dataset {
	fn default() -> Self {
		Dataset::Flat(Vec::new())
	}
}

/// A point or direction in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vec3 {
	pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn length(self) -> f64 {
		self.dot(self).sqrt()
	}

	pub fn dot(self, other: Vec3) -> f64 {
		self.x * other.x + self.y * other.y + self.z * other.z
	}

	pub fn sub(self, other: Vec3) -> Vec3 {
		Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
	}

	pub fn scale(self, s: f64) -> Vec3 {
		Vec3::new(self.x * s, self.y * s, self.z * s)
	}

	/// Returns `None` for (near) zero-length vectors.
	pub fn normalized(self) -> Option<Vec3> {
		let len = self.length();
		(len > 1e-12).then(|| self.scale(1.0 / len))
	}

	/// Angle around the Y axis, measured from +Z towards +X.
	///
	/// A camera orbiting at this azimuth looks straight at the point.
	pub fn azimuth(self) -> f64 {
		self.x.atan2(self.z)
	}
}

/// Whether a node stands for a web service or a data table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Service,
	Table,
}

/// A node of the derived graph.
///
/// Rendering resources are never owned here; the rendering layer associates
/// its meshes with nodes by `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique identifier within one graph.
	pub id: String,
	pub name: String,
	pub kind: NodeKind,
	pub color: Option<String>,
	/// Record count, only set on table nodes.
	pub related_count: Option<u32>,
	/// Assigned by the sphere layout.
	pub position: Vec3,
}

impl Node {
	pub fn is_service(&self) -> bool {
		self.kind == NodeKind::Service
	}
}

/// A directed service → table edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
	pub source_id: String,
	pub target_id: String,
}

impl Link {
	pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
		Self {
			source_id: source_id.into(),
			target_id: target_id.into(),
		}
	}
}
