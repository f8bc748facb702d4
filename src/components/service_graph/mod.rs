//! Service sphere visualization component.
//!
//! Renders web services and the database tables they use as nodes on a
//! rotating globe:
//! - Deterministic Fibonacci sphere layout, deduplicated shared tables
//! - Click a service to highlight its links, rotate it to the front and
//!   expand its tables onto a ring
//! - Hover feedback, camera drag suppression, zoom and reset
//!
//! The interaction logic ([`ViewportController`], [`SelectionController`])
//! only talks to the screen through the [`RenderPort`] trait, so it runs
//! without a browser; [`CanvasPort`] is the canvas-backed implementation.
//!
//! # Example
//!
//! ```ignore
//! use service_sphere::{Dataset, ServiceGraphCanvas};
//!
//! let data: Dataset = serde_json::from_str(r#"{ "webServices": [
//!     { "id": "s1", "name": "Auth", "relatedTables": [
//!         { "id": "t1", "name": "Users", "count": 5 }
//!     ] }
//! ] }"#)?;
//!
//! view! { <ServiceGraphCanvas data=data fullscreen=true /> }
//! ```

mod component;
mod config;
mod error;
#[cfg(test)]
mod fixtures;
mod graph;
mod layout;
mod legend;
mod port;
mod render;
mod scene;
mod selection;
pub mod theme;
mod types;
mod viewport;

pub use component::ServiceGraphCanvas;
pub use config::WidgetConfig;
pub use error::GraphError;
pub use graph::{Graph, GraphBuilder};
pub use layout::{SphereLayout, ring_position};
pub use legend::{LegendEntry, legend};
pub use port::{DecorationStyle, DecorationTarget, HostEvent, RenderPort, ScreenPoint};
pub use scene::{CanvasPort, PlacedNode, Projected};
pub use selection::{Intent, Phase, RingSlot, SelectionController, SelectionState, shortest_angle};
pub use theme::Theme;
pub use types::{Dataset, Link, Node, NodeKind, ServiceRecord, TableRecord, Vec3};
pub use viewport::{ClickOutcome, DragState, NodeAction, ViewportController};
