//! UI components.

pub mod service_graph;
