//! Shared test data.

use super::graph::Graph;
use super::layout::SphereLayout;
use super::types::Dataset;

pub const SAMPLE_JSON: &str = r##"{ "webServices": [
	{ "id": "s1", "name": "Auth", "color": "#ff0000", "relatedTables": [
		{ "id": "t1", "name": "Users", "count": 5 },
		{ "id": "t2", "name": "Roles", "count": 2 }
	] },
	{ "id": "s2", "name": "Billing", "relatedTables": [
		{ "id": "t2", "name": "Roles", "count": 2 },
		{ "id": "t3", "name": "Invoices", "count": 11 }
	] },
	{ "id": "s3", "name": "Audit", "relatedTables": [] }
] }"##;

pub fn sample_dataset() -> Dataset {
	serde_json::from_str(SAMPLE_JSON).expect("sample dataset parses")
}

/// Sample graph laid out with a 3..5 radius clamp.
pub fn sample_graph() -> Graph {
	let mut graph = Graph::build(sample_dataset().services()).expect("sample dataset is valid");
	graph.apply_layout(&SphereLayout::new(3.0, 5.0));
	graph
}
