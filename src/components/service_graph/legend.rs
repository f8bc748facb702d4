//! Legend entries for the service overlay.

use super::graph::Graph;
use super::theme::Theme;

/// One row of the legend: a service and the color its sphere is drawn in.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub id: String,
	pub name: String,
	/// CSS color string.
	pub color: String,
}

/// Service entries in graph order, colored the same way the renderer
/// colors their spheres.
pub fn legend(graph: &Graph, theme: &Theme) -> Vec<LegendEntry> {
	graph
		.nodes()
		.iter()
		.enumerate()
		.filter(|(_, node)| node.is_service())
		.map(|(index, node)| LegendEntry {
			id: node.id.clone(),
			name: node.name.clone(),
			color: theme.node_color(node, index).to_css(),
		})
		.collect()
}
