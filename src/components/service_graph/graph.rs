//! Derivation of the deduplicated service/table graph from raw records.
//!
//! Node order follows first occurrence during the traversal. The sphere
//! layout derives each node's position from its index, so this order is part
//! of the contract.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::GraphError;
use super::layout::SphereLayout;
use super::types::{Link, Node, NodeKind, ServiceRecord, TableRecord, Vec3};

/// Nodes and links for one dataset load.
///
/// Every link endpoint resolves to a node, node ids are unique, and no link
/// appears twice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Build a graph from service records. See [`GraphBuilder`].
	pub fn build(services: &[ServiceRecord]) -> Result<Self, GraphError> {
		let mut builder = GraphBuilder::new();
		for service in services {
			builder.add_service(service)?;
		}
		Ok(builder.finish())
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Position of the node in graph order.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn service_nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter().filter(|n| n.kind == NodeKind::Service)
	}

	/// Links leaving `service_id` whose target is a table node, in link order.
	pub fn neighborhood(&self, service_id: &str) -> Vec<&Link> {
		self.links
			.iter()
			.filter(|link| link.source_id == service_id)
			.filter(|link| {
				self.node(&link.target_id)
					.is_some_and(|n| n.kind == NodeKind::Table)
			})
			.collect()
	}

	/// Run the sphere layout and store the resulting positions on the nodes.
	pub fn apply_layout(&mut self, layout: &SphereLayout) {
		let positions = layout.layout(&self.nodes);
		for node in &mut self.nodes {
			if let Some(&position) = positions.get(&node.id) {
				node.position = position;
			}
		}
	}
}

/// Incremental insert-or-reuse graph construction.
///
/// The first record seen for an id fixes the node's name, kind, color and
/// count; later records with the same id only contribute links.
#[derive(Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	seen_links: HashSet<(String, String)>,
}

impl GraphBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add one service and its related tables.
	///
	/// The whole record is validated before anything is inserted, so a
	/// malformed record leaves the builder unchanged.
	pub fn add_service(&mut self, service: &ServiceRecord) -> Result<(), GraphError> {
		let (service_id, service_name) = service_fields(service)?;
		let tables = service
			.related_tables
			.iter()
			.map(|table| table_fields(service_id, table))
			.collect::<Result<Vec<_>, _>>()?;

		self.insert_node(Node {
			id: service_id.to_string(),
			name: service_name.to_string(),
			kind: NodeKind::Service,
			color: service.color.clone(),
			related_count: None,
			position: Vec3::ZERO,
		});

		for (table_id, table_name, count) in tables {
			self.insert_node(Node {
				id: table_id.to_string(),
				name: table_name.to_string(),
				kind: NodeKind::Table,
				color: None,
				related_count: count,
				position: Vec3::ZERO,
			});
			self.insert_link(service_id, table_id);
		}
		Ok(())
	}

	pub fn finish(self) -> Graph {
		debug!(
			"service-sphere: built graph with {} nodes, {} links",
			self.nodes.len(),
			self.links.len()
		);
		Graph {
			nodes: self.nodes,
			links: self.links,
			index: self.index,
		}
	}

	fn insert_node(&mut self, node: Node) {
		if self.index.contains_key(&node.id) {
			return;
		}
		self.index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
	}

	fn insert_link(&mut self, source_id: &str, target_id: &str) {
		let key = (source_id.to_string(), target_id.to_string());
		if self.seen_links.insert(key) {
			self.links.push(Link::new(source_id, target_id));
		}
	}
}

fn service_fields(service: &ServiceRecord) -> Result<(&str, &str), GraphError> {
	let id = required_id(service.id.as_deref(), || "service record".to_string())?;
	let name = service.name.as_deref().ok_or_else(|| {
		GraphError::MalformedInput(format!("service {id:?} is missing a name"))
	})?;
	Ok((id, name))
}

fn table_fields<'a>(
	service_id: &str,
	table: &'a TableRecord,
) -> Result<(&'a str, &'a str, Option<u32>), GraphError> {
	let id = required_id(table.id.as_deref(), || {
		format!("table record of service {service_id:?}")
	})?;
	let name = table.name.as_deref().ok_or_else(|| {
		GraphError::MalformedInput(format!(
			"table {id:?} of service {service_id:?} is missing a name"
		))
	})?;
	Ok((id, name, table.count))
}

fn required_id<'a>(
	id: Option<&'a str>,
	context: impl FnOnce() -> String,
) -> Result<&'a str, GraphError> {
	match id {
		Some(id) if !id.trim().is_empty() => Ok(id),
		Some(_) => Err(GraphError::MalformedInput(format!(
			"{} has an empty id",
			context()
		))),
		None => Err(GraphError::MalformedInput(format!(
			"{} is missing an id",
			context()
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn table(id: &str, name: &str, count: u32) -> TableRecord {
		TableRecord {
			id: Some(id.into()),
			name: Some(name.into()),
			count: Some(count),
		}
	}

	fn service(id: &str, name: &str, tables: Vec<TableRecord>) -> ServiceRecord {
		ServiceRecord {
			id: Some(id.into()),
			name: Some(name.into()),
			color: None,
			related_tables: tables,
		}
	}

	fn ids(graph: &Graph) -> Vec<&str> {
		graph.nodes().iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn test_duplicate_table_keeps_first_occurrence() {
		let graph = Graph::build(&[service(
			"s1",
			"Auth",
			vec![table("t1", "Users", 5), table("t1", "DUPLICATE", 99)],
		)])
		.unwrap();

		assert_eq!(ids(&graph), vec!["s1", "t1"]);
		let t1 = graph.node("t1").unwrap();
		assert_eq!(t1.name, "Users");
		assert_eq!(t1.related_count, Some(5));
		assert_eq!(t1.kind, NodeKind::Table);
		assert_eq!(graph.links(), &[Link::new("s1", "t1")]);
	}

	#[test]
	fn test_duplicate_service_does_not_overwrite_fields() {
		let mut first = service("s1", "Auth", vec![table("t1", "Users", 5)]);
		first.color = Some("#112233".into());
		let mut second = service("s1", "Renamed", vec![table("t2", "Sessions", 7)]);
		second.color = Some("#ffffff".into());

		let graph = Graph::build(&[first, second]).unwrap();

		let s1 = graph.node("s1").unwrap();
		assert_eq!(s1.name, "Auth");
		assert_eq!(s1.color.as_deref(), Some("#112233"));
		assert_eq!(ids(&graph), vec!["s1", "t1", "t2"]);
		assert_eq!(
			graph.links(),
			&[Link::new("s1", "t1"), Link::new("s1", "t2")]
		);
	}

	#[test]
	fn test_links_are_unique_across_records() {
		let graph = Graph::build(&[
			service("s1", "Auth", vec![table("t1", "Users", 5)]),
			service("s2", "Billing", vec![table("t1", "Users", 5)]),
			service("s1", "Auth", vec![table("t1", "Users", 5)]),
		])
		.unwrap();

		let mut pairs: Vec<_> = graph
			.links()
			.iter()
			.map(|l| (l.source_id.clone(), l.target_id.clone()))
			.collect();
		let total = pairs.len();
		pairs.sort();
		pairs.dedup();
		assert_eq!(pairs.len(), total);
		assert_eq!(total, 2);
	}

	#[test]
	fn test_insertion_order_follows_traversal() {
		let graph = Graph::build(&[
			service("s1", "A", vec![table("t2", "B", 1), table("t1", "C", 1)]),
			service("s2", "D", vec![table("t1", "C", 1), table("t3", "E", 1)]),
		])
		.unwrap();
		assert_eq!(ids(&graph), vec!["s1", "t2", "t1", "s2", "t3"]);
		assert_eq!(graph.index_of("s2"), Some(3));
	}

	#[test]
	fn test_empty_input_is_valid() {
		let graph = Graph::build(&[]).unwrap();
		assert!(graph.is_empty());
		assert!(graph.links().is_empty());
	}

	#[test]
	fn test_missing_fields_are_malformed() {
		let mut nameless = service("s1", "Auth", vec![]);
		nameless.name = None;
		assert!(matches!(
			Graph::build(&[nameless]),
			Err(GraphError::MalformedInput(_))
		));

		let mut blank = service("s1", "Auth", vec![]);
		blank.id = Some("  ".into());
		assert!(matches!(
			Graph::build(&[blank]),
			Err(GraphError::MalformedInput(_))
		));

		let bad_table = TableRecord {
			id: None,
			name: Some("Users".into()),
			count: Some(1),
		};
		assert!(matches!(
			Graph::build(&[service("s1", "Auth", vec![bad_table])]),
			Err(GraphError::MalformedInput(_))
		));
	}

	#[test]
	fn test_malformed_record_leaves_builder_untouched() {
		let mut builder = GraphBuilder::new();
		builder
			.add_service(&service("s1", "Auth", vec![table("t1", "Users", 5)]))
			.unwrap();
		let broken = service(
			"s2",
			"Billing",
			vec![
				table("t2", "Invoices", 3),
				TableRecord {
					id: Some("t3".into()),
					name: None,
					count: None,
				},
			],
		);
		assert!(builder.add_service(&broken).is_err());

		let graph = builder.finish();
		assert_eq!(ids(&graph), vec!["s1", "t1"]);
	}

	#[test]
	fn test_kind_is_fixed_by_first_occurrence() {
		let graph = Graph::build(&[
			service("s1", "Auth", vec![table("shared", "Shared", 2)]),
			service("shared", "Shared service", vec![table("t9", "Other", 1)]),
		])
		.unwrap();

		assert_eq!(graph.node("shared").unwrap().kind, NodeKind::Table);
		assert_eq!(graph.service_nodes().count(), 1);
		// The link from the table-kinded node exists but is not a neighborhood.
		assert!(graph.links().contains(&Link::new("shared", "t9")));
	}

	#[test]
	fn test_neighborhood_only_contains_table_targets() {
		let graph = Graph::build(&[
			service("s1", "Auth", vec![table("t1", "Users", 5), table("s2", "Odd", 1)]),
			service("s2", "Billing", vec![table("t2", "Invoices", 3)]),
		])
		.unwrap();

		// "s2" was first seen as a table, so it is a valid neighborhood member.
		let targets: Vec<_> = graph
			.neighborhood("s1")
			.into_iter()
			.map(|l| l.target_id.as_str())
			.collect();
		assert_eq!(targets, vec!["t1", "s2"]);
		assert!(graph.neighborhood("missing").is_empty());
	}

	#[test]
	fn test_every_link_endpoint_resolves() {
		let graph = Graph::build(&[
			service("s1", "Auth", vec![table("t1", "Users", 5), table("t2", "Roles", 2)]),
			service("s2", "Billing", vec![table("t2", "Roles", 2)]),
		])
		.unwrap();
		for link in graph.links() {
			assert!(graph.node(&link.source_id).is_some());
			assert!(graph.node(&link.target_id).is_some());
		}
	}
}
