//! Error taxonomy for graph construction and interaction.

/// Errors raised by the graph builder and the interaction controllers.
///
/// Only [`GraphError::MalformedInput`] is fatal: it prevents the widget from
/// initializing. The other variants reject a single request and leave all
/// state untouched.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GraphError {
	/// The dataset or configuration is missing a required field or holds an
	/// unusable value.
	#[error("malformed input: {0}")]
	MalformedInput(String),
	/// A selection or hover referenced an id that is not in the graph.
	#[error("unknown node: {0}")]
	UnknownNode(String),
	/// The request is not valid for the node or the current state.
	#[error("invalid transition: {0}")]
	InvalidTransition(String),
}

impl GraphError {
	/// Whether the widget can keep running after this error.
	pub fn is_recoverable(&self) -> bool {
		!matches!(self, GraphError::MalformedInput(_))
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		GraphError::MalformedInput(err.to_string())
	}
}
