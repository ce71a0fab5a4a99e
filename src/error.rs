//! Error types for fetching and validating case graphs.

use thiserror::Error;

use crate::components::case_graph::NodeId;

/// A graph payload that the renderer refuses to display.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
	/// Two nodes share the same identifier.
	#[error("duplicate node id {0}")]
	DuplicateNode(NodeId),

	/// An edge references a node that is not part of the payload.
	#[error("edge {from} -> {to} references unknown node {missing}")]
	UnknownEndpoint {
		/// Edge source.
		from: NodeId,
		/// Edge target.
		to: NodeId,
		/// The endpoint that could not be resolved.
		missing: NodeId,
	},
}

/// Failure to obtain a graph from the server.
#[derive(Error, Debug)]
pub enum FetchError {
	/// The endpoint answered but reported a non-success status.
	#[error("{0}")]
	Logical(String),

	/// The request itself failed or returned a non-2xx status.
	#[error("{0}")]
	Transport(String),

	/// The body could not be decoded as a graph response.
	#[error("malformed response: {0}")]
	Malformed(String),

	/// The body decoded but the graph is inconsistent.
	#[error("invalid graph: {0}")]
	InvalidPayload(#[from] PayloadError),
}

impl From<serde_json::Error> for FetchError {
	fn from(err: serde_json::Error) -> Self {
		Self::Malformed(err.to_string())
	}
}

impl From<gloo_net::Error> for FetchError {
	fn from(err: gloo_net::Error) -> Self {
		Self::Transport(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn logical_error_displays_server_message_verbatim() {
		let err = FetchError::Logical("case not found".into());
		assert_eq!(err.to_string(), "case not found");
	}

	#[test]
	fn unknown_endpoint_names_missing_node() {
		let err = PayloadError::UnknownEndpoint {
			from: NodeId::Int(1),
			to: NodeId::Str("x".into()),
			missing: NodeId::Str("x".into()),
		};
		assert_eq!(err.to_string(), "edge 1 -> x references unknown node x");
	}

	#[test]
	fn payload_error_converts_into_fetch_error() {
		let err: FetchError = PayloadError::DuplicateNode(NodeId::Int(7)).into();
		assert_eq!(err.to_string(), "invalid graph: duplicate node id 7");
	}
}
