use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use crate::error::PayloadError;

/// Node identifier as sent by the server: asset ids are numeric, but string ids
/// are accepted as well.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Numeric id.
	Int(i64),
	/// String id.
	Str(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Int(id) => write!(f, "{id}"),
			NodeId::Str(id) => f.write_str(id),
		}
	}
}

/// A node of the case graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	/// Unique identifier.
	pub id: NodeId,
	/// Styling group, such as `computer` or `account`.
	#[serde(default)]
	pub group: Option<String>,
	/// Text drawn below the node.
	#[serde(default)]
	pub label: Option<String>,
	/// Text shown while the node is hovered.
	#[serde(default)]
	pub title: Option<String>,
	/// Overrides the group colour.
	#[serde(default)]
	pub color: Option<String>,
	/// Per-node shape; `image` together with `image` overrides the group style.
	#[serde(default)]
	pub shape: Option<String>,
	/// Image URL for `image` shaped nodes.
	#[serde(default)]
	pub image: Option<String>,
	/// Relative weight, scales dot and image sizes across the graph.
	#[serde(default)]
	pub value: Option<f64>,
}

impl GraphNode {
	/// A bare node with only an id.
	pub fn new(id: NodeId) -> Self {
		Self {
			id,
			group: None,
			label: None,
			title: None,
			color: None,
			shape: None,
			image: None,
			value: None,
		}
	}
}

/// An edge between two nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphEdge {
	/// Source node.
	pub from: NodeId,
	/// Target node.
	pub to: NodeId,
	/// Text describing the relation.
	#[serde(default)]
	pub title: Option<String>,
	/// Stroke colour.
	#[serde(default)]
	pub color: Option<String>,
}

/// Nodes and edges of one case, as returned by `graph/getdata`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphPayload {
	/// Graph nodes.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Graph edges.
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

impl GraphPayload {
	/// Checks that node ids are unique and that every edge connects known nodes.
	pub fn validate(&self) -> Result<(), PayloadError> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !ids.insert(&node.id) {
				return Err(PayloadError::DuplicateNode(node.id.clone()));
			}
		}

		for edge in &self.edges {
			for endpoint in [&edge.from, &edge.to] {
				if !ids.contains(endpoint) {
					return Err(PayloadError::UnknownEndpoint {
						from: edge.from.clone(),
						to: edge.to.clone(),
						missing: endpoint.clone(),
					});
				}
			}
		}
		Ok(())
	}
}
