//! Force-directed rendering of a case's asset graph.

mod component;
mod images;
mod layout;
mod network;
pub mod options;
mod render;
mod solver;
mod stabilization;
mod state;
mod types;

pub use component::NetworkCanvas;
pub use network::{Container, GraphRenderer};
pub use state::Network;
pub use types::{GraphEdge, GraphNode, GraphPayload, NodeId};
