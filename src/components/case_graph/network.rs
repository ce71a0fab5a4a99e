use log::{debug, info};

use super::options::{GroupStyle, GroupStyles, RenderOptions, Viewport};
use super::state::Network;
use super::types::GraphPayload;
use crate::error::PayloadError;

/// Where a network is mounted: the element id and the viewport at render time.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
	pub id: String,
	pub viewport: Viewport,
}

impl Container {
	pub fn new(id: impl Into<String>, viewport: Viewport) -> Self {
		Self {
			id: id.into(),
			viewport,
		}
	}
}

/// Owns the single live [`Network`] of a page and replaces it on every render.
#[derive(Default)]
pub struct GraphRenderer {
	network: Option<Network>,
	groups: GroupStyles,
	renders: u64,
}

impl GraphRenderer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an extra node group style for subsequent renders.
	pub fn with_group(mut self, group: impl Into<String>, style: GroupStyle) -> Self {
		self.groups.insert(group, style);
		self
	}

	/// Registers several group styles, overriding the predefined ones on conflict.
	pub fn with_groups(mut self, groups: GroupStyles) -> Self {
		self.groups.extend(groups);
		self
	}

	/// Builds a new network for `payload` inside `container`, dropping the
	/// previous one and its handlers. Physics is switched off once the layout
	/// has stabilized.
	///
	/// An invalid payload leaves the current network untouched.
	pub fn render(
		&mut self,
		payload: &GraphPayload,
		container: &Container,
	) -> Result<&mut Network, PayloadError> {
		let mut options = RenderOptions::for_viewport(container.viewport);
		options.groups = self.groups.clone();

		let mut network = Network::new(container.id.clone(), payload, options)?;
		network.on_stabilization_iterations_done(|net| net.set_physics_enabled(false));

		if let Some(previous) = self.network.take() {
			debug!(
				"dropping previous network on #{} ({} nodes)",
				previous.container(),
				previous.node_count()
			);
		}
		self.renders += 1;
		info!(
			"rendered case graph #{} on #{}: {} nodes, {} edges",
			self.renders,
			container.id,
			network.node_count(),
			network.edge_count()
		);
		Ok(self.network.insert(network))
	}

	pub fn network(&self) -> Option<&Network> {
		self.network.as_ref()
	}

	pub fn network_mut(&mut self) -> Option<&mut Network> {
		self.network.as_mut()
	}

	/// Number of successful renders so far.
	pub fn renders(&self) -> u64 {
		self.renders
	}
}
