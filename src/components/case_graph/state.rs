use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, info};

use super::layout::initial_positions;
use super::options::{GroupStyle, RenderOptions};
use super::solver::{self, Body};
use super::stabilization::{Progress, Stabilizer};
use super::types::{GraphPayload, NodeId};
use crate::error::PayloadError;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
/// Room left around the graph when fitting it into the canvas.
const FIT_MARGIN: f64 = 20.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: Option<String>,
	pub title: Option<String>,
	pub color: Option<String>,
	pub style: GroupStyle,
}

#[derive(Clone, Debug)]
pub struct EdgeView {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub color: Option<String>,
	pub title: Option<String>,
}

impl EdgeView {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
}

type StabilizedHandler = Box<dyn FnOnce(&mut Network)>;

/// A live case graph: simulation, view state and lifecycle handlers.
///
/// `graph` owns node positions and the (deduplicated, loop-free) edge set;
/// the solver keeps velocities in `bodies`, one slot per node.
pub struct Network {
	container: String,
	pub(super) graph: ForceGraph<NodeInfo, ()>,
	options: RenderOptions,
	stabilizer: Stabilizer,
	on_stabilized: Vec<StabilizedHandler>,
	pub(super) edges: Vec<EdgeView>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	slots: HashMap<DefaultNodeIdx, usize>,
	bodies: Vec<Body>,
	springs: Vec<(usize, usize)>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
}

fn value_range(payload: &GraphPayload) -> Option<(f64, f64)> {
	payload
		.nodes
		.iter()
		.filter_map(|node| node.value)
		.fold(None, |range, v| match range {
			None => Some((v, v)),
			Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
		})
}

impl Network {
	/// Builds a network bound to `container` from a payload and its options.
	pub fn new(
		container: impl Into<String>,
		payload: &GraphPayload,
		options: RenderOptions,
	) -> Result<Self, PayloadError> {
		payload.validate()?;

		// the crate's own integrator is never run, see `step`
		let mut graph = ForceGraph::new(Default::default());
		let mut index = HashMap::with_capacity(payload.nodes.len());
		let mut slots = HashMap::with_capacity(payload.nodes.len());
		let positions = initial_positions(payload, &options.layout);
		let values = value_range(payload);

		for (slot, (node, &(x, y))) in payload.nodes.iter().zip(&positions).enumerate() {
			let mut style = options.groups.resolve_node(node);
			if let (Some(value), Some((lowest, highest))) = (node.value, values) {
				style = style.with_size(options.scaling.size(value, lowest, highest));
			}
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 1.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					title: node.title.clone(),
					color: node.color.clone(),
					style,
				},
			});
			index.insert(node.id.clone(), idx);
			slots.insert(idx, slot);
		}

		let mut edges = Vec::with_capacity(payload.edges.len());
		for edge in &payload.edges {
			// validate() guarantees both endpoints exist
			let (Some(&source), Some(&target)) = (index.get(&edge.from), index.get(&edge.to)) else {
				continue;
			};
			// loops are drawn but carry no force
			if source != target {
				graph.add_edge(source, target, EdgeData::default());
			}
			edges.push(EdgeView {
				source,
				target,
				color: edge.color.clone(),
				title: edge.title.clone(),
			});
		}

		let mut bodies: Vec<Body> = positions
			.iter()
			.map(|&(x, y)| Body::at(x as f64, y as f64))
			.collect();
		let mut springs = Vec::new();
		graph.visit_edges(|a, b, _| {
			if let (Some(&i), Some(&j)) = (slots.get(&a.index()), slots.get(&b.index())) {
				springs.push((i, j));
				bodies[i].degree += 1.0;
				bodies[j].degree += 1.0;
			}
		});

		let container: String = container.into();
		debug!(
			"network for #{container}: {} nodes, {} edges ({} springs), {}x{}px",
			index.len(),
			edges.len(),
			springs.len(),
			options.width,
			options.height
		);

		Ok(Self {
			container,
			graph,
			stabilizer: Stabilizer::new(&options.physics),
			transform: ViewTransform {
				x: options.width / 2.0,
				y: options.height / 2.0,
				k: 1.0,
			},
			options,
			on_stabilized: Vec::new(),
			edges,
			index,
			slots,
			bodies,
			springs,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
		})
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	pub fn width(&self) -> f64 {
		self.options.width
	}

	pub fn height(&self) -> f64 {
		self.options.height
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn contains(&self, id: &NodeId) -> bool {
		self.index.contains_key(id)
	}

	pub fn physics_enabled(&self) -> bool {
		self.options.physics.enabled
	}

	pub fn is_stabilized(&self) -> bool {
		self.stabilizer.is_done()
	}

	/// Solver steps counted towards stabilization so far.
	pub fn stabilization_iterations(&self) -> u32 {
		self.stabilizer.iterations()
	}

	/// Turns the force simulation on or off. While off, nodes only move when dragged.
	pub fn set_physics_enabled(&mut self, enabled: bool) {
		if self.options.physics.enabled != enabled {
			info!(
				"physics {} for #{}",
				if enabled { "enabled" } else { "disabled" },
				self.container
			);
		}
		self.options.physics.enabled = enabled;
	}

	/// Runs `handler` once, when stabilization iterations are done.
	pub fn on_stabilization_iterations_done(&mut self, handler: impl FnOnce(&mut Network) + 'static) {
		self.on_stabilized.push(Box::new(handler));
	}

	/// Style resolved for a node at construction time.
	pub fn node_style(&self, id: &NodeId) -> Option<GroupStyle> {
		let idx = *self.index.get(id)?;
		let mut style = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				style = Some(node.data.user_data.style.clone());
			}
		});
		style
	}

	/// Current position of every node, keyed by id.
	pub fn positions(&self) -> HashMap<NodeId, (f32, f32)> {
		let mut out = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.data.user_data.id.clone(), (node.x(), node.y()));
		});
		out
	}

	/// Advances one animation frame of `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		self.animate_hover(dt as f64);
		if !self.options.physics.enabled {
			return;
		}

		let interval = self.options.physics.stabilization.update_interval.max(1);
		let steps = if self.stabilizer.is_done() { 1 } else { interval };
		for _ in 0..steps {
			let velocity = self.step();
			match self.stabilizer.record(velocity) {
				Progress::Running { iterations, total } if iterations % interval == 0 => {
					debug!("stabilizing #{}: {iterations}/{total}", self.container);
				}
				Progress::Done {
					iterations,
					converged,
				} => {
					info!(
						"#{} stabilized after {iterations} iterations (converged: {converged})",
						self.container
					);
					if self.options.physics.stabilization.fit {
						self.fit();
					}
					self.fire_stabilized();
				}
				_ => {}
			}
			if !self.options.physics.enabled {
				break;
			}
		}
	}

	fn fire_stabilized(&mut self) {
		for handler in std::mem::take(&mut self.on_stabilized) {
			handler(self);
		}
	}

	/// One solver step. Returns the fastest node velocity.
	fn step(&mut self) -> f64 {
		let (slots, bodies) = (&self.slots, &mut self.bodies);
		self.graph.visit_nodes(|node| {
			if let Some(body) = slots.get(&node.index()).and_then(|&i| bodies.get_mut(i)) {
				body.x = node.x() as f64;
				body.y = node.y() as f64;
				body.anchored = node.data.is_anchor;
			}
		});

		let max_velocity = solver::step(&mut self.bodies, &self.springs, &self.options.physics);

		let (slots, bodies) = (&self.slots, &self.bodies);
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(body) = slots.get(&node.index()).and_then(|&i| bodies.get(i)) {
				node.data.x = body.x as f32;
				node.data.y = body.y as f32;
			}
		});
		max_velocity
	}

	/// Centres the view on the graph and zooms out until every node is
	/// visible. Never zooms in past 1:1.
	pub fn fit(&mut self) {
		let (width, height) = (self.options.width, self.options.height);
		if width <= 0.0 || height <= 0.0 {
			return;
		}
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let r = node.data.user_data.style.radius() + FIT_MARGIN;
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x - r, y - r, x + r, y + r),
				Some((x0, y0, x1, y1)) => (x0.min(x - r), y0.min(y - r), x1.max(x + r), y1.max(y + r)),
			});
		});
		let Some((x0, y0, x1, y1)) = bounds else {
			return;
		};

		let k = (width / (x1 - x0))
			.min(height / (y1 - y0))
			.min(1.0)
			.max(MIN_ZOOM);
		self.transform = ViewTransform {
			x: width / 2.0 - (x0 + x1) / 2.0 * k,
			y: height / 2.0 - (y0 + y1) / 2.0 * k,
			k,
		};
		debug!("fitted #{} at zoom {k:.2}", self.container);
	}

	/// Screen position of a node under the current view transform.
	pub fn graph_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x * self.transform.k + self.transform.x,
			y * self.transform.k + self.transform.y,
		)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.style.radius() {
				found = Some(node.index());
			}
		});
		found
	}

	/// Pointer pressed at screen coordinates: grabs a node or starts panning.
	pub fn press(&mut self, x: f64, y: f64) {
		let hit = if self.options.interaction.drag_nodes {
			self.node_at_position(x, y)
		} else {
			None
		};

		if let Some(idx) = hit {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				..DragState::default()
			};
			let drag = &mut self.drag;
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					drag.node_start_x = node.data.x;
					drag.node_start_y = node.data.y;
					node.data.is_anchor = true;
				}
			});
		} else if self.options.interaction.drag_view {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer moved: drags the grabbed node, pans, or updates hover.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	/// Pointer released or left the canvas.
	pub fn release(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
				}
			});
		}
		self.drag.active = false;
		self.pan.active = false;
	}

	/// Zooms around screen point `(x, y)`; positive `delta_y` zooms out.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		if !self.options.interaction.zoom_view {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		self.hover.node = node;
		self.hover.neighbors.clear();
		if let Some(idx) = node {
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.neighbors.contains(&idx)
	}

	fn animate_hover(&mut self, dt: f64) {
		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (6.0 * dt).min(1.0);
		if self.hover.node.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
		}
	}
}
