use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;

use super::options::LayoutOptions;
use super::types::GraphPayload;

const NODE_SPACING: f64 = 60.0;
const MIN_RING_RADIUS: f64 = 100.0;
const JITTER: f64 = 5.0;

/// Small LCG so a given seed always yields the same layout.
#[derive(Clone, Debug)]
pub struct SeededRng(u64);

impl SeededRng {
	pub fn new(seed: u64) -> Self {
		Self(seed)
	}

	/// Next value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = (self.0.wrapping_add(1).wrapping_mul(9301).wrapping_add(49297)) % 233280;
		(self.0 as f64) / 233280.0
	}

	fn centered(&mut self, span: f64) -> f64 {
		(self.next_f64() - 0.5) * span
	}
}

/// Initial positions for the payload's nodes, in payload order, centred on the origin.
pub fn initial_positions(payload: &GraphPayload, layout: &LayoutOptions) -> Vec<(f32, f32)> {
	let n = payload.nodes.len();
	let mut rng = SeededRng::new(layout.random_seed);
	if n == 0 {
		return Vec::new();
	}

	if !layout.improved_layout {
		let side = (n as f64).sqrt() * NODE_SPACING * 2.0;
		return (0..n)
			.map(|_| (rng.centered(side) as f32, rng.centered(side) as f32))
			.collect();
	}

	let radius = (n as f64 * NODE_SPACING / (2.0 * PI)).max(MIN_RING_RADIUS);
	let mut positions = vec![(0.0, 0.0); n];
	for (slot, idx) in traversal_order(payload).into_iter().enumerate() {
		let angle = slot as f64 * 2.0 * PI / n as f64;
		positions[idx] = (
			(radius * angle.cos() + rng.centered(JITTER)) as f32,
			(radius * angle.sin() + rng.centered(JITTER)) as f32,
		);
	}
	positions
}

/// Breadth-first order over every connected component, so neighbours land on
/// adjacent ring slots.
fn traversal_order(payload: &GraphPayload) -> Vec<usize> {
	let n = payload.nodes.len();
	let index: HashMap<_, _> = payload
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (&node.id, i))
		.collect();

	let mut adjacency = vec![Vec::new(); n];
	for edge in &payload.edges {
		if let (Some(&a), Some(&b)) = (index.get(&edge.from), index.get(&edge.to)) {
			adjacency[a].push(b);
			adjacency[b].push(a);
		}
	}

	let mut visited = vec![false; n];
	let mut order = Vec::with_capacity(n);
	let mut queue = VecDeque::new();
	for start in 0..n {
		if visited[start] {
			continue;
		}
		visited[start] = true;
		queue.push_back(start);
		while let Some(current) = queue.pop_front() {
			order.push(current);
			for &next in &adjacency[current] {
				if !visited[next] {
					visited[next] = true;
					queue.push_back(next);
				}
			}
		}
	}
	order
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::case_graph::types::{GraphEdge, GraphNode, NodeId};

	fn payload(n: i64, edges: &[(i64, i64)]) -> GraphPayload {
		GraphPayload {
			nodes: (0..n)
				.map(|id| GraphNode::new(NodeId::Int(id)))
				.collect(),
			edges: edges
				.iter()
				.map(|&(from, to)| GraphEdge {
					from: NodeId::Int(from),
					to: NodeId::Int(to),
					title: None,
					color: None,
				})
				.collect(),
		}
	}

	#[test]
	fn same_seed_same_positions() {
		let graph = payload(12, &[(0, 1), (1, 2), (5, 9)]);
		let layout = LayoutOptions::default();
		assert_eq!(
			initial_positions(&graph, &layout),
			initial_positions(&graph, &layout)
		);
	}

	#[test]
	fn different_seed_moves_nodes() {
		let graph = payload(5, &[]);
		let a = initial_positions(&graph, &LayoutOptions::default());
		let b = initial_positions(
			&graph,
			&LayoutOptions {
				random_seed: 7,
				..LayoutOptions::default()
			},
		);
		assert_ne!(a, b);
	}

	#[test]
	fn empty_graph_has_no_positions() {
		assert!(initial_positions(&payload(0, &[]), &LayoutOptions::default()).is_empty());
	}

	#[test]
	fn traversal_keeps_components_contiguous() {
		// 0-3 and 1-2 are separate components; BFS from 0 should visit 3 next.
		let graph = payload(4, &[(0, 3), (1, 2)]);
		assert_eq!(traversal_order(&graph), vec![0, 3, 1, 2]);
	}

	#[test]
	fn improved_layout_places_every_node_on_the_ring() {
		let graph = payload(6, &[(0, 1), (2, 3)]);
		let positions = initial_positions(&graph, &LayoutOptions::default());
		assert_eq!(positions.len(), 6);
		for (x, y) in positions {
			let r = ((x * x + y * y) as f64).sqrt();
			assert!((r - MIN_RING_RADIUS).abs() < JITTER * 2.0, "radius {r}");
		}
	}
}
