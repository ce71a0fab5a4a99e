use std::collections::BTreeMap;

use serde::Deserialize;

use super::types::GraphNode;

/// Horizontal space reserved around the canvas for the page chrome.
pub const VIEWPORT_MARGIN_X: f64 = 400.0;
/// Vertical space reserved around the canvas for the page chrome.
pub const VIEWPORT_MARGIN_Y: f64 = 250.0;

const ICON_FACE: &str = "'Font Awesome 5 Solid'";
// Font Awesome 5 glyphs are misaligned unless drawn bold.
const ICON_WEIGHT: &str = "bold";

/// Browser viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// `window.innerWidth`.
	pub width: f64,
	/// `window.innerHeight`.
	pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmoothType {
	Continuous,
	Horizontal,
	Vertical,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SmoothOptions {
	pub enabled: bool,
	pub kind: SmoothType,
	pub roundness: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeOptions {
	pub smooth: SmoothOptions,
	pub color: String,
	pub width: f64,
}

impl Default for EdgeOptions {
	fn default() -> Self {
		Self {
			smooth: SmoothOptions {
				enabled: true,
				kind: SmoothType::Continuous,
				roundness: 0.5,
			},
			color: "#848484".into(),
			width: 1.0,
		}
	}
}

/// Initial placement of nodes before the solver runs.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
	/// Seed for the initial positions, so a given graph always starts the same.
	pub random_seed: u64,
	/// Place connected nodes next to each other before simulating.
	pub improved_layout: bool,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			random_seed: 2,
			improved_layout: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionOptions {
	pub hide_edges_on_drag: bool,
	pub drag_nodes: bool,
	pub drag_view: bool,
	pub zoom_view: bool,
}

impl Default for InteractionOptions {
	fn default() -> Self {
		Self {
			hide_edges_on_drag: false,
			drag_nodes: true,
			drag_view: true,
			zoom_view: true,
		}
	}
}

/// ForceAtlas2-style constants. A negative gravitational constant repels.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceAtlas2Based {
	pub gravitational_constant: f64,
	pub central_gravity: f64,
	pub spring_length: f64,
	pub spring_constant: f64,
	pub damping: f64,
}

impl Default for ForceAtlas2Based {
	fn default() -> Self {
		Self {
			gravitational_constant: -167.0,
			central_gravity: 0.04,
			spring_length: 0.0,
			spring_constant: 0.02,
			damping: 0.9,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct StabilizationOptions {
	pub enabled: bool,
	/// Hard cap on solver steps before stabilization is declared done.
	pub iterations: u32,
	/// Solver steps run per animation frame while stabilizing.
	pub update_interval: u32,
	/// Zoom and centre the view on the graph once stabilized.
	pub fit: bool,
}

impl Default for StabilizationOptions {
	fn default() -> Self {
		Self {
			enabled: true,
			iterations: 1000,
			update_interval: 50,
			fit: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsOptions {
	pub enabled: bool,
	pub force_atlas2_based: ForceAtlas2Based,
	/// Layout is converged once no node moves faster than this.
	pub min_velocity: f64,
	pub timestep: f64,
	pub stabilization: StabilizationOptions,
}

impl Default for PhysicsOptions {
	fn default() -> Self {
		Self {
			enabled: true,
			force_atlas2_based: ForceAtlas2Based::default(),
			min_velocity: 0.41,
			timestep: 0.45,
			stabilization: StabilizationOptions::default(),
		}
	}
}

fn default_icon_size() -> f64 {
	50.0
}

fn default_icon_color() -> String {
	"#2B7CE9".into()
}

/// An icon-font glyph used as a node marker.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IconStyle {
	pub face: String,
	pub weight: String,
	pub code: char,
	#[serde(default = "default_icon_size")]
	pub size: f64,
	#[serde(default = "default_icon_color")]
	pub color: String,
}

impl IconStyle {
	fn font_awesome(code: char) -> Self {
		Self {
			face: ICON_FACE.into(),
			weight: ICON_WEIGHT.into(),
			code,
			size: default_icon_size(),
			color: default_icon_color(),
		}
	}

	/// CSS font shorthand for drawing the glyph.
	pub fn font(&self) -> String {
		format!("{} {}px {}", self.weight, self.size, self.face)
	}
}

fn default_image_size() -> f64 {
	25.0
}

/// Visual style of a node group.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum GroupStyle {
	Dot {
		color: String,
		size: f64,
	},
	Icon {
		icon: IconStyle,
	},
	/// Picture loaded from `image`, drawn `2 * size` pixels wide.
	Image {
		image: String,
		#[serde(default = "default_image_size")]
		size: f64,
	},
}

impl Default for GroupStyle {
	fn default() -> Self {
		GroupStyle::Dot {
			color: "#97C2FC".into(),
			size: 10.0,
		}
	}
}

impl GroupStyle {
	/// Radius used for hit testing and edge clipping.
	pub fn radius(&self) -> f64 {
		match self {
			GroupStyle::Dot { size, .. } | GroupStyle::Image { size, .. } => *size,
			GroupStyle::Icon { icon } => icon.size / 2.0,
		}
	}

	/// Same style at `size`. Icons keep their font size.
	pub fn with_size(self, size: f64) -> Self {
		match self {
			GroupStyle::Dot { color, .. } => GroupStyle::Dot { color, size },
			GroupStyle::Image { image, .. } => GroupStyle::Image { image, size },
			icon @ GroupStyle::Icon { .. } => icon,
		}
	}
}

/// Size range that node `value`s are mapped onto.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalingOptions {
	pub min: f64,
	pub max: f64,
}

impl Default for ScalingOptions {
	fn default() -> Self {
		Self {
			min: 10.0,
			max: 30.0,
		}
	}
}

impl ScalingOptions {
	/// Size for `value` given the smallest and largest value in the graph.
	/// Equal values all land in the middle of the range.
	pub fn size(&self, value: f64, lowest: f64, highest: f64) -> f64 {
		let scale = if highest == lowest {
			0.5
		} else {
			((value - lowest) / (highest - lowest)).max(0.0)
		};
		self.min + scale * (self.max - self.min)
	}
}

/// Group name to style mapping. Groups not listed fall back to the default dot.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct GroupStyles(BTreeMap<String, GroupStyle>);

impl Default for GroupStyles {
	fn default() -> Self {
		let mut groups = BTreeMap::new();
		groups.insert(
			"computer".to_string(),
			GroupStyle::Icon {
				icon: IconStyle::font_awesome('\u{f109}'),
			},
		);
		groups.insert(
			"account".to_string(),
			GroupStyle::Icon {
				icon: IconStyle::font_awesome('\u{f007}'),
			},
		);
		Self(groups)
	}
}

impl GroupStyles {
	/// Adds or replaces the style of `group`.
	pub fn insert(&mut self, group: impl Into<String>, style: GroupStyle) {
		self.0.insert(group.into(), style);
	}

	/// Merges `other` into `self`, `other` winning on conflicts.
	pub fn extend(&mut self, other: GroupStyles) {
		self.0.extend(other.0);
	}

	pub fn get(&self, group: &str) -> Option<&GroupStyle> {
		self.0.get(group)
	}

	/// Style for a node of the given group.
	pub fn resolve(&self, group: Option<&str>) -> GroupStyle {
		group
			.and_then(|g| self.get(g))
			.cloned()
			.unwrap_or_default()
	}

	/// Style for one node: an `image` shaped node with an image URL draws that
	/// image, anything else uses its group style.
	pub fn resolve_node(&self, node: &GraphNode) -> GroupStyle {
		match (node.shape.as_deref(), &node.image) {
			(Some("image"), Some(image)) => GroupStyle::Image {
				image: image.clone(),
				size: default_image_size(),
			},
			_ => self.resolve(node.group.as_deref()),
		}
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Full configuration of one render cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
	pub edges: EdgeOptions,
	pub layout: LayoutOptions,
	pub interaction: InteractionOptions,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	pub physics: PhysicsOptions,
	pub groups: GroupStyles,
	pub scaling: ScalingOptions,
}

impl RenderOptions {
	/// Options for a canvas sized from the viewport at call time.
	pub fn for_viewport(viewport: Viewport) -> Self {
		let (width, height) = canvas_size(viewport);
		Self {
			edges: EdgeOptions::default(),
			layout: LayoutOptions::default(),
			interaction: InteractionOptions::default(),
			width,
			height,
			physics: PhysicsOptions::default(),
			groups: GroupStyles::default(),
			scaling: ScalingOptions::default(),
		}
	}
}

/// Canvas size for a viewport, clamped at zero for tiny windows.
pub fn canvas_size(viewport: Viewport) -> (f64, f64) {
	(
		(viewport.width - VIEWPORT_MARGIN_X).max(0.0),
		(viewport.height - VIEWPORT_MARGIN_Y).max(0.0),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::case_graph::types::NodeId;

	#[test]
	fn canvas_is_viewport_minus_margins() {
		let options = RenderOptions::for_viewport(Viewport {
			width: 1920.0,
			height: 1080.0,
		});
		assert_eq!(options.width, 1520.0);
		assert_eq!(options.height, 830.0);
	}

	#[test]
	fn canvas_size_never_negative() {
		let (w, h) = canvas_size(Viewport {
			width: 300.0,
			height: 100.0,
		});
		assert_eq!((w, h), (0.0, 0.0));
	}

	#[test]
	fn defaults_match_case_graph_tuning() {
		let options = RenderOptions::for_viewport(Viewport {
			width: 1000.0,
			height: 800.0,
		});
		assert!(options.edges.smooth.enabled);
		assert_eq!(options.edges.smooth.kind, SmoothType::Continuous);
		assert_eq!(options.edges.smooth.roundness, 0.5);
		assert_eq!(options.layout.random_seed, 2);
		assert!(options.layout.improved_layout);
		assert!(!options.interaction.hide_edges_on_drag);
		assert!(options.physics.enabled);
		assert_eq!(options.physics.force_atlas2_based.gravitational_constant, -167.0);
		assert_eq!(options.physics.min_velocity, 0.41);
		assert_eq!(options.physics.timestep, 0.45);
	}

	#[test]
	fn predefined_groups_use_distinct_bold_icons() {
		let groups = GroupStyles::default();
		let computer = groups.resolve(Some("computer"));
		let account = groups.resolve(Some("account"));
		let (GroupStyle::Icon { icon: c }, GroupStyle::Icon { icon: a }) = (&computer, &account)
		else {
			panic!("expected icon styles, got {computer:?} / {account:?}");
		};
		assert_eq!(c.code, '\u{f109}');
		assert_eq!(a.code, '\u{f007}');
		assert_eq!(c.weight, "bold");
		assert_eq!(c.font(), "bold 50px 'Font Awesome 5 Solid'");
	}

	#[test]
	fn unknown_or_missing_group_falls_back_to_dot() {
		let groups = GroupStyles::default();
		assert_eq!(groups.resolve(Some("printer")), GroupStyle::default());
		assert_eq!(groups.resolve(None), GroupStyle::default());
	}

	#[test]
	fn groups_can_be_added_from_json() {
		let extra: GroupStyles = serde_json::from_str(
			r##"{
				"server": {"shape": "icon", "icon": {"face": "'Font Awesome 5 Solid'", "weight": "bold", "code": "\uf233"}},
				"ioc": {"shape": "dot", "color": "#ff0000", "size": 8.0}
			}"##,
		)
		.unwrap();
		let mut groups = GroupStyles::default();
		groups.extend(extra);

		assert_eq!(groups.len(), 4);
		match groups.resolve(Some("server")) {
			GroupStyle::Icon { icon } => {
				assert_eq!(icon.code, '\u{f233}');
				assert_eq!(icon.size, 50.0);
			}
			other => panic!("unexpected style {other:?}"),
		}
		assert_eq!(
			groups.resolve(Some("ioc")),
			GroupStyle::Dot {
				color: "#ff0000".into(),
				size: 8.0
			}
		);
	}

	#[test]
	fn image_shape_wins_over_group() {
		let groups = GroupStyles::default();
		let node = GraphNode {
			group: Some("computer".into()),
			shape: Some("image".into()),
			image: Some("/static/assets/img/graph/ioc_desktop.png".into()),
			..GraphNode::new(NodeId::Int(1))
		};
		assert_eq!(
			groups.resolve_node(&node),
			GroupStyle::Image {
				image: "/static/assets/img/graph/ioc_desktop.png".into(),
				size: 25.0,
			}
		);
	}

	#[test]
	fn image_shape_without_url_uses_group() {
		let groups = GroupStyles::default();
		let node = GraphNode {
			shape: Some("image".into()),
			..GraphNode::new(NodeId::Int(1))
		};
		assert_eq!(groups.resolve_node(&node), GroupStyle::default());
	}

	#[test]
	fn equal_values_scale_to_mid_range() {
		let scaling = ScalingOptions::default();
		assert_eq!(scaling.size(1.0, 1.0, 1.0), 20.0);
		assert_eq!(scaling.size(1.0, 1.0, 5.0), 10.0);
		assert_eq!(scaling.size(5.0, 1.0, 5.0), 30.0);
	}

	#[test]
	fn with_size_keeps_icon_font_size() {
		let icon = GroupStyles::default().resolve(Some("account"));
		assert_eq!(icon.clone().with_size(20.0), icon);
		assert_eq!(GroupStyle::default().with_size(20.0).radius(), 20.0);
	}
}
