use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::images::ImageCache;
use super::options::{GroupStyle, SmoothOptions, SmoothType};
use super::state::Network;

const BACKGROUND: &str = "#ffffff";
const LABEL_COLOR: &str = "#343434";
/// Drawn while an image node's picture is still loading.
const IMAGE_PLACEHOLDER: &str = "#97C2FC";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Quadratic control point for a smoothed edge, or `None` for a straight line.
pub fn control_point(from: (f64, f64), to: (f64, f64), smooth: &SmoothOptions) -> Option<(f64, f64)> {
	if !smooth.enabled {
		return None;
	}
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let horizontal = match smooth.kind {
		SmoothType::Horizontal => true,
		SmoothType::Vertical => false,
		SmoothType::Continuous => dx.abs() >= dy.abs(),
	};
	// leave the source along the dominant axis, then bend towards the target
	Some(if horizontal {
		(from.0 + dx * smooth.roundness, from.1)
	} else {
		(from.0, from.1 + dy * smooth.roundness)
	})
}

/// Centre and radius of the loop drawn for an edge from a node to itself.
pub fn self_loop(x: f64, y: f64, node_radius: f64) -> (f64, f64, f64) {
	let r = (node_radius * 0.75).max(8.0);
	(x + node_radius * 0.7, y - node_radius * 0.7, r)
}

pub fn render(net: &Network, ctx: &CanvasRenderingContext2d, images: &mut ImageCache) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, net.width(), net.height());
	ctx.save();
	let _ = ctx.translate(net.transform.x, net.transform.y);
	let _ = ctx.scale(net.transform.k, net.transform.k);

	let hide_edges = net.options().interaction.hide_edges_on_drag && net.drag.active;
	if !hide_edges {
		draw_edges(net, ctx);
	}
	draw_nodes(net, ctx, images);
	ctx.restore();
}

fn positions(net: &Network) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
	let mut out = HashMap::new();
	net.graph.visit_nodes(|node| {
		out.insert(
			node.index(),
			(
				node.x() as f64,
				node.y() as f64,
				node.data.user_data.style.radius(),
			),
		);
	});
	out
}

fn draw_edges(net: &Network, ctx: &CanvasRenderingContext2d) {
	let options = &net.options().edges;
	let positions = positions(net);
	let t = ease_out_cubic(net.hover.highlight_t);
	let has_highlight = net.hover.node.is_some();
	let base_width = options.width / net.transform.k.max(0.5);

	for edge in &net.edges {
		let (Some(&(x0, y0, r0)), Some(&(x1, y1, _))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (from, to) = ((x0, y0), (x1, y1));

		let highlighted = has_highlight
			&& (net.hover.node == Some(edge.source) || net.hover.node == Some(edge.target));
		let (alpha, width) = match (has_highlight, highlighted) {
			(false, _) => (1.0, base_width),
			(true, true) => (1.0, base_width * (1.0 + t)),
			(true, false) => (1.0 - 0.7 * t, base_width),
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(edge.color.as_deref().unwrap_or(&options.color));
		ctx.set_line_width(width);
		ctx.begin_path();
		if edge.is_self_loop() {
			let (cx, cy, r) = self_loop(x0, y0, r0);
			let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
		} else {
			ctx.move_to(from.0, from.1);
			match control_point(from, to, &options.smooth) {
				Some((cx, cy)) => ctx.quadratic_curve_to(cx, cy, to.0, to.1),
				None => ctx.line_to(to.0, to.1),
			}
		}
		ctx.stroke();

		if highlighted && t > 0.5 {
			if let Some(title) = &edge.title {
				ctx.set_fill_style_str(LABEL_COLOR);
				ctx.set_font("11px sans-serif");
				let _ = ctx.fill_text(title, (from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
			}
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_dot(ctx: &CanvasRenderingContext2d, x: f64, y: f64, size: f64, color: &str) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, size, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
}

fn draw_nodes(net: &Network, ctx: &CanvasRenderingContext2d, images: &mut ImageCache) {
	let has_highlight = net.hover.node.is_some();
	let t = ease_out_cubic(net.hover.highlight_t);
	let k = net.transform.k;

	net.graph.visit_nodes(|node| {
		let idx = node.index();
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let dimmed = has_highlight && !net.is_highlighted(idx);
		ctx.set_global_alpha(if dimmed { 1.0 - 0.7 * t } else { 1.0 });

		match &info.style {
			GroupStyle::Dot { color, size } => {
				draw_dot(ctx, x, y, *size, info.color.as_deref().unwrap_or(color));
			}
			GroupStyle::Image { image, size } => match images.ready(image) {
				Some(img) => {
					let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
						img,
						x - size,
						y - size,
						2.0 * size,
						2.0 * size,
					);
				}
				None => draw_dot(ctx, x, y, *size, IMAGE_PLACEHOLDER),
			},
			GroupStyle::Icon { icon } => {
				ctx.set_font(&icon.font());
				ctx.set_text_align("center");
				ctx.set_text_baseline("middle");
				ctx.set_fill_style_str(info.color.as_deref().unwrap_or(&icon.color));
				let _ = ctx.fill_text(&icon.code.to_string(), x, y);
			}
		}

		if net.hover.node == Some(idx) && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, info.style.radius() + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(43, 124, 233, {})", 0.8 * t));
			ctx.set_line_width(1.5 / k);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(4.0 / k),
				&JsValue::from_f64(2.0 / k),
			));
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.set_text_align("center");
		ctx.set_text_baseline("top");
		ctx.set_font(&format!("{}px sans-serif", 14.0 / k.max(0.5)));
		ctx.set_fill_style_str(LABEL_COLOR);
		let below = y + info.style.radius() + 4.0;
		if let Some(label) = &info.label {
			let _ = ctx.fill_text(label, x, below);
		}
		if net.hover.node == Some(idx) && t > 0.5 {
			if let Some(title) = &info.title {
				let _ = ctx.fill_text(title, x, below + 16.0 / k.max(0.5));
			}
		}
	});
	ctx.set_global_alpha(1.0);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn smooth(kind: SmoothType) -> SmoothOptions {
		SmoothOptions {
			enabled: true,
			kind,
			roundness: 0.5,
		}
	}

	#[test]
	fn diagonal_continuous_edge_is_curved() {
		let (cx, cy) = control_point((0.0, 0.0), (100.0, 40.0), &smooth(SmoothType::Continuous)).unwrap();
		assert_eq!((cx, cy), (50.0, 0.0));
		// control point off the chord y = 0.4x
		assert!((cy - 0.4 * cx).abs() > 1.0);
	}

	#[test]
	fn continuous_follows_dominant_axis() {
		let c = control_point((0.0, 0.0), (10.0, -80.0), &smooth(SmoothType::Continuous)).unwrap();
		assert_eq!(c, (0.0, -40.0));
	}

	#[test]
	fn forced_direction_overrides_dominant_axis() {
		let c = control_point((0.0, 0.0), (10.0, -80.0), &smooth(SmoothType::Horizontal)).unwrap();
		assert_eq!(c, (5.0, 0.0));
	}

	#[test]
	fn disabled_smoothing_draws_straight() {
		let mut options = smooth(SmoothType::Continuous);
		options.enabled = false;
		assert_eq!(control_point((0.0, 0.0), (1.0, 1.0), &options), None);
	}

	#[test]
	fn self_loop_sits_on_the_node_rim() {
		let (cx, cy, r) = self_loop(100.0, 50.0, 20.0);
		assert!((cx - 114.0).abs() < 1e-9 && (cy - 36.0).abs() < 1e-9);
		assert_eq!(r, 15.0);
		// loop overlaps the node so it reads as attached
		let gap = ((cx - 100.0).powi(2) + (cy - 50.0).powi(2)).sqrt();
		assert!(gap < 20.0 + r);
		assert_eq!(self_loop(0.0, 0.0, 4.0).2, 8.0);
	}

	#[test]
	fn ease_out_cubic_endpoints() {
		assert_eq!(ease_out_cubic(0.0), 0.0);
		assert_eq!(ease_out_cubic(1.0), 1.0);
	}
}
