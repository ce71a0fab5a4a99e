use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::images::ImageCache;
use super::network::{Container, GraphRenderer};
use super::options::{GroupStyles, Viewport};
use super::render;
use super::types::GraphPayload;

const FRAME_DT: f32 = 0.016;
const FALLBACK_VIEWPORT: Viewport = Viewport {
	width: 1280.0,
	height: 800.0,
};

fn viewport(window: &Window) -> Viewport {
	let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
	match (read(window.inner_width()), read(window.inner_height())) {
		(Some(width), Some(height)) => Viewport { width, height },
		_ => FALLBACK_VIEWPORT,
	}
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas that renders the latest payload as a force-directed network.
///
/// Every new payload replaces the displayed network. The canvas is sized from
/// the viewport when the payload arrives and is not resized afterwards.
#[component]
pub fn NetworkCanvas(
	#[prop(into)] payload: Signal<Option<GraphPayload>>,
	#[prop(into)] container_id: String,
	#[prop(optional)] groups: Option<GroupStyles>,
	#[prop(optional, into)] on_error: Option<Callback<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let renderer = Rc::new(RefCell::new(
		GraphRenderer::new().with_groups(groups.unwrap_or_default()),
	));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (renderer_init, animate_init) = (renderer.clone(), animate.clone());
	let canvas_id = container_id.clone();

	Effect::new(move |_| {
		let Some(payload) = payload.get() else {
			return;
		};
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let container = Container::new(container_id.clone(), viewport(&window));
		let size = renderer_init
			.borrow_mut()
			.render(&payload, &container)
			.map(|net| (net.width(), net.height()));
		match size {
			Ok((w, h)) => {
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
			}
			Err(err) => {
				error!("cannot render case graph: {err}");
				if let Some(on_error) = on_error.as_ref() {
					on_error.run(err.to_string());
				}
				return;
			}
		}

		// the frame loop reads whichever network is current
		if animate_init.borrow().is_some() {
			return;
		}
		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					warn!("2d context has an unexpected type");
					return;
				}
			},
			_ => {
				warn!("canvas #{} has no 2d context", container.id);
				return;
			}
		};

		let (renderer_anim, animate_inner) = (renderer_init.clone(), animate_init.clone());
		let mut images = ImageCache::new();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(net) = renderer_anim.borrow_mut().network_mut() {
				net.tick(FRAME_DT);
				render::render(net, &ctx, &mut images);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let renderer_md = renderer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(net) = renderer_md.borrow_mut().network_mut() {
			net.press(x, y);
		}
	};

	let renderer_mm = renderer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(net) = renderer_mm.borrow_mut().network_mut() {
			net.pointer_move(x, y);
		}
	};

	let renderer_mu = renderer.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(net) = renderer_mu.borrow_mut().network_mut() {
			net.release();
		}
	};

	let renderer_ml = renderer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(net) = renderer_ml.borrow_mut().network_mut() {
			net.release();
			net.set_hover(None);
		}
	};

	let renderer_wh = renderer.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(net) = renderer_wh.borrow_mut().network_mut() {
			net.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			id=canvas_id
			node_ref=canvas_ref
			class="case-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
	use super::*;
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn viewport_reads_window_size() {
		let window = web_sys::window().unwrap();
		let v = viewport(&window);
		assert!(v.width > 0.0 && v.height > 0.0);
	}
}
