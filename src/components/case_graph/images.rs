use std::collections::HashMap;

use log::{debug, warn};
use web_sys::HtmlImageElement;

/// Node pictures keyed by URL. Each URL is requested once; nodes fall back to
/// a placeholder until the browser has decoded the image.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// The loaded image for `url`, starting the request on first use.
	pub fn ready(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			let img = match HtmlImageElement::new() {
				Ok(img) => img,
				Err(err) => {
					warn!("cannot create image element for {url}: {err:?}");
					return None;
				}
			};
			img.set_src(url);
			self.images.insert(url.to_string(), img);
			debug!("loading node image {url} ({} known)", self.len());
		}
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}

	pub fn len(&self) -> usize {
		self.images.len()
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
	use super::*;
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn each_url_is_requested_once() {
		let mut cache = ImageCache::new();
		// not decoded yet on the first frame
		assert!(cache.ready("/static/assets/img/graph/desktop.png").is_none());
		let _ = cache.ready("/static/assets/img/graph/desktop.png");
		let _ = cache.ready("/static/assets/img/graph/ioc_desktop.png");
		assert_eq!(cache.len(), 2);
	}
}
