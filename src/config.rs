//! Where the case graph is fetched from.

use log::warn;

/// Prefix of the case blueprint on the server.
pub const DEFAULT_API_BASE: &str = "/case";

/// The case-scoped `graph/getdata` endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEndpoint {
	/// URL prefix, without the trailing `/graph/getdata`.
	pub base: String,
	/// Case to load. `None` lets the server fall back to the user's current case.
	pub case_id: Option<u64>,
}

impl Default for GraphEndpoint {
	fn default() -> Self {
		Self::new(DEFAULT_API_BASE, None)
	}
}

impl GraphEndpoint {
	/// Endpoint under `base` for `case_id`.
	pub fn new(base: impl Into<String>, case_id: Option<u64>) -> Self {
		Self {
			base: base.into(),
			case_id,
		}
	}

	/// Endpoint for the raw `cid` query value of the page URL.
	pub fn from_cid(base: impl Into<String>, cid: Option<&str>) -> Self {
		let case_id = cid.and_then(|raw| match raw.trim().parse() {
			Ok(id) => Some(id),
			Err(_) => {
				warn!("ignoring invalid case id {raw:?}");
				None
			}
		});
		Self::new(base, case_id)
	}

	/// Query string selecting the case, empty when no case is set.
	pub fn case_param(&self) -> String {
		self.case_id
			.map(|cid| format!("?cid={cid}"))
			.unwrap_or_default()
	}

	/// Full request URL.
	pub fn url(&self) -> String {
		format!(
			"{}/graph/getdata{}",
			self.base.trim_end_matches('/'),
			self.case_param()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn url_is_case_scoped() {
		let endpoint = GraphEndpoint::new("/case", Some(42));
		assert_eq!(endpoint.url(), "/case/graph/getdata?cid=42");
	}

	#[test]
	fn trailing_slash_in_base_is_ignored() {
		let endpoint = GraphEndpoint::new("https://iris.local/case/", Some(1));
		assert_eq!(endpoint.url(), "https://iris.local/case/graph/getdata?cid=1");
	}

	#[test]
	fn missing_case_omits_query() {
		assert_eq!(GraphEndpoint::default().url(), "/case/graph/getdata");
	}

	#[test]
	fn cid_from_query_is_parsed_or_dropped() {
		assert_eq!(GraphEndpoint::from_cid("/case", Some(" 7 ")).case_id, Some(7));
		assert_eq!(GraphEndpoint::from_cid("/case", Some("7&x=1")).case_id, None);
		assert_eq!(GraphEndpoint::from_cid("/case", None).case_id, None);
	}
}
