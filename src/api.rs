//! Fetching the case graph from the server.

use gloo_net::http::Request;
use log::{debug, info};
use serde::Deserialize;

use crate::components::case_graph::GraphPayload;
use crate::config::GraphEndpoint;
use crate::error::FetchError;

const SUCCESS: &str = "success";

/// Response envelope shared by every endpoint of the server API.
#[derive(Debug, Deserialize)]
struct Envelope {
	status: String,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	data: Option<serde_json::Value>,
}

/// Decodes a `graph/getdata` body into a validated payload.
pub fn parse_response(body: &str) -> Result<GraphPayload, FetchError> {
	let envelope: Envelope = serde_json::from_str(body)?;
	if envelope.status != SUCCESS {
		let message = envelope
			.message
			.filter(|m| !m.is_empty())
			.unwrap_or_else(|| format!("request failed with status {:?}", envelope.status));
		return Err(FetchError::Logical(message));
	}

	let data = envelope
		.data
		.ok_or_else(|| FetchError::Malformed("success response without data".into()))?;
	let payload: GraphPayload = serde_json::from_value(data)?;
	payload.validate()?;
	Ok(payload)
}

/// Requests the graph of the endpoint's case. No retry, no caching.
pub async fn fetch_case_graph(endpoint: &GraphEndpoint) -> Result<GraphPayload, FetchError> {
	let url = endpoint.url();
	info!("fetching case graph from {url}");

	let response = Request::get(&url).send().await?;
	if !response.ok() {
		let status_text = response.status_text();
		return Err(FetchError::Transport(if status_text.is_empty() {
			format!("HTTP {}", response.status())
		} else {
			status_text
		}));
	}

	let body = response.text().await?;
	let payload = parse_response(&body)?;
	debug!(
		"case graph received: {} nodes, {} edges",
		payload.nodes.len(),
		payload.edges.len()
	);
	Ok(payload)
}
