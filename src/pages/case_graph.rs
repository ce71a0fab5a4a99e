use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use log::error;

use crate::api::fetch_case_graph;
use crate::components::alert::AlertDialog;
use crate::components::case_graph::{GraphPayload, NetworkCanvas};
use crate::config::{DEFAULT_API_BASE, GraphEndpoint};
use crate::error::FetchError;

/// Element id the network is mounted on.
pub const GRAPH_CONTAINER_ID: &str = "graph-container";
const ALERT_TITLE: &str = "Oh no !";

/// What a finished request does to the page.
#[derive(Debug, PartialEq)]
enum Outcome {
	/// Hand the graph to the canvas, replacing the current network.
	Render(GraphPayload),
	/// Show the message; the current network, if any, stays.
	Alert(String),
}

impl From<Result<GraphPayload, FetchError>> for Outcome {
	fn from(result: Result<GraphPayload, FetchError>) -> Self {
		match result {
			Ok(graph) => Outcome::Render(graph),
			Err(err) => {
				error!("case graph request failed: {err}");
				Outcome::Alert(err.to_string())
			}
		}
	}
}

/// Graph of the case selected by the `cid` query parameter.
#[component]
pub fn CaseGraph() -> impl IntoView {
	let query = use_query_map();
	let endpoint = StoredValue::new(
		query.with_untracked(|q| GraphEndpoint::from_cid(DEFAULT_API_BASE, q.get("cid").as_deref())),
	);

	let (payload, set_payload) = signal(None::<GraphPayload>);
	let (failure, set_failure) = signal(None::<String>);
	let (loading, set_loading) = signal(false);

	// a failed fetch leaves the current network on screen
	let load = move || {
		let endpoint = endpoint.get_value();
		set_loading.set(true);
		wasm_bindgen_futures::spawn_local(async move {
			match Outcome::from(fetch_case_graph(&endpoint).await) {
				Outcome::Render(graph) => set_payload.set(Some(graph)),
				Outcome::Alert(message) => set_failure.set(Some(message)),
			}
			set_loading.set(false);
		});
	};
	load();

	view! {
		<div class="case-graph">
			<div class="case-graph-toolbar">
				<button
					class="btn btn-sm btn-primary"
					disabled=move || loading.get()
					on:click=move |_| load()
				>
					{move || if loading.get() { "Loading..." } else { "Refresh" }}
				</button>
			</div>

			<Show when=move || loading.get()>
				<div class="loader">"Loading graph..."</div>
			</Show>

			<NetworkCanvas
				payload=payload
				container_id=GRAPH_CONTAINER_ID
				on_error=move |message: String| set_failure.set(Some(message))
			/>

			{move || {
				failure
					.get()
					.map(|message| {
						view! {
							<AlertDialog
								title=ALERT_TITLE
								message=message
								on_dismiss=move |_: ()| set_failure.set(None)
							/>
						}
					})
			}}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::parse_response;
	use crate::components::case_graph::{Container, GraphRenderer};
	use crate::components::case_graph::options::Viewport;

	const GRAPH: &str = r#"{"status":"success","data":{
		"nodes":[{"id":1,"label":"WKS-01"},{"id":2,"label":"DC-01"}],
		"edges":[{"from":1,"to":2}]}}"#;
	const NOT_FOUND: &str = r#"{"status":"error","message":"case not found","data":[]}"#;

	fn container() -> Container {
		Container::new(
			GRAPH_CONTAINER_ID,
			Viewport {
				width: 1400.0,
				height: 1050.0,
			},
		)
	}

	/// What the canvas does with an outcome.
	fn apply(renderer: &mut GraphRenderer, outcome: Outcome) -> Option<String> {
		match outcome {
			Outcome::Render(graph) => {
				renderer.render(&graph, &container()).unwrap();
				None
			}
			Outcome::Alert(message) => Some(message),
		}
	}

	#[test]
	fn successful_request_renders_the_graph() {
		match Outcome::from(parse_response(GRAPH)) {
			Outcome::Render(graph) => assert_eq!(graph.nodes.len(), 2),
			other => panic!("expected a graph, got {other:?}"),
		}
	}

	#[test]
	fn failed_request_alerts_with_the_server_message() {
		assert_eq!(
			Outcome::from(parse_response(NOT_FOUND)),
			Outcome::Alert("case not found".into())
		);
	}

	#[test]
	fn failed_request_creates_no_network() {
		let mut renderer = GraphRenderer::new();
		let alert = apply(&mut renderer, Outcome::from(parse_response(NOT_FOUND)));
		assert_eq!(alert.as_deref(), Some("case not found"));
		assert!(renderer.network().is_none());
		assert_eq!(renderer.renders(), 0);
	}

	#[test]
	fn failed_refresh_keeps_the_current_network() {
		let mut renderer = GraphRenderer::new();
		assert_eq!(apply(&mut renderer, Outcome::from(parse_response(GRAPH))), None);

		let alert = apply(
			&mut renderer,
			Outcome::from(Err(FetchError::Transport("HTTP 502".into()))),
		);
		assert_eq!(alert.as_deref(), Some("HTTP 502"));
		assert_eq!(renderer.renders(), 1);
		assert_eq!(renderer.network().map(|net| net.node_count()), Some(2));
	}
}
