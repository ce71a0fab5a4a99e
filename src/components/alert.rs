use leptos::prelude::*;

/// Blocking modal showing a failure to the user.
#[component]
pub fn AlertDialog(
	#[prop(into)] title: String,
	#[prop(into)] message: String,
	#[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
	view! {
		<div class="modal-backdrop" role="presentation">
			<div class="modal-dialog" role="alertdialog" aria-modal="true">
				<h2 class="modal-title">{title}</h2>
				<p class="modal-message">{message}</p>
				<button class="btn btn-danger" on:click=move |_| on_dismiss.run(())>
					"OK"
				</button>
			</div>
		</div>
	}
}
