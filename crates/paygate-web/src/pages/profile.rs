//! Profile Setup Page

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use paygate_core::ErrorSlot;
use paygate_core::profile::draft_profile;

use crate::app::AppState;

#[component]
pub fn ProfileSetupPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let name = RwSignal::new(String::new());
    let saving = RwSignal::new(false);
    let error = RwSignal::new(ErrorSlot::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(profile) = draft_profile(&name.get()) else {
            return;
        };

        saving.set(true);
        error.update(ErrorSlot::clear);

        let state = state.clone();
        spawn_local(async move {
            let ctx = state.shell.actor();
            match state.shell.profiles().save(&ctx, &profile).await {
                Ok(()) => {
                    saving.set(false);
                    state.sync();
                }
                Err(e) => {
                    error.update(|slot| slot.set_error(&e));
                    saving.set(false);
                }
            }
        });
    };

    view! {
        <div class="card profile-setup">
            <h2>"Welcome!"</h2>
            <p class="subtitle">"Please tell us your name to get started."</p>
            <form on:submit=submit>
                <label for="name">"Your Name"</label>
                <input
                    id="name"
                    type="text"
                    placeholder="Enter your name"
                    required
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                    disabled=move || saving.get()
                />
                {move || error.get().message().map(|message| view! {
                    <div class="alert alert-error">{message}</div>
                })}
                <button
                    type="submit"
                    class="btn btn-primary"
                    disabled=move || saving.get() || draft_profile(&name.get()).is_none()
                >
                    {move || if saving.get() { "Saving..." } else { "Continue" }}
                </button>
            </form>
        </div>
    }
}
