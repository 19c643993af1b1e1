//! Upgrade Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use paygate_core::{CheckoutFlow, PRO_PLAN};

use crate::app::AppState;
use crate::browser::BrowserNavigator;

#[component]
pub fn UpgradePage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let flow = RwSignal::new(CheckoutFlow::new());

    // An error from the previous identity must not survive a login/logout.
    {
        let state = state.clone();
        Effect::new(move |_| {
            state.track();
            let authenticated = state.shell.auth().state().authenticated;
            flow.update(|f| f.observe_auth(authenticated));
        });
    }

    let readiness = {
        let state = state.clone();
        Memo::new(move |_| {
            state.track();
            state.shell.readiness()
        })
    };
    let unconfigured = {
        let state = state.clone();
        move || {
            state.track();
            state
                .shell
                .payments()
                .check(&state.shell.actor())
                .warn_unconfigured()
        }
    };

    let upgrade = move |_| {
        flow.update(CheckoutFlow::begin);

        let state = state.clone();
        spawn_local(async move {
            let outcome = state.shell.checkout(&BrowserNavigator).await;
            flow.update(|f| f.settle(&outcome));
        });
    };

    view! {
        <div class="upgrade">
            <section class="hero">
                <span class="badge">"Upgrade to Pro"</span>
                <h1>"Unlock Unlimited Script Generation"</h1>
                <p class="subtitle">
                    "Upgrade to Pro and create unlimited YouTube scripts without daily limits."
                </p>
            </section>

            <Show when=unconfigured>
                <div class="alert alert-error">
                    <strong>"Payment system not configured. "</strong>
                    "The administrator needs to configure the payment gateway before "
                    "payments can be accepted. Please check back later."
                </div>
            </Show>

            <div class="plan featured">
                <h2>{PRO_PLAN.name}</h2>
                <p class="subtitle">"One-time payment"</p>
                <div class="price">{PRO_PLAN.display_price()}</div>
                <ul>
                    <li>"Unlimited script generation"</li>
                    <li>"No daily limits"</li>
                    <li>"Save all your scripts"</li>
                    <li>"Priority support"</li>
                </ul>

                {move || flow.get().error().map(|message| view! {
                    <div class="alert alert-error">
                        <span>{message}</span>
                        <button class="dismiss" on:click=move |_| flow.update(CheckoutFlow::dismiss_error)>
                            "×"
                        </button>
                    </div>
                })}

                <button
                    class="btn btn-primary"
                    disabled=move || !flow.get().can_trigger(readiness.get())
                    on:click=upgrade
                >
                    {move || if flow.get().is_pending() {
                        "Redirecting..."
                    } else {
                        readiness.get().button_label()
                    }}
                </button>
            </div>
        </div>
    }
}
