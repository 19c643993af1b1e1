//! UI Components

use leptos::prelude::*;
use leptos::task::spawn_local;
use paygate_core::auth::AuthChange;
use paygate_core::notice::ToastLevel;

use crate::app::AppState;

/// Title bar with greeting and the login/logout toggle
#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<AppState>();

    let button = {
        let state = state.clone();
        move || {
            state.track();
            state.shell.auth().button()
        }
    };
    let greeting = {
        let state = state.clone();
        move || {
            state.track();
            state
                .shell
                .profiles()
                .current()
                .map(|profile| format!("Welcome, {}", profile.name))
        }
    };

    let toggle = move |_| {
        let state = state.clone();
        spawn_local(async move {
            match state.shell.auth().toggle().await {
                Ok(AuthChange::Ignored) => {}
                Ok(_) => state.sync(),
                Err(e) => state.toast_error(&e),
            }
            state.touch();
        });
    };

    let button_label = {
        let button = button.clone();
        move || button().label
    };

    view! {
        <header class="header">
            <span class="brand">"ScriptGen"</span>
            <span class="greeting">{greeting}</span>
            <button class="btn" disabled=move || button().disabled on:click=toggle>
                {button_label}
            </button>
        </header>
    }
}

const fn toast_class(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Info => "toast toast-info",
        ToastLevel::Error => "toast toast-error",
    }
}

/// Floating notifications, newest last
#[component]
pub fn ToastStack() -> impl IntoView {
    let toasts = expect_context::<AppState>().toasts;

    view! {
        <div class="toasts">
            <For each=move || toasts.get().items().to_vec() key=|toast| toast.id let:toast>
                <div class=toast_class(toast.level)>
                    <span>{toast.message}</span>
                    <button
                        class="dismiss"
                        on:click=move |_| toasts.update(|t| {
                            t.dismiss(toast.id);
                        })
                    >
                        "×"
                    </button>
                </div>
            </For>
        </div>
    }
}
