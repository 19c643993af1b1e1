//! Main App Component

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use paygate_core::{ActorContext, GateError, Shell, Toasts, View};

use crate::api::{HttpActor, HttpIdentity};
use crate::browser;
use crate::components::{Header, ToastStack};
use crate::pages::{
    LoadingPage, PaymentFailurePage, PaymentSuccessPage, ProfileSetupPage, UpgradePage,
};

/// Handles shared by every page
#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
    revision: RwSignal<u64>,
    pub toasts: RwSignal<Toasts>,
}

impl AppState {
    /// Re-run the calling reactive scope whenever the shell changes
    pub fn track(&self) {
        self.revision.track();
    }

    /// Signal that the shell changed
    pub fn touch(&self) {
        self.revision.update(|r| *r += 1);
    }

    /// Refetch missing or stale remote state, then re-render
    pub fn sync(&self) {
        let state = self.clone();
        spawn_local(async move {
            if let Err(e) = state.shell.sync().await {
                tracing::warn!(error = %e, "sync failed");
            }
            state.touch();
        });
    }

    /// Show the normalized form of `err` as a toast
    pub fn toast_error(&self, err: &GateError) {
        let toasts = self.toasts;
        toasts.update(|t| {
            t.push_error(err);
        });
        set_timeout(
            move || toasts.update(|t| t.expire(Utc::now())),
            Duration::from_secs(Toasts::TTL_SECS.unsigned_abs()),
        );
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = browser::client_config();
    let identity = Arc::new(HttpIdentity::new(config.clone()));
    let shell = Arc::new(Shell::new(
        config.clone(),
        &browser::current_path(),
        identity.clone(),
    ));
    shell.attach_actor(ActorContext::ready(Arc::new(HttpActor::new(config))));

    let state = AppState {
        shell,
        revision: RwSignal::new(0),
        toasts: RwSignal::new(Toasts::new()),
    };
    provide_context(state.clone());

    // Re-render as login progresses (e.g. "Logging in...").
    {
        let mut statuses = identity.subscribe();
        let state = state.clone();
        spawn_local(async move {
            while statuses.changed().await.is_ok() {
                state.touch();
            }
        });
    }
    {
        let state = state.clone();
        spawn_local(async move {
            identity.restore().await;
            state.touch();
            state.sync();
        });
    }

    // Back/forward buttons feed the route; route changes feed the view.
    {
        let mut routes = state.shell.navigation().subscribe();
        let state = state.clone();
        spawn_local(async move {
            while routes.changed().await.is_ok() {
                state.touch();
            }
        });
    }
    {
        let shell = state.shell.clone();
        _ = window_event_listener(leptos::ev::popstate, move |_| {
            shell.navigate(&browser::current_path());
        });
    }

    let screen = Memo::new(move |_| {
        state.track();
        state.shell.view()
    });

    view! {
        <div class="app">
            {move || match screen.get() {
                View::Loading => view! { <LoadingPage /> }.into_any(),
                View::PaymentSuccess => view! { <PaymentSuccessPage /> }.into_any(),
                View::PaymentFailure => view! { <PaymentFailurePage /> }.into_any(),
                View::ProfileSetup => view! {
                    <Header />
                    <main class="content"><ProfileSetupPage /></main>
                }
                .into_any(),
                View::Main => view! {
                    <Header />
                    <main class="content"><UpgradePage /></main>
                }
                .into_any(),
            }}
            <ToastStack />
        </div>
    }
}
