//! Payment Callback Pages
//!
//! Landing pages for the checkout gateway's redirects. Both leave with a
//! full navigation so the app boots fresh at the home route.

use leptos::prelude::*;
use paygate_core::View;

use crate::browser;

fn leave(view: View) {
    if let Some(target) = view.home_action() {
        if let Err(e) = browser::go_to(target) {
            tracing::error!(error = %e, "could not leave callback page");
        }
    }
}

#[component]
pub fn PaymentSuccessPage() -> impl IntoView {
    view! {
        <div class="callback callback-success">
            <h1>"Payment Successful!"</h1>
            <p class="subtitle">
                "Your upgrade to Pro has been completed successfully. "
                "You now have unlimited access to script generation."
            </p>
            <p class="note">
                "Your Pro features are now active. You can start creating unlimited "
                "YouTube scripts right away."
            </p>
            <button class="btn btn-primary" on:click=move |_| leave(View::PaymentSuccess)>
                "Continue to App"
            </button>
        </div>
    }
}

#[component]
pub fn PaymentFailurePage() -> impl IntoView {
    view! {
        <div class="callback callback-failure">
            <h1>"Payment Cancelled"</h1>
            <p class="subtitle">
                "Your payment was not completed. No charges have been made to your account."
            </p>
            <p class="note">
                "If you encountered any issues during checkout, please try again or "
                "contact our support team for assistance."
            </p>
            <button class="btn btn-primary" on:click=move |_| leave(View::PaymentFailure)>
                "Return to Upgrade Page"
            </button>
        </div>
    }
}
