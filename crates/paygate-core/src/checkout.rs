//! Hosted Checkout
//!
//! ```text
//! ┌─────────────┐   create session   ┌─────────┐
//! │  Upgrade    │───────────────────▶│  Actor  │
//! │  button     │◀─── serialized ────│         │
//! └─────┬───────┘      session       └─────────┘
//!       │ decode + full-page redirect
//!       ▼
//! ┌─────────────────┐   /payment-success   ┌─────────────┐
//! │ Gateway hosted  │─────────────────────▶│  Callback   │
//! │ checkout page   │   /payment-failure   │  screens    │
//! └─────────────────┘─────────────────────▶└─────────────┘
//! ```
//!
//! The redirect is a one-way handoff: control only comes back through the two
//! callback routes. Each attempt is single-shot with no retry and no timeout;
//! callers disable the trigger while an attempt is pending.

use std::sync::{Arc, Mutex, PoisonError};

use crate::actor::ActorContext;
use crate::cache::{QueryCache, QueryKey};
use crate::cart::{PlanPricing, ShoppingItem};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::normalize::FailureClass;
use crate::notice::ErrorSlot;
use crate::session::CheckoutSession;

/// Shown instead of calling the backend when nobody is logged in
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to upgrade to Pro.";

/// Where the gateway sends the user back to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CallbackUrls {
    /// Origin plus the configured callback paths
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let origin = config.normalized_origin()?;
        Ok(Self {
            success_url: format!("{origin}{}", config.success_path),
            cancel_url: format!("{origin}{}", config.failure_path),
        })
    }
}

/// Creates checkout sessions through the actor
#[derive(Clone, Debug)]
pub struct CheckoutInitiator {
    ctx: ActorContext,
    urls: CallbackUrls,
}

impl CheckoutInitiator {
    pub const fn new(ctx: ActorContext, urls: CallbackUrls) -> Self {
        Self { ctx, urls }
    }

    pub const fn urls(&self) -> &CallbackUrls {
        &self.urls
    }

    /// Ask the backend for a session and decode it. Single attempt.
    pub async fn initiate(&self, cart: &[ShoppingItem]) -> Result<CheckoutSession> {
        let actor = self.ctx.actor()?;

        tracing::debug!(items = cart.len(), "creating checkout session");
        let raw = actor
            .create_checkout_session(cart, &self.urls.success_url, &self.urls.cancel_url)
            .await?;

        CheckoutSession::decode(&raw)
    }
}

/// Full-page navigation to an external URL
pub trait Navigator {
    fn redirect(&self, url: &str) -> Result<()>;
}

/// Navigator that only records targets (for testing)
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) -> Result<()> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }
}

/// Result of the payments-configured check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentsCheck {
    Checking,
    Configured,
    Unconfigured,
}

impl PaymentsCheck {
    /// Whether to warn that payments cannot be accepted yet
    pub const fn warn_unconfigured(self) -> bool {
        matches!(self, Self::Unconfigured)
    }
}

/// Cached `is_stripe_configured` lookup
#[derive(Clone)]
pub struct PaymentsStatus {
    cache: Arc<QueryCache>,
}

impl PaymentsStatus {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    /// Ask the backend once; failures count as "not configured"
    pub async fn refresh(&self, ctx: &ActorContext) -> bool {
        let Ok(actor) = ctx.actor() else {
            return false;
        };
        if !self.cache.needs_fetch(QueryKey::PaymentsConfigured) {
            return self
                .cache
                .get::<bool>(QueryKey::PaymentsConfigured)
                .unwrap_or(false);
        }

        let ticket = self.cache.begin(QueryKey::PaymentsConfigured);
        let configured = match actor.is_stripe_configured().await {
            Ok(configured) => configured,
            Err(e) => {
                tracing::error!(error = %e, "failed to check payment configuration");
                false
            }
        };
        self.cache.complete(ticket, configured);
        configured
    }

    /// A ready actor whose answer has not arrived yet counts as checking
    pub fn check(&self, ctx: &ActorContext) -> PaymentsCheck {
        let snap = self.cache.snapshot::<bool>(QueryKey::PaymentsConfigured);
        if ctx.is_fetching() || snap.is_loading() {
            return PaymentsCheck::Checking;
        }
        match snap.value {
            Some(true) => PaymentsCheck::Configured,
            Some(false) => PaymentsCheck::Unconfigured,
            None if ctx.is_ready() && !snap.fetched => PaymentsCheck::Checking,
            None => PaymentsCheck::Unconfigured,
        }
    }
}

/// Whether an upgrade may be attempted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    LoginRequired,
    CheckingPayments,
    PaymentsUnavailable,
    Ready,
}

impl Readiness {
    pub const fn evaluate(authenticated: bool, payments: PaymentsCheck) -> Self {
        if !authenticated {
            return Self::LoginRequired;
        }
        match payments {
            PaymentsCheck::Checking => Self::CheckingPayments,
            PaymentsCheck::Unconfigured => Self::PaymentsUnavailable,
            PaymentsCheck::Configured => Self::Ready,
        }
    }

    /// Local message shown instead of calling the backend
    pub const fn blocked_message(self) -> Option<&'static str> {
        match self {
            Self::LoginRequired => Some(LOGIN_REQUIRED_MESSAGE),
            Self::CheckingPayments => Some(FailureClass::AppStillLoading.message()),
            Self::PaymentsUnavailable => Some(FailureClass::PaymentNotConfigured.message()),
            Self::Ready => None,
        }
    }

    pub const fn button_label(self) -> &'static str {
        match self {
            Self::LoginRequired => "Login to Upgrade",
            Self::CheckingPayments => "Checking Payments...",
            Self::PaymentsUnavailable => "Payment Not Available",
            Self::Ready => "Upgrade Now",
        }
    }
}

/// How one upgrade attempt ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Preconditions not met; the backend was not called
    Blocked(&'static str),

    /// Browser handed off to the gateway
    Redirected(CheckoutSession),

    /// Backend, decode or redirect failure
    Failed(FailureClass),
}

impl CheckoutOutcome {
    /// Message to show inline, if any
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Blocked(message) => Some(*message),
            Self::Failed(class) => Some(class.message()),
            Self::Redirected(_) => None,
        }
    }
}

/// Check preconditions, create a session for `plan` and redirect to it
pub async fn run_checkout(
    readiness: Readiness,
    initiator: &CheckoutInitiator,
    plan: &PlanPricing,
    navigator: &dyn Navigator,
) -> CheckoutOutcome {
    if let Some(message) = readiness.blocked_message() {
        tracing::debug!(?readiness, "checkout blocked");
        return CheckoutOutcome::Blocked(message);
    }

    let attempt = async {
        let cart = plan.cart()?;
        let session = initiator.initiate(&cart).await?;
        navigator.redirect(&session.url)?;
        Ok::<_, crate::error::GateError>(session)
    };

    match attempt.await {
        Ok(session) => {
            tracing::info!(session_id = %session.id, "redirecting to hosted checkout");
            CheckoutOutcome::Redirected(session)
        }
        Err(e) => {
            tracing::error!(error = %e, "checkout failed");
            CheckoutOutcome::Failed(e.class())
        }
    }
}

/// State behind the upgrade button
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutFlow {
    pending: bool,
    error: ErrorSlot,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    pub const fn error(&self) -> Option<&'static str> {
        self.error.message()
    }

    /// Whether the upgrade button accepts a click. Blocked states stay
    /// clickable so the local explanation can be shown.
    pub fn can_trigger(&self, readiness: Readiness) -> bool {
        !self.pending && readiness != Readiness::CheckingPayments
    }

    pub fn observe_auth(&mut self, authenticated: bool) {
        self.error.observe_auth(authenticated);
    }

    pub fn dismiss_error(&mut self) {
        self.error.clear();
    }

    /// Start an attempt: clears the previous error and marks pending
    pub fn begin(&mut self) {
        self.error.clear();
        self.pending = true;
    }

    /// Record how the attempt ended
    pub fn settle(&mut self, outcome: &CheckoutOutcome) {
        self.pending = false;
        if let Some(message) = outcome.message() {
            self.error.set(message);
        }
    }
}
