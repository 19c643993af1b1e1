//! Application Shell
//!
//! Ties route, identity, actor and cached remote state together and answers
//! "which screen now?". Front-ends call [`Shell::navigate`] from their
//! navigation-change subscription and [`Shell::sync`] after auth changes.

use std::sync::{Arc, Mutex, PoisonError};

use crate::actor::ActorContext;
use crate::auth::{AuthController, IdentityProvider};
use crate::cache::QueryCache;
use crate::cart::PRO_PLAN;
use crate::checkout::{
    CallbackUrls, CheckoutInitiator, CheckoutOutcome, Navigator, PaymentsStatus, Readiness,
    run_checkout,
};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::profile::ProfileService;
use crate::route::{Navigation, Route};
use crate::view::{self, View};

/// Whole-application state
pub struct Shell {
    config: ClientConfig,
    navigation: Navigation,
    actor: Mutex<ActorContext>,
    auth: AuthController,
    profiles: ProfileService,
    payments: PaymentsStatus,
}

impl Shell {
    /// Start at `initial_path` with no actor attached yet
    pub fn new(
        config: ClientConfig,
        initial_path: &str,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let cache = Arc::new(QueryCache::new());
        Self {
            config,
            navigation: Navigation::new(initial_path),
            actor: Mutex::new(ActorContext::connecting()),
            auth: AuthController::new(identity, cache.clone()),
            profiles: ProfileService::new(cache.clone()),
            payments: PaymentsStatus::new(cache),
        }
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub const fn auth(&self) -> &AuthController {
        &self.auth
    }

    pub const fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub const fn payments(&self) -> &PaymentsStatus {
        &self.payments
    }

    /// Current actor context (cheap clone)
    pub fn actor(&self) -> ActorContext {
        self.actor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap the actor, e.g. once it has been created for a new identity
    pub fn attach_actor(&self, ctx: ActorContext) {
        tracing::debug!(?ctx, "actor context replaced");
        *self.actor.lock().unwrap_or_else(PoisonError::into_inner) = ctx;
    }

    pub fn route(&self) -> Route {
        self.navigation.current()
    }

    /// Record a browser navigation; returns whether the route changed
    pub fn navigate(&self, path: &str) -> bool {
        self.navigation.navigate(path)
    }

    /// Screen for the current state
    pub fn view(&self) -> View {
        let ctx = self.actor();
        view::resolve(&self.route(), self.auth.state(), &self.profiles.state(&ctx))
    }

    /// Refresh whatever remote state is missing or stale. The profile is
    /// only read for an authenticated caller.
    pub async fn sync(&self) -> Result<()> {
        let ctx = self.actor();
        self.payments.refresh(&ctx).await;
        if self.auth.state().authenticated {
            self.profiles.refresh(&ctx).await?;
        }
        Ok(())
    }

    pub fn readiness(&self) -> Readiness {
        Readiness::evaluate(
            self.auth.state().authenticated,
            self.payments.check(&self.actor()),
        )
    }

    pub fn initiator(&self) -> Result<CheckoutInitiator> {
        Ok(CheckoutInitiator::new(
            self.actor(),
            CallbackUrls::from_config(&self.config)?,
        ))
    }

    /// One Pro upgrade attempt against the current state. A blocked
    /// readiness wins over a broken callback configuration.
    pub async fn checkout(&self, navigator: &dyn Navigator) -> CheckoutOutcome {
        let readiness = self.readiness();
        match self.initiator() {
            Ok(initiator) => run_checkout(readiness, &initiator, &PRO_PLAN, navigator).await,
            Err(e) => match readiness.blocked_message() {
                Some(message) => CheckoutOutcome::Blocked(message),
                None => {
                    tracing::error!(error = %e, "cannot build checkout callback urls");
                    CheckoutOutcome::Failed(e.class())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{MemoryActor, UserProfile};
    use crate::auth::MemoryIdentity;
    use crate::checkout::{CheckoutFlow, LOGIN_REQUIRED_MESSAGE, RecordingNavigator};
    use crate::normalize::FailureClass;
    use crate::profile::draft_profile;

    fn shell(path: &str, identity: Arc<MemoryIdentity>, actor: Arc<MemoryActor>) -> Shell {
        let shell = Shell::new(ClientConfig::default(), path, identity);
        shell.attach_actor(ActorContext::ready(actor));
        shell
    }

    #[tokio::test]
    async fn test_profile_setup_then_main() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let actor = Arc::new(MemoryActor::new());
        let shell = shell("/", identity, actor);

        // Fetch not settled yet: no flash of the setup form.
        assert_eq!(shell.view(), View::Main);

        shell.sync().await.unwrap();
        assert_eq!(shell.view(), View::ProfileSetup);

        let ctx = shell.actor();
        let profile = draft_profile(" Ada ").unwrap();
        shell.profiles().save(&ctx, &profile).await.unwrap();
        shell.sync().await.unwrap();

        assert_eq!(shell.view(), View::Main);
        assert_eq!(shell.profiles().current(), Some(UserProfile::new("Ada")));
    }

    #[tokio::test]
    async fn test_callback_route_wins_over_profile_setup() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let shell = shell("/payment-success", identity, Arc::new(MemoryActor::new()));
        shell.sync().await.unwrap();
        assert_eq!(shell.view(), View::PaymentSuccess);

        assert!(shell.navigate("/"));
        assert_eq!(shell.view(), View::ProfileSetup);

        assert!(shell.navigate("/payment-failure"));
        assert_eq!(shell.view(), View::PaymentFailure);
    }

    #[tokio::test]
    async fn test_initializing_identity_shows_loading() {
        let identity = Arc::new(MemoryIdentity::new());
        identity.set_initializing(true);
        let shell = shell("/payment-success", identity.clone(), Arc::new(MemoryActor::new()));
        assert_eq!(shell.view(), View::Loading);

        identity.set_initializing(false);
        assert_eq!(shell.view(), View::PaymentSuccess);
    }

    #[tokio::test]
    async fn test_logout_drops_profile_and_blocks_checkout() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let actor = Arc::new(MemoryActor::new().with_profile(UserProfile::new("Ada")));
        let shell = shell("/", identity, actor.clone());
        shell.sync().await.unwrap();
        assert_eq!(shell.readiness(), Readiness::Ready);

        let mut flow = CheckoutFlow::new();
        flow.observe_auth(true);
        flow.settle(&CheckoutOutcome::Failed(FailureClass::NetworkError));

        shell.auth().toggle().await.unwrap();
        flow.observe_auth(shell.auth().state().authenticated);
        assert_eq!(flow.error(), None);
        assert_eq!(shell.profiles().current(), None);
        assert_eq!(shell.readiness(), Readiness::LoginRequired);

        flow.begin();
        let outcome = shell.checkout(&RecordingNavigator::new()).await;
        flow.settle(&outcome);
        assert_eq!(outcome, CheckoutOutcome::Blocked(LOGIN_REQUIRED_MESSAGE));
        assert_eq!(flow.error(), Some(LOGIN_REQUIRED_MESSAGE));
        assert!(actor.checkout_calls().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_redirects_to_session_url() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let actor = Arc::new(MemoryActor::new().with_profile(UserProfile::new("Ada")));
        let shell = shell("/", identity, actor.clone());
        shell.sync().await.unwrap();

        let navigator = RecordingNavigator::new();
        let mut flow = CheckoutFlow::new();
        flow.begin();
        let outcome = shell.checkout(&navigator).await;
        flow.settle(&outcome);

        assert!(matches!(outcome, CheckoutOutcome::Redirected(_)));
        assert!(!flow.is_pending());
        assert_eq!(flow.error(), None);
        assert_eq!(
            navigator.redirects(),
            vec!["https://checkout.stripe.com/c/pay/cs_test_memory".to_string()]
        );
        let calls = actor.checkout_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].success_url, "http://localhost:3000/payment-success");
        assert_eq!(calls[0].items, PRO_PLAN.cart().unwrap());
    }

    #[tokio::test]
    async fn test_checkout_with_unusable_origin_never_calls_backend() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let actor = Arc::new(MemoryActor::new().with_profile(UserProfile::new("Ada")));
        let config = ClientConfig::default().with_origin("app.example");
        let shell = Shell::new(config, "/", identity);
        shell.attach_actor(ActorContext::ready(actor.clone()));
        shell.sync().await.unwrap();
        assert_eq!(shell.readiness(), Readiness::Ready);

        let navigator = RecordingNavigator::new();
        let outcome = shell.checkout(&navigator).await;
        assert_eq!(outcome, CheckoutOutcome::Failed(FailureClass::Unclassified));
        assert!(actor.checkout_calls().is_empty());
        assert!(navigator.redirects().is_empty());

        shell.auth().toggle().await.unwrap();
        assert_eq!(
            shell.checkout(&navigator).await,
            CheckoutOutcome::Blocked(LOGIN_REQUIRED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_sync_without_actor() {
        let identity = Arc::new(MemoryIdentity::authenticated());
        let shell = Shell::new(ClientConfig::default(), "/", identity);
        shell.sync().await.unwrap();
        assert_eq!(shell.view(), View::Main);
        assert_eq!(shell.readiness(), Readiness::CheckingPayments);
    }
}
