//! Backend Actor
//!
//! The remote endpoint exposing profile and checkout operations. Services
//! receive it through an explicit [`ActorContext`] instead of ambient global
//! state, so every piece of the pipeline can be exercised against
//! [`MemoryActor`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cart::ShoppingItem;
use crate::error::{GateError, Result};

/// Profile owned by the backend for the calling principal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Backend surface consumed by the client.
///
/// Futures are not required to be `Send`: the client runs on a single
/// cooperative thread and browser transports are `!Send`.
#[async_trait(?Send)]
pub trait Actor: Send + Sync {
    /// Profile of the caller, `None` if not yet created
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>>;

    /// Create or replace the caller's profile
    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Whether the payment gateway has been configured on the backend
    async fn is_stripe_configured(&self) -> Result<bool>;

    /// Create a gateway checkout session, returned serialized
    async fn create_checkout_session(
        &self,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String>;
}

/// Current actor handle, passed explicitly to the services that need it
#[derive(Clone, Default)]
pub struct ActorContext {
    actor: Option<Arc<dyn Actor>>,
    fetching: bool,
}

impl ActorContext {
    /// Context with a usable actor
    pub fn ready(actor: Arc<dyn Actor>) -> Self {
        Self {
            actor: Some(actor),
            fetching: false,
        }
    }

    /// Actor is still being created (e.g. identity just changed)
    pub fn connecting() -> Self {
        Self {
            actor: None,
            fetching: true,
        }
    }

    /// No actor and none on the way
    pub fn detached() -> Self {
        Self::default()
    }

    pub const fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Actor present and not being replaced
    pub const fn is_ready(&self) -> bool {
        self.actor.is_some() && !self.fetching
    }

    /// Borrow the actor or fail with [`GateError::ActorUnavailable`]
    pub fn actor(&self) -> Result<&Arc<dyn Actor>> {
        self.actor.as_ref().ok_or(GateError::ActorUnavailable)
    }
}

impl fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("attached", &self.actor.is_some())
            .field("fetching", &self.fetching)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A recorded `create_checkout_session` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutCall {
    pub items: Vec<ShoppingItem>,
    pub success_url: String,
    pub cancel_url: String,
}

/// In-memory actor (for development/testing)
pub struct MemoryActor {
    profile: Mutex<Option<UserProfile>>,
    profile_error: Mutex<Option<String>>,
    stripe: Mutex<std::result::Result<bool, String>>,
    checkout: Mutex<std::result::Result<String, String>>,
    checkout_calls: Mutex<Vec<CheckoutCall>>,
    profile_reads: AtomicUsize,
}

impl Default for MemoryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryActor {
    /// No profile, payments configured, checkout returns a valid session
    pub fn new() -> Self {
        Self {
            profile: Mutex::new(None),
            profile_error: Mutex::new(None),
            stripe: Mutex::new(Ok(true)),
            checkout: Mutex::new(Ok(
                r#"{"id":"cs_test_memory","url":"https://checkout.stripe.com/c/pay/cs_test_memory"}"#
                    .into(),
            )),
            checkout_calls: Mutex::new(Vec::new()),
            profile_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        *lock(&self.profile) = Some(profile);
        self
    }

    /// Profile reads and writes fail with `message`
    pub fn with_profile_error(self, message: impl Into<String>) -> Self {
        *lock(&self.profile_error) = Some(message.into());
        self
    }

    pub fn with_stripe_configured(self, configured: bool) -> Self {
        *lock(&self.stripe) = Ok(configured);
        self
    }

    /// The configuration check itself fails with `message`
    pub fn with_stripe_error(self, message: impl Into<String>) -> Self {
        *lock(&self.stripe) = Err(message.into());
        self
    }

    /// Serialized payload returned by `create_checkout_session`
    pub fn with_checkout_payload(self, payload: impl Into<String>) -> Self {
        *lock(&self.checkout) = Ok(payload.into());
        self
    }

    /// `create_checkout_session` fails with `message`
    pub fn with_checkout_error(self, message: impl Into<String>) -> Self {
        *lock(&self.checkout) = Err(message.into());
        self
    }

    /// Checkout requests received so far
    pub fn checkout_calls(&self) -> Vec<CheckoutCall> {
        lock(&self.checkout_calls).clone()
    }

    /// Number of profile reads served
    pub fn profile_reads(&self) -> usize {
        self.profile_reads.load(Ordering::SeqCst)
    }

    fn profile_failure(&self) -> Result<()> {
        match lock(&self.profile_error).as_ref() {
            Some(message) => Err(GateError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl Actor for MemoryActor {
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        self.profile_reads.fetch_add(1, Ordering::SeqCst);
        self.profile_failure()?;
        Ok(lock(&self.profile).clone())
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.profile_failure()?;
        *lock(&self.profile) = Some(profile.clone());
        Ok(())
    }

    async fn is_stripe_configured(&self) -> Result<bool> {
        lock(&self.stripe).clone().map_err(GateError::Backend)
    }

    async fn create_checkout_session(
        &self,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String> {
        lock(&self.checkout_calls).push(CheckoutCall {
            items: items.to_vec(),
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
        });
        lock(&self.checkout).clone().map_err(GateError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_actor_profile_roundtrip() {
        let actor = MemoryActor::new();
        assert_eq!(actor.get_caller_user_profile().await.unwrap(), None);

        actor
            .save_caller_user_profile(&UserProfile::new("Ada"))
            .await
            .unwrap();
        assert_eq!(
            actor.get_caller_user_profile().await.unwrap(),
            Some(UserProfile::new("Ada"))
        );
        assert_eq!(actor.profile_reads(), 2);
    }

    #[tokio::test]
    async fn test_memory_actor_failures() {
        let actor = MemoryActor::new()
            .with_profile_error("Unauthorized: anonymous caller")
            .with_stripe_error("canister stopped");

        assert!(matches!(
            actor.get_caller_user_profile().await,
            Err(GateError::Backend(_))
        ));
        assert!(actor.is_stripe_configured().await.is_err());
    }

    #[test]
    fn test_context_states() {
        let detached = ActorContext::detached();
        assert!(!detached.is_ready());
        assert!(matches!(detached.actor(), Err(GateError::ActorUnavailable)));

        let connecting = ActorContext::connecting();
        assert!(connecting.is_fetching());
        assert!(!connecting.is_ready());

        let ready = ActorContext::ready(Arc::new(MemoryActor::new()));
        assert!(ready.is_ready());
        assert!(ready.actor().is_ok());
    }
}
