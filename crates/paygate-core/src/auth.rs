//! Authentication
//!
//! Login/logout toggle over an external identity provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::QueryCache;
use crate::error::{GateError, Result};
use crate::view::AuthState;

/// Progress of the identity provider's login flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginStatus {
    #[default]
    Idle,
    LoggingIn,
    LoggedIn,
    LoggedOut,
    LoginError,
}

/// External identity provider
#[async_trait(?Send)]
pub trait IdentityProvider: Send + Sync {
    /// Stored credentials are still being restored
    fn is_initializing(&self) -> bool;

    /// An identity is present
    fn is_authenticated(&self) -> bool;

    fn login_status(&self) -> LoginStatus;

    /// Start an interactive login
    async fn login(&self) -> Result<()>;

    /// Forget the current identity
    async fn clear(&self) -> Result<()>;

    fn auth_state(&self) -> AuthState {
        AuthState {
            initializing: self.is_initializing(),
            authenticated: self.is_authenticated(),
        }
    }
}

/// Header button affordance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthButton {
    pub label: &'static str,
    pub disabled: bool,
}

/// What a toggle did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthChange {
    LoggedIn,
    LoggedOut,
    /// A login was already in progress
    Ignored,
}

/// Login/logout toggle
#[derive(Clone)]
pub struct AuthController {
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<QueryCache>,
}

impl AuthController {
    pub fn new(identity: Arc<dyn IdentityProvider>, cache: Arc<QueryCache>) -> Self {
        Self { identity, cache }
    }

    pub fn state(&self) -> AuthState {
        self.identity.auth_state()
    }

    pub fn button(&self) -> AuthButton {
        let status = self.identity.login_status();
        let label = if status == LoginStatus::LoggingIn {
            "Logging in..."
        } else if self.identity.is_authenticated() {
            "Logout"
        } else {
            "Login"
        };

        AuthButton {
            label,
            disabled: status == LoginStatus::LoggingIn,
        }
    }

    /// Log out if authenticated, otherwise log in.
    ///
    /// Logging out drops every cached query. A login refused because an
    /// identity is already active is cleared and retried once; that case is
    /// never reported as an error.
    pub async fn toggle(&self) -> Result<AuthChange> {
        if self.identity.login_status() == LoginStatus::LoggingIn {
            return Ok(AuthChange::Ignored);
        }

        if self.identity.is_authenticated() {
            self.identity.clear().await?;
            self.cache.clear();
            tracing::info!("logged out");
            return Ok(AuthChange::LoggedOut);
        }

        match self.identity.login().await {
            Ok(()) => Ok(AuthChange::LoggedIn),
            Err(GateError::AlreadyAuthenticated) => {
                tracing::warn!("identity already active; clearing and retrying login");
                self.identity.clear().await?;
                self.identity.login().await?;
                Ok(AuthChange::LoggedIn)
            }
            Err(e) => {
                tracing::error!(error = %e, "login failed");
                Err(e)
            }
        }
    }
}

/// Scripted login failure for [`MemoryIdentity`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginFailure {
    AlreadyAuthenticated,
    Other(String),
}

#[derive(Default)]
struct IdentityState {
    initializing: bool,
    authenticated: bool,
    status: LoginStatus,
    failures: VecDeque<LoginFailure>,
    logins: usize,
    clears: usize,
}

/// In-memory identity provider (for development/testing)
#[derive(Default)]
pub struct MemoryIdentity {
    state: Mutex<IdentityState>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        let identity = Self::new();
        {
            let mut state = identity.lock();
            state.authenticated = true;
            state.status = LoginStatus::LoggedIn;
        }
        identity
    }

    pub fn set_initializing(&self, initializing: bool) {
        self.lock().initializing = initializing;
    }

    pub fn set_status(&self, status: LoginStatus) {
        self.lock().status = status;
    }

    /// Make the next login attempt fail
    pub fn fail_next_login(&self, failure: LoginFailure) {
        self.lock().failures.push_back(failure);
    }

    pub fn login_count(&self) -> usize {
        self.lock().logins
    }

    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for MemoryIdentity {
    fn is_initializing(&self) -> bool {
        self.lock().initializing
    }

    fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    fn login_status(&self) -> LoginStatus {
        self.lock().status
    }

    async fn login(&self) -> Result<()> {
        let mut state = self.lock();
        state.logins += 1;

        match state.failures.pop_front() {
            Some(LoginFailure::AlreadyAuthenticated) => Err(GateError::AlreadyAuthenticated),
            Some(LoginFailure::Other(message)) => {
                state.status = LoginStatus::LoginError;
                Err(GateError::Identity(message))
            }
            None => {
                state.authenticated = true;
                state.status = LoginStatus::LoggedIn;
                Ok(())
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        state.clears += 1;
        state.authenticated = false;
        state.status = LoginStatus::LoggedOut;
        Ok(())
    }
}
