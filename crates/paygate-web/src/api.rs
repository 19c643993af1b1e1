//! API Client
//!
//! HTTP implementations of the backend and identity seams.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use paygate_core::{
    Actor, ClientConfig, GateError, IdentityProvider, LoginStatus, Result, ShoppingItem,
    UserProfile,
};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    items: &'a [ShoppingItem],
    success_url: &'a str,
    cancel_url: &'a str,
}

#[derive(Deserialize)]
struct WhoAmI {
    authenticated: bool,
}

fn transport(e: reqwest::Error) -> GateError {
    GateError::Network(e.to_string())
}

/// Turn a non-success response into an error carrying the backend's text
async fn failure(response: Response) -> GateError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .map_or_else(|_| format!("request failed with status {status}"), |body| body.error);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GateError::Unauthorized(message),
        _ => GateError::Backend(message),
    }
}

async fn success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(failure(response).await)
    }
}

/// Backend actor over the JSON API
pub struct HttpActor {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpActor {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait(?Send)]
impl Actor for HttpActor {
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        let response = self
            .client
            .get(self.config.api_url("/api/profile"))
            .send()
            .await
            .map_err(transport)?;

        success(response)
            .await?
            .json()
            .await
            .map_err(|e| GateError::Backend(format!("invalid JSON in profile: {e}")))
    }

    async fn save_caller_user_profile(&self, profile: &UserProfile) -> Result<()> {
        let response = self
            .client
            .put(self.config.api_url("/api/profile"))
            .json(profile)
            .send()
            .await
            .map_err(transport)?;

        success(response).await.map(|_| ())
    }

    async fn is_stripe_configured(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.config.api_url("/api/payments/configured"))
            .send()
            .await
            .map_err(transport)?;

        success(response)
            .await?
            .json()
            .await
            .map_err(|e| GateError::Backend(format!("invalid JSON in payments status: {e}")))
    }

    async fn create_checkout_session(
        &self,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String> {
        let body = CheckoutRequest {
            items,
            success_url,
            cancel_url,
        };

        let response = self
            .client
            .post(self.config.api_url("/api/checkout"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        success(response).await?.text().await.map_err(transport)
    }
}

struct SessionState {
    initializing: bool,
    authenticated: bool,
}

/// Cookie-session identity behind `/api/auth/*`.
///
/// Login progress is published on a `watch` channel so the UI can show
/// "Logging in..." while the request is in flight.
pub struct HttpIdentity {
    client: reqwest::Client,
    config: ClientConfig,
    state: Mutex<SessionState>,
    status: watch::Sender<LoginStatus>,
}

impl HttpIdentity {
    /// Starts initializing until [`Self::restore`] has run
    pub fn new(config: ClientConfig) -> Self {
        let (status, _rx) = watch::channel(LoginStatus::Idle);
        Self {
            client: reqwest::Client::new(),
            config,
            state: Mutex::new(SessionState {
                initializing: true,
                authenticated: false,
            }),
            status,
        }
    }

    /// Receiver woken on every login status change
    pub fn subscribe(&self) -> watch::Receiver<LoginStatus> {
        self.status.subscribe()
    }

    fn set_status(&self, status: LoginStatus) {
        self.status.send_replace(status);
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick up a session that survived a page load
    pub async fn restore(&self) {
        let authenticated = match self.whoami().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                tracing::warn!(error = %e, "could not restore session");
                false
            }
        };

        {
            let mut state = self.lock();
            state.initializing = false;
            state.authenticated = authenticated;
        }
        if authenticated {
            self.set_status(LoginStatus::LoggedIn);
        }
    }

    async fn whoami(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.config.api_url("/api/auth/whoami"))
            .send()
            .await
            .map_err(transport)?;

        let who: WhoAmI = success(response)
            .await?
            .json()
            .await
            .map_err(|e| GateError::Identity(e.to_string()))?;
        Ok(who.authenticated)
    }

    async fn post(&self, path: &str) -> Result<Response> {
        self.client
            .post(self.config.api_url(path))
            .send()
            .await
            .map_err(transport)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for HttpIdentity {
    fn is_initializing(&self) -> bool {
        self.lock().initializing
    }

    fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    fn login_status(&self) -> LoginStatus {
        *self.status.borrow()
    }

    async fn login(&self) -> Result<()> {
        self.set_status(LoginStatus::LoggingIn);

        let result = match self.post("/api/auth/login").await {
            Ok(response) if response.status() == StatusCode::CONFLICT => {
                Err(GateError::AlreadyAuthenticated)
            }
            Ok(response) => success(response).await.map(|_| ()),
            Err(e) => Err(e),
        };

        let status = match &result {
            Ok(()) => {
                self.lock().authenticated = true;
                LoginStatus::LoggedIn
            }
            Err(GateError::AlreadyAuthenticated) => LoginStatus::Idle,
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                LoginStatus::LoginError
            }
        };
        self.set_status(status);
        result
    }

    async fn clear(&self) -> Result<()> {
        let response = self.post("/api/auth/logout").await?;
        success(response).await?;

        self.lock().authenticated = false;
        self.set_status(LoginStatus::LoggedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_status_is_broadcast() {
        let identity = HttpIdentity::new(ClientConfig::default());
        let mut statuses = identity.subscribe();
        assert!(identity.is_initializing());
        assert_eq!(identity.login_status(), LoginStatus::Idle);
        assert!(!statuses.has_changed().unwrap());

        identity.set_status(LoginStatus::LoggingIn);
        assert!(statuses.has_changed().unwrap());
        assert_eq!(*statuses.borrow_and_update(), LoginStatus::LoggingIn);
        assert_eq!(identity.login_status(), LoginStatus::LoggingIn);
    }
}
