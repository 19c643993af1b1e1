//! Error Types

use thiserror::Error;

use crate::normalize::{self, FailureClass};

/// Result type alias for paygate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Everything that can go wrong between a user action and the backend.
///
/// The `Display` text is what the normalizer classifies, so variants carry the
/// wording the backend and transport produce rather than user-facing copy.
#[derive(Error, Debug)]
pub enum GateError {
    /// No backend actor has been attached yet
    #[error("Actor not available")]
    ActorUnavailable,

    /// Domain error raised by the backend actor, verbatim
    #[error("{0}")]
    Backend(String),

    /// Caller lacks the rights for the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Transport failure reaching the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Checkout payload was not well-formed JSON
    #[error("failed to parse checkout payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Checkout payload decoded but a required field was absent or empty
    #[error("Stripe session missing {0}")]
    MissingField(&'static str),

    /// Identity provider refused a login because one is already active
    #[error("User is already authenticated")]
    AlreadyAuthenticated,

    /// Identity provider failure
    #[error("Identity error: {0}")]
    Identity(String),

    /// Redirect to the payment gateway could not be started
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Shopping item rejected before reaching the backend
    #[error("Invalid shopping item: {0}")]
    InvalidItem(String),

    /// A newer fetch, invalidation or logout overtook this read; its result
    /// was dropped
    #[error("Result dropped: a newer request replaced it")]
    Superseded,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GateError {
    /// Classification of this error for display purposes
    pub fn class(&self) -> FailureClass {
        normalize::classify(Some(self))
    }

    /// Convert to the fixed user-facing sentence
    pub fn user_message(&self) -> &'static str {
        self.class().message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_feeds_classification() {
        assert_eq!(GateError::ActorUnavailable.class(), FailureClass::AppStillLoading);
        assert_eq!(
            GateError::MissingField("url").class(),
            FailureClass::SessionCreationFailed
        );
        assert_eq!(
            GateError::Network("timed out".into()).class(),
            FailureClass::NetworkError
        );
        assert_eq!(
            GateError::AlreadyAuthenticated.class(),
            FailureClass::ReauthenticationRequired
        );
    }

    #[test]
    fn test_decode_error_is_payment_data_failure() {
        let err: GateError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.class(), FailureClass::PaymentDataFailed);
    }

    #[test]
    fn test_backend_text_is_not_leaked() {
        let err = GateError::Backend("trap: canister 7x1 rejected with code 5".into());
        assert_eq!(err.user_message(), FailureClass::Unclassified.message());
        assert!(!err.user_message().contains("7x1"));
    }

    #[test]
    fn test_config_error_is_unclassified() {
        let err = GateError::Config("origin \"app.example\" has no http(s) scheme".into());
        assert_eq!(err.class(), FailureClass::Unclassified);
    }
}
