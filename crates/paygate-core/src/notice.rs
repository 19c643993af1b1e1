//! User Notices
//!
//! Transient, dismissible messages. Only normalized sentences are stored, so
//! nothing here can leak a raw backend error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GateError;

/// Error tied to a single user action (e.g. the upgrade button)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorSlot {
    message: Option<&'static str>,
    last_auth: Option<bool>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn message(&self) -> Option<&'static str> {
        self.message
    }

    pub fn set(&mut self, message: &'static str) {
        self.message = Some(message);
    }

    /// Store the normalized form of `err`
    pub fn set_error(&mut self, err: &GateError) {
        self.set(err.user_message());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    /// Clear when the authentication flag flips
    pub fn observe_auth(&mut self, authenticated: bool) {
        if self.last_auth.is_some_and(|last| last != authenticated) {
            self.clear();
        }
        self.last_auth = Some(authenticated);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Error,
}

/// A floating notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Queue of visible toasts, oldest first
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    /// How long a toast stays up unless dismissed
    pub const TTL_SECS: i64 = 5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: ToastLevel, message: &'static str) -> Uuid {
        let id = Uuid::new_v4();
        self.items.push(Toast {
            id,
            level,
            message,
            created_at: Utc::now(),
        });
        id
    }

    /// Toast the normalized form of `err`
    pub fn push_error(&mut self, err: &GateError) -> Uuid {
        self.push(ToastLevel::Error, err.user_message())
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|toast| toast.id != id);
        self.items.len() != before
    }

    /// Drop toasts older than [`Self::TTL_SECS`] at `now`
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let ttl = Duration::seconds(Self::TTL_SECS);
        self.items.retain(|toast| now - toast.created_at < ttl);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FailureClass;

    #[test]
    fn test_error_slot_stores_normalized_message() {
        let mut slot = ErrorSlot::new();
        slot.set_error(&GateError::Backend("panicked at src/lib.rs:42".into()));
        assert_eq!(slot.message(), Some(FailureClass::Unclassified.message()));

        slot.clear();
        assert_eq!(slot.message(), None);
    }

    #[test]
    fn test_error_slot_clears_on_auth_flip() {
        let mut slot = ErrorSlot::new();
        slot.observe_auth(false);
        slot.set("Please login to upgrade to Pro.");

        slot.observe_auth(false);
        assert!(slot.message().is_some());

        slot.observe_auth(true);
        assert_eq!(slot.message(), None);
    }

    #[test]
    fn test_toasts_dismiss_and_expire() {
        let mut toasts = Toasts::new();
        let first = toasts.push_error(&GateError::Network("down".into()));
        toasts.push(ToastLevel::Info, "Profile saved.");
        assert_eq!(toasts.items().len(), 2);
        assert_eq!(toasts.items()[0].message, FailureClass::NetworkError.message());

        assert!(toasts.dismiss(first));
        assert!(!toasts.dismiss(first));

        toasts.expire(Utc::now() + Duration::seconds(Toasts::TTL_SECS + 1));
        assert!(toasts.is_empty());
    }
}
