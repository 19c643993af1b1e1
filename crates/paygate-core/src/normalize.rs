//! Error Normalization
//!
//! Maps any failure into one of eight fixed, reviewed sentences so raw
//! backend faults, stack traces and identifiers never reach the user.
//!
//! Classification is a case-insensitive substring match over the failure's
//! display text. Rules are evaluated in priority order and the first match
//! wins:
//!
//! ```text
//! 1  "actor not available" | "actor is not initialized"       -> AppStillLoading
//! 2  "unauthorized" | "permission"                             -> PermissionDenied
//! 3  "stripe" & ("configure" | "configuration" | "api key")    -> PaymentNotConfigured
//! 4  "stripe session missing url" | ("session" & "url")        -> SessionCreationFailed
//! 5  "json" | "parse"                                          -> PaymentDataFailed
//! 6  "network" | "fetch" | "connection"                        -> NetworkError
//! 7  "authenticated" | "identity"                              -> ReauthenticationRequired
//! *                                                            -> Unclassified
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of user-facing failure categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    AppStillLoading,
    PermissionDenied,
    PaymentNotConfigured,
    SessionCreationFailed,
    PaymentDataFailed,
    NetworkError,
    ReauthenticationRequired,
    Unclassified,
}

impl FailureClass {
    /// Every class, in classification priority order
    pub const ALL: [Self; 8] = [
        Self::AppStillLoading,
        Self::PermissionDenied,
        Self::PaymentNotConfigured,
        Self::SessionCreationFailed,
        Self::PaymentDataFailed,
        Self::NetworkError,
        Self::ReauthenticationRequired,
        Self::Unclassified,
    ];

    /// The sentence shown to the user.
    ///
    /// None of these contain a classification trigger, so normalizing a
    /// normalized message always lands on `Unclassified`.
    pub const fn message(self) -> &'static str {
        match self {
            Self::AppStillLoading => {
                "The application is still loading. Please wait a moment and try again."
            }
            Self::PermissionDenied => {
                "You are not allowed to perform this action. Please log in or contact support."
            }
            Self::PaymentNotConfigured => {
                "Payments are not set up yet. Please contact the administrator to enable card payments."
            }
            Self::SessionCreationFailed => {
                "Failed to create payment session. Please try again or contact support."
            }
            Self::PaymentDataFailed => "Failed to process payment information. Please try again.",
            Self::NetworkError => {
                "Could not reach the server. Please check your internet access and try again."
            }
            Self::ReauthenticationRequired => "Authentication error. Please log in again.",
            Self::Unclassified => {
                "Something went wrong. Please try again or contact support if the problem persists."
            }
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classify a raw failure message
pub fn classify_message(message: &str) -> FailureClass {
    let lower = message.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("actor not available") || has("actor is not initialized") {
        FailureClass::AppStillLoading
    } else if has("unauthorized") || has("permission") {
        FailureClass::PermissionDenied
    } else if has("stripe") && (has("configure") || has("configuration") || has("api key")) {
        FailureClass::PaymentNotConfigured
    } else if has("stripe session missing url") || (has("session") && has("url")) {
        FailureClass::SessionCreationFailed
    } else if has("json") || has("parse") {
        FailureClass::PaymentDataFailed
    } else if has("network") || has("fetch") || has("connection") {
        FailureClass::NetworkError
    } else if has("authenticated") || has("identity") {
        FailureClass::ReauthenticationRequired
    } else {
        FailureClass::Unclassified
    }
}

/// Classify any displayable failure; `None` is unclassified
pub fn classify<E>(error: Option<&E>) -> FailureClass
where
    E: fmt::Display + ?Sized,
{
    error.map_or(FailureClass::Unclassified, |e| classify_message(&e.to_string()))
}

/// Normalize any displayable failure into a user-safe sentence.
///
/// Total: never panics and never returns an empty string.
pub fn normalize<E>(error: Option<&E>) -> &'static str
where
    E: fmt::Display + ?Sized,
{
    classify(error).message()
}

/// Normalize a raw message string
pub fn normalize_message(message: &str) -> &'static str {
    classify_message(message).message()
}
