//! Routes & Navigation
//!
//! Browser-native routing: the current route is an explicit value, replaced
//! whenever the browser reports a navigation (e.g. back/forward), and
//! observers are notified through a `watch` channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub const HOME_PATH: &str = "/";

/// Gateway redirect target after a completed payment
pub const SUCCESS_PATH: &str = "/payment-success";

/// Gateway redirect target after a cancelled or failed payment
pub const FAILURE_PATH: &str = "/payment-failure";

/// Known top-level paths; anything else is carried verbatim
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[default]
    Home,
    PaymentSuccess,
    PaymentFailure,
    Other(String),
}

impl Route {
    /// Parse a location path. Query string and fragment are ignored; matching
    /// is otherwise exact.
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        match path {
            "" | HOME_PATH => Self::Home,
            SUCCESS_PATH => Self::PaymentSuccess,
            FAILURE_PATH => Self::PaymentFailure,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Home => HOME_PATH,
            Self::PaymentSuccess => SUCCESS_PATH,
            Self::PaymentFailure => FAILURE_PATH,
            Self::Other(path) => path,
        }
    }

    /// Gateway callback routes
    pub const fn is_callback(&self) -> bool {
        matches!(self, Self::PaymentSuccess | Self::PaymentFailure)
    }
}

/// Current route plus change notifications
#[derive(Debug)]
pub struct Navigation {
    tx: watch::Sender<Route>,
}

impl Navigation {
    pub fn new(initial_path: &str) -> Self {
        let (tx, _rx) = watch::channel(Route::from_path(initial_path));
        Self { tx }
    }

    pub fn current(&self) -> Route {
        self.tx.borrow().clone()
    }

    /// Record a navigation; returns whether the route changed
    pub fn navigate(&self, path: &str) -> bool {
        let next = Route::from_path(path);
        let changed = self.tx.send_if_modified(|route| {
            if *route == next {
                false
            } else {
                *route = next;
                true
            }
        });

        if changed {
            tracing::debug!(path, "route changed");
        }
        changed
    }

    /// Receiver woken on every route change
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parsing() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
        assert_eq!(Route::from_path("/payment-success"), Route::PaymentSuccess);
        assert_eq!(
            Route::from_path("/payment-success?session_id=cs_1"),
            Route::PaymentSuccess
        );
        assert_eq!(Route::from_path("/payment-failure"), Route::PaymentFailure);
        assert_eq!(
            Route::from_path("/payment-success/"),
            Route::Other("/payment-success/".into())
        );
        assert_eq!(Route::from_path("/pricing").path(), "/pricing");
    }

    #[test]
    fn test_callback_routes() {
        assert!(Route::PaymentSuccess.is_callback());
        assert!(Route::PaymentFailure.is_callback());
        assert!(!Route::Home.is_callback());
    }

    #[tokio::test]
    async fn test_navigation_notifies_on_change() {
        let nav = Navigation::new("/");
        let mut rx = nav.subscribe();

        assert!(!nav.navigate("/"));
        assert!(nav.navigate("/payment-failure"));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Route::PaymentFailure);
        assert_eq!(nav.current(), Route::PaymentFailure);
    }
}
