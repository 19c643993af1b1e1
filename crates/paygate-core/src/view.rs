//! View Resolution
//!
//! Decides which top-level screen to show from the current route,
//! authentication state and profile state. Pure and total: it is re-run on
//! every route change and every auth/profile transition.

use serde::{Deserialize, Serialize};

use crate::actor::UserProfile;
use crate::route::{HOME_PATH, Route};

/// Top-level screens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Loading,
    PaymentSuccess,
    PaymentFailure,
    ProfileSetup,
    Main,
}

impl View {
    /// Gateway outcome screens
    pub const fn is_callback(self) -> bool {
        matches!(self, Self::PaymentSuccess | Self::PaymentFailure)
    }

    /// Target of the single action offered on callback screens. Followed with
    /// a full navigation, not in-app routing.
    pub const fn home_action(self) -> Option<&'static str> {
        if self.is_callback() {
            Some(HOME_PATH)
        } else {
            None
        }
    }
}

/// What the identity provider reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Stored credentials are still being restored
    pub initializing: bool,
    pub authenticated: bool,
}

impl AuthState {
    pub const fn initializing() -> Self {
        Self {
            initializing: true,
            authenticated: false,
        }
    }

    pub const fn anonymous() -> Self {
        Self {
            initializing: false,
            authenticated: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            initializing: false,
            authenticated: true,
        }
    }
}

/// Locally known profile value.
///
/// `Unknown` covers "never fetched" and "fetch failed"; only `Missing` means
/// the backend confirmed there is no profile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProfileSlot {
    #[default]
    Unknown,
    Missing,
    Present(UserProfile),
}

impl ProfileSlot {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Present(profile) => Some(profile),
            _ => None,
        }
    }
}

impl From<Option<UserProfile>> for ProfileSlot {
    fn from(profile: Option<UserProfile>) -> Self {
        profile.map_or(Self::Missing, Self::Present)
    }
}

/// Profile fetch status as seen by the resolver
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub loading: bool,
    pub fetched: bool,
    pub value: ProfileSlot,
}

/// Resolve the screen to render. First match wins:
///
/// 1. auth still initializing → `Loading`
/// 2. success callback route → `PaymentSuccess`
/// 3. failure callback route → `PaymentFailure`
/// 4. authenticated, fetch settled, profile confirmed missing → `ProfileSetup`
/// 5. otherwise → `Main`
pub fn resolve(route: &Route, auth: AuthState, profile: &ProfileState) -> View {
    if auth.initializing {
        return View::Loading;
    }

    match route {
        Route::PaymentSuccess => View::PaymentSuccess,
        Route::PaymentFailure => View::PaymentFailure,
        Route::Home | Route::Other(_) => {
            let needs_profile = auth.authenticated
                && !profile.loading
                && profile.fetched
                && profile.value == ProfileSlot::Missing;

            if needs_profile {
                View::ProfileSetup
            } else {
                View::Main
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_auth_states() -> Vec<AuthState> {
        let mut states = Vec::new();
        for initializing in [false, true] {
            for authenticated in [false, true] {
                states.push(AuthState {
                    initializing,
                    authenticated,
                });
            }
        }
        states
    }

    fn all_profile_states() -> Vec<ProfileState> {
        let values = [
            ProfileSlot::Unknown,
            ProfileSlot::Missing,
            ProfileSlot::Present(UserProfile::new("Ada")),
        ];
        let mut states = Vec::new();
        for loading in [false, true] {
            for fetched in [false, true] {
                for value in &values {
                    states.push(ProfileState {
                        loading,
                        fetched,
                        value: value.clone(),
                    });
                }
            }
        }
        states
    }

    fn all_routes() -> Vec<Route> {
        vec![
            Route::Home,
            Route::PaymentSuccess,
            Route::PaymentFailure,
            Route::Other("/unknown".into()),
        ]
    }

    #[test]
    fn test_profile_setup_only_for_confirmed_missing() {
        for route in all_routes() {
            for auth in all_auth_states() {
                for profile in all_profile_states() {
                    let view = resolve(&route, auth, &profile);
                    if view == View::ProfileSetup {
                        assert_eq!(profile.value, ProfileSlot::Missing);
                        assert!(auth.authenticated && !auth.initializing);
                        assert!(profile.fetched && !profile.loading);
                    }
                }
            }
        }
    }

    #[test]
    fn test_callback_routes_ignore_auth_and_profile() {
        for (route, expected) in [
            (Route::PaymentSuccess, View::PaymentSuccess),
            (Route::PaymentFailure, View::PaymentFailure),
        ] {
            for auth in all_auth_states().into_iter().filter(|a| !a.initializing) {
                for profile in all_profile_states() {
                    assert_eq!(resolve(&route, auth, &profile), expected);
                }
            }
        }
    }

    #[test]
    fn test_initializing_always_loading() {
        for route in all_routes() {
            for profile in all_profile_states() {
                assert_eq!(
                    resolve(&route, AuthState::initializing(), &profile),
                    View::Loading
                );
            }
        }
    }

    #[test]
    fn test_missing_profile_for_authenticated_user() {
        let profile = ProfileState {
            loading: false,
            fetched: true,
            value: ProfileSlot::Missing,
        };
        assert_eq!(
            resolve(&Route::Home, AuthState::authenticated(), &profile),
            View::ProfileSetup
        );
        assert_eq!(
            resolve(&Route::Other("/x".into()), AuthState::authenticated(), &profile),
            View::ProfileSetup
        );
        // Anonymous users still get the main screen.
        assert_eq!(
            resolve(&Route::Home, AuthState::anonymous(), &profile),
            View::Main
        );
    }

    #[test]
    fn test_loading_or_errored_profile_shows_main() {
        let loading = ProfileState {
            loading: true,
            fetched: true,
            value: ProfileSlot::Missing,
        };
        let errored = ProfileState {
            loading: false,
            fetched: true,
            value: ProfileSlot::Unknown,
        };
        for profile in [loading, errored, ProfileState::default()] {
            assert_eq!(
                resolve(&Route::Home, AuthState::authenticated(), &profile),
                View::Main
            );
        }
    }

    #[test]
    fn test_home_action() {
        assert_eq!(View::PaymentSuccess.home_action(), Some("/"));
        assert_eq!(View::PaymentFailure.home_action(), Some("/"));
        assert_eq!(View::Main.home_action(), None);
    }
}
