//! # paygate-core
//!
//! Decision logic for a client that gates a paid upgrade behind login, a
//! completed profile and a hosted payment checkout.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                             Shell                             │
//! │  ┌────────────┐  ┌────────────────┐  ┌─────────────────────┐  │
//! │  │ Navigation │  │ AuthController │  │ ProfileService      │  │
//! │  │  (Route)   │  │  (Identity)    │  │ PaymentsStatus      │  │
//! │  └─────┬──────┘  └───────┬────────┘  └──────────┬──────────┘  │
//! │        └─────────────────┼──────────────────────┘             │
//! │                          ▼                                    │
//! │                   view::resolve ──▶ View                      │
//! └───────────────────────────────────────────────────────────────┘
//!
//!   Upgrade ──▶ CheckoutInitiator ──▶ Actor ──▶ CheckoutSession::decode
//!                      │                                │
//!                      └──── failure ──▶ normalize ◀────┘
//! ```
//!
//! The backend ([`Actor`]) and identity provider ([`IdentityProvider`]) are
//! traits; [`MemoryActor`] and [`MemoryIdentity`] stand in for them in tests.

pub mod actor;
pub mod auth;
pub mod cache;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod normalize;
pub mod notice;
pub mod profile;
pub mod route;
pub mod session;
pub mod shell;
pub mod view;

pub use actor::{Actor, ActorContext, MemoryActor, UserProfile};
pub use auth::{AuthController, IdentityProvider, LoginStatus, MemoryIdentity};
pub use cache::{QueryCache, QueryKey};
pub use cart::{PRO_PLAN, PlanPricing, ShoppingItem};
pub use checkout::{
    CheckoutFlow, CheckoutInitiator, CheckoutOutcome, Navigator, PaymentsCheck, Readiness,
    run_checkout,
};
pub use config::ClientConfig;
pub use error::{GateError, Result};
pub use normalize::{FailureClass, normalize};
pub use notice::{ErrorSlot, Toasts};
pub use route::Route;
pub use session::CheckoutSession;
pub use shell::Shell;
pub use view::{AuthState, ProfileSlot, ProfileState, View, resolve};
