//! Page Components

mod callback;
mod loading;
mod profile;
mod upgrade;

pub use callback::{PaymentFailurePage, PaymentSuccessPage};
pub use loading::LoadingPage;
pub use profile::ProfileSetupPage;
pub use upgrade::UpgradePage;
