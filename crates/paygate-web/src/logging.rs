//! Browser Logging
//!
//! Sends `tracing` events to the developer console.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_web::MakeWebConsoleWriter;

const DEFAULT_FILTER: &str = "info";

/// Directives baked in with `PAYGATE_LOG` at build time, else [`DEFAULT_FILTER`]
fn directives() -> &'static str {
    option_env!("PAYGATE_LOG").unwrap_or(DEFAULT_FILTER)
}

/// Install the console subscriber. Call once, before mounting.
pub fn init() {
    // No clock in the browser sandbox; the console stamps entries itself.
    let console = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    tracing_subscriber::registry()
        .with(EnvFilter::new(directives()))
        .with(console)
        .init();
}
