//! Browser Glue

use paygate_core::{ClientConfig, GateError, Navigator, Result};

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| GateError::Navigation("no window".into()))
}

/// Values baked in when the bundle was built
fn build_var(key: &str) -> Option<String> {
    match key {
        "PAYGATE_ORIGIN" => option_env!("PAYGATE_ORIGIN"),
        "PAYGATE_API_BASE" => option_env!("PAYGATE_API_BASE"),
        _ => None,
    }
    .map(str::to_string)
}

/// Config for the page we were loaded from. API requests go to the same
/// origin unless a base was baked in at build time.
pub fn client_config() -> ClientConfig {
    let config = ClientConfig::from_vars(build_var);

    let origin = window().ok().and_then(|w| w.location().origin().ok());
    let mut config = match origin {
        Some(origin) => config.with_origin(origin),
        None => config,
    };

    if config.api_base.is_empty() {
        config.api_base.clone_from(&config.origin);
    }
    config
}

/// Path component of the current location
pub fn current_path() -> String {
    window()
        .ok()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".into())
}

/// Full-page navigation
pub fn go_to(url: &str) -> Result<()> {
    window()?
        .location()
        .set_href(url)
        .map_err(|e| GateError::Navigation(format!("{e:?}")))
}

/// Sends the browser to the hosted checkout page
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &str) -> Result<()> {
        go_to(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_known_build_vars_are_read() {
        assert_eq!(build_var("HOME"), None);
        assert_eq!(build_var("PAYGATE_ORIGIN"), option_env!("PAYGATE_ORIGIN").map(str::to_string));
    }
}
