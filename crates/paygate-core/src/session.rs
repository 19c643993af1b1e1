//! Checkout Session Decoding
//!
//! The backend returns the gateway's session as a serialized string. Decoding
//! either yields a session with a usable redirect target or fails; a partial
//! or defaulted session is never handed to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GateError, Result};

/// A gateway-issued, single-use redirect target for one payment attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session ID
    pub id: String,

    /// Hosted checkout page to redirect to; never empty
    pub url: String,
}

impl CheckoutSession {
    /// Decode the backend's serialized session payload.
    ///
    /// Fails with [`GateError::Decode`] when `raw` is not well-formed JSON and
    /// with [`GateError::MissingField`] when it is, but carries no usable `url`
    /// (absent, non-string, blank, or the payload is not an object at all).
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;

        let url = value
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
            .ok_or(GateError::MissingField("url"))?;

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Self {
            id: id.to_string(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_session() {
        let session =
            CheckoutSession::decode(r#"{"id":"cs_test_1","url":"https://checkout.stripe.com/c/pay/cs_test_1"}"#)
                .unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_1");
    }

    #[test]
    fn test_missing_url_is_missing_field() {
        let err = CheckoutSession::decode(r#"{"id":"cs_1"}"#).unwrap_err();
        assert!(matches!(err, GateError::MissingField("url")));
    }

    #[test]
    fn test_blank_or_mistyped_url_is_missing_field() {
        for raw in [
            r#"{"id":"cs_1","url":""}"#,
            r#"{"id":"cs_1","url":"   "}"#,
            r#"{"id":"cs_1","url":null}"#,
            r#"{"id":"cs_1","url":7}"#,
            "null",
            "[]",
            r#""https://checkout.stripe.com""#,
        ] {
            let result = CheckoutSession::decode(raw);
            assert!(
                matches!(result, Err(GateError::MissingField("url"))),
                "{raw} -> {result:?}"
            );
        }
    }

    #[test]
    fn test_malformed_payload_is_decode_error() {
        for raw in ["", "not json", r#"{"url": "https://x""#] {
            assert!(matches!(
                CheckoutSession::decode(raw),
                Err(GateError::Decode(_))
            ));
        }
    }

    #[test]
    fn test_missing_id_is_tolerated() {
        let session = CheckoutSession::decode(r#"{"url":"https://pay.example/s"}"#).unwrap();
        assert!(session.id.is_empty());
        assert_eq!(session.url, "https://pay.example/s");
    }
}
