//! Shopping Items & Plan Pricing

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

/// ISO-4217 currency code (three ASCII letters, stored upper-case)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(GateError::InvalidItem(format!("bad currency code {code:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "INR" => Some("₹"),
            "USD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a checkout cart, as sent to the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub product_name: String,
    pub product_description: String,

    /// Price in the currency's minor unit
    pub price_in_cents: u64,

    pub currency: CurrencyCode,

    /// Always at least one
    pub quantity: u32,
}

impl ShoppingItem {
    pub fn new(
        product_name: impl Into<String>,
        product_description: impl Into<String>,
        price_in_cents: u64,
        currency: &str,
        quantity: u32,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(GateError::InvalidItem("quantity must be at least 1".into()));
        }

        Ok(Self {
            product_name: product_name.into(),
            product_description: product_description.into(),
            price_in_cents,
            currency: CurrencyCode::parse(currency)?,
            quantity,
        })
    }
}

/// Pricing information for a purchasable plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanPricing {
    pub name: &'static str,
    pub description: &'static str,
    pub cents: u64,
    pub currency: &'static str,
}

/// One-time upgrade to unlimited script generation
pub const PRO_PLAN: PlanPricing = PlanPricing {
    name: "Pro Plan",
    description: "Unlimited YouTube script generation",
    cents: 19_900, // ₹199.00
    currency: "INR",
};

impl PlanPricing {
    /// Fresh single-item cart for one checkout attempt
    pub fn cart(&self) -> Result<Vec<ShoppingItem>> {
        Ok(vec![ShoppingItem::new(
            self.name,
            self.description,
            self.cents,
            self.currency,
            1,
        )?])
    }

    /// Price for display, e.g. `₹199` or `$4.50`
    pub fn display_price(&self) -> String {
        let whole = self.cents / 100;
        let fraction = self.cents % 100;
        let amount = if fraction == 0 {
            whole.to_string()
        } else {
            format!("{whole}.{fraction:02}")
        };

        match CurrencyCode::parse(self.currency) {
            Ok(code) => match code.symbol() {
                Some(symbol) => format!("{symbol}{amount}"),
                None => format!("{code} {amount}"),
            },
            Err(_) => amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_plan_cart() {
        let cart = PRO_PLAN.cart().unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].price_in_cents, 19_900);
        assert_eq!(cart[0].currency.as_str(), "INR");
        assert_eq!(cart[0].quantity, 1);
        assert_eq!(PRO_PLAN.display_price(), "₹199");
    }

    #[test]
    fn test_item_wire_format() {
        let item = ShoppingItem::new("Pro Plan", "Unlimited", 19_900, "inr", 1).unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productName"], "Pro Plan");
        assert_eq!(json["productDescription"], "Unlimited");
        assert_eq!(json["priceInCents"], 19_900);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_item_validation() {
        assert!(matches!(
            ShoppingItem::new("x", "y", 100, "USD", 0),
            Err(GateError::InvalidItem(_))
        ));
        assert!(ShoppingItem::new("x", "y", 100, "US", 1).is_err());
        assert!(ShoppingItem::new("x", "y", 100, "U$D", 1).is_err());
        assert!(ShoppingItem::new("free", "y", 0, "USD", 1).is_ok());
    }

    #[test]
    fn test_display_price_fraction() {
        let pricing = PlanPricing {
            name: "Tip",
            description: "",
            cents: 450,
            currency: "USD",
        };
        assert_eq!(pricing.display_price(), "$4.50");

        let pricing = PlanPricing {
            currency: "CHF",
            ..pricing
        };
        assert_eq!(pricing.display_price(), "CHF 4.50");
    }
}
