//! Payments
//! Mission: Turn a checkout total into a processor payment intent
//!
//! Amounts travel as integer minor units. Prices arrive as JSON numbers
//! (or numeric strings) and are converted through `Decimal`, never through
//! binary floating point.

pub mod stripe;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

pub use stripe::StripeGateway;

/// Currency every intent is created in.
pub const CURRENCY: &str = "usd";

/// An amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Convert a major-unit price to cents, rounding half away from zero.
    /// Returns `None` for anything that is not a positive, finite amount.
    pub fn from_price(price: &Value) -> Option<Self> {
        let amount = match price {
            Value::Number(n) => parse_decimal(&n.to_string())?,
            Value::String(s) => parse_decimal(s.trim())?,
            _ => return None,
        };

        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;

        (cents > 0).then_some(Cents(cents))
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// What the client needs to confirm a card payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Third-party payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount: Cents, currency: &str) -> Result<PaymentIntent>;
}
