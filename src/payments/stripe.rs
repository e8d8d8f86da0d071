//! Stripe Payment Intents client
//! Mission: Create card payment intents over the processor's REST API

use super::{Cents, PaymentGateway, PaymentIntent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

pub struct StripeGateway {
    http_client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
}

impl StripeGateway {
    /// A gateway without a secret key still builds; every call then fails.
    pub fn new(http_client: reqwest::Client, api_base: String, secret_key: Option<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount: Cents, currency: &str) -> Result<PaymentIntent> {
        let secret_key = self
            .secret_key
            .as_deref()
            .context("payment processor not configured (PAYMENT_SECRET_KEY)")?;

        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        debug!("Creating payment intent for {} {}", amount, currency);

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(secret_key)
            .form(&form)
            .send()
            .await
            .context("payment processor unreachable")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("payment processor returned {}: {}", status, body);
        }

        let intent = resp
            .json::<IntentResponse>()
            .await
            .context("unexpected payment intent response")?;
        let client_secret = intent
            .client_secret
            .context("payment intent without client_secret")?;

        info!("💳 Payment intent {} created", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}
