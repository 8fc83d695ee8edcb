//! # Stripe REST Client
//!
//! Stripe integration via REST API (no SDK dependency): form-encoded posts
//! with basic auth on the secret key. The connected topology (Direct
//! Charges) is selected per call through the `Stripe-Account` header.
//!
//! Error bodies are decoded and mapped onto [`ProviderError`] by Stripe's
//! error code, so the reconciler can tell "wrong account scope" apart from
//! a genuine failure.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::provider::{AccountContext, ChargeProvider, ChargeState, ProviderError, Refund};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe charge provider.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeClient {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL (stripe-mock, local test servers).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn scoped(&self, req: reqwest::RequestBuilder, ctx: &AccountContext) -> reqwest::RequestBuilder {
        let req = req.basic_auth(&self.secret_key, None::<&str>);
        match ctx.connected_account() {
            Some(account) => req.header("Stripe-Account", account),
            None => req,
        }
    }

    /// Maps a Stripe error body onto the provider error taxonomy.
    fn map_error(body: &serde_json::Value) -> ProviderError {
        let code = body["error"]["code"].as_str().unwrap_or("");
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("unrecognized provider error")
            .to_string();

        match code {
            "resource_missing" => ProviderError::NotFound(message),
            "charge_already_refunded" => ProviderError::AlreadyRefunded(message),
            _ => ProviderError::Declined(message),
        }
    }

    async fn decode(response: reqwest::Response) -> Result<serde_json::Value, ProviderError> {
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            let err = Self::map_error(&body);
            warn!(status = status.as_u16(), %err, "stripe call failed");
            Err(err)
        }
    }
}

#[async_trait]
impl ChargeProvider for StripeClient {
    async fn retrieve_charge(
        &self,
        charge_ref: &str,
        ctx: &AccountContext,
    ) -> Result<ChargeState, ProviderError> {
        debug!(charge_ref, context = %ctx, "retrieving charge");

        let url = format!("{}/charges/{charge_ref}", self.api_base);
        let response = self
            .scoped(self.http.get(&url), ctx)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body = Self::decode(response).await?;

        Ok(ChargeState {
            charge_ref: body["id"].as_str().unwrap_or(charge_ref).to_string(),
            amount_cents: body["amount"].as_i64().unwrap_or(0),
            currency: body["currency"].as_str().unwrap_or("").to_uppercase(),
            refunded: body["refunded"].as_bool().unwrap_or(false),
        })
    }

    async fn create_refund(
        &self,
        charge_ref: &str,
        amount_cents: Option<i64>,
        reason: Option<&str>,
        ctx: &AccountContext,
    ) -> Result<Refund, ProviderError> {
        debug!(charge_ref, context = %ctx, ?amount_cents, "creating refund");

        let mut form: Vec<(String, String)> = vec![("charge".to_string(), charge_ref.to_string())];
        if let Some(amount) = amount_cents {
            form.push(("amount".to_string(), amount.to_string()));
        }
        if let Some(reason) = reason {
            form.push(("metadata[reason]".to_string(), reason.to_string()));
        }

        let url = format!("{}/refunds", self.api_base);
        let response = self
            .scoped(self.http.post(&url), ctx)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body = Self::decode(response).await?;

        let id = body["id"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::Transport(format!("refund response without id: {body}"))
            })?
            .to_string();

        Ok(Refund {
            id,
            charge_ref: charge_ref.to_string(),
            amount_cents: body["amount"].as_i64().unwrap_or(0),
        })
    }
}
