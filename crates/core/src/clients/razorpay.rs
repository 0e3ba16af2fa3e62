use attendly_primitives::error::ApiError;
use attendly_primitives::models::app_state::RazorpayInfo;
use attendly_primitives::models::dtos::webhook_dto::{GatewayOrder, GatewayPayment};
use attendly_primitives::models::entities::enum_types::CurrencyCode;
use attendly_primitives::models::entities::event::Event;
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Resolved gateway credentials for one call. Events may run their own
/// gateway sub-account; everything else uses the platform keys.
#[derive(Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: SecretString,
}

#[derive(Clone)]
pub struct RazorpayClient {
    http: Client,
    api_url: String,
    key_id: String,
    key_secret: SecretString,
    webhook_secret: SecretString,
}

impl RazorpayClient {
    pub fn new(http: Client, config: &RazorpayInfo) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    /// Per-event sub-account credentials, falling back to the platform pair.
    pub fn credentials_for(&self, event: Option<&Event>) -> GatewayCredentials {
        if let Some(event) = event {
            if let (Some(key_id), Some(key_secret)) =
                (event.razorpay_key_id.as_ref(), event.razorpay_key_secret.as_ref())
            {
                return GatewayCredentials {
                    key_id: key_id.clone(),
                    key_secret: SecretString::from(key_secret.clone()),
                };
            }
        }

        GatewayCredentials {
            key_id: self.key_id.clone(),
            key_secret: self.key_secret.clone(),
        }
    }

    /// Webhook secrets to try, most specific first. A per-event secret that
    /// fails verification falls through to the platform default so that a
    /// misconfigured sub-account does not drop deliveries.
    pub fn webhook_secrets_for(&self, event: Option<&Event>) -> Vec<SecretString> {
        let mut secrets = Vec::with_capacity(2);
        if let Some(secret) = event.and_then(|e| e.razorpay_webhook_secret.as_ref()) {
            secrets.push(SecretString::from(secret.clone()));
        }
        secrets.push(self.webhook_secret.clone());
        secrets
    }

    pub async fn create_order(
        &self,
        creds: &GatewayCredentials,
        amount: i64,
        currency: CurrencyCode,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder, ApiError> {
        let resp = self
            .http
            .post(format!("{}/v1/orders", self.api_url))
            .basic_auth(&creds.key_id, Some(creds.key_secret.expose_secret()))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": currency.to_string(),
                "receipt": receipt,
                "notes": notes,
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ApiError::Gateway(format!("Order creation request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(ApiError::Gateway(format!(
                "Order creation rejected: {}",
                resp.status()
            )));
        }

        resp.json::<GatewayOrder>()
            .await
            .map_err(|_| ApiError::Gateway("Invalid order response".into()))
    }

    pub async fn fetch_payment(
        &self,
        creds: &GatewayCredentials,
        payment_id: &str,
    ) -> Result<GatewayPayment, ApiError> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.api_url, payment_id))
            .basic_auth(&creds.key_id, Some(creds.key_secret.expose_secret()))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ApiError::Gateway(format!("Payment fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|e| ApiError::Gateway(format!("Payment fetch rejected: {}", e)))?;

        resp.json::<GatewayPayment>()
            .await
            .map_err(|_| ApiError::Gateway("Invalid payment response".into()))
    }

    /// Checkout signature: HMAC-SHA256 over `"{order_id}|{payment_id}"`.
    pub fn verify_payment_signature(
        order_id: &str,
        payment_id: &str,
        signature: &str,
        secret: &str,
    ) -> Result<(), ApiError> {
        let message = format!("{}|{}", order_id, payment_id);
        let expected = Self::hmac_hex(secret, message.as_bytes())?;

        if expected
            .as_bytes()
            .ct_eq(signature.as_bytes())
            .unwrap_u8()
            != 1
        {
            return Err(ApiError::Signature("Invalid payment signature".into()));
        }

        Ok(())
    }

    /// Webhook signature: HMAC-SHA256 over the raw request body. The body
    /// must be the exact bytes received, not a re-serialized parse.
    pub fn verify_webhook_signature(
        raw_body: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<(), ApiError> {
        let expected = Self::hmac_hex(secret, raw_body)?;

        if expected
            .as_bytes()
            .ct_eq(signature.as_bytes())
            .unwrap_u8()
            != 1
        {
            return Err(ApiError::Signature("Invalid webhook signature".into()));
        }

        Ok(())
    }

    fn hmac_hex(secret: &str, payload: &[u8]) -> Result<String, ApiError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ApiError::Internal("Invalid signing secret".into()))?;

        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Test/fixture helper: produce the signature the gateway would send.
    pub fn sign_payment(order_id: &str, payment_id: &str, secret: &str) -> String {
        let message = format!("{}|{}", order_id, payment_id);
        Self::hmac_hex(secret, message.as_bytes()).unwrap_or_default()
    }

    /// Test/fixture helper: sign a raw webhook body.
    pub fn sign_webhook(raw_body: &[u8], secret: &str) -> String {
        Self::hmac_hex(secret, raw_body).unwrap_or_default()
    }
}
