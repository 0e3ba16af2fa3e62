use eyre::Report;
use secrecy::SecretString;
use std::env;

/// Platform-default gateway credentials. Events may carry their own
/// sub-account credentials which take precedence at resolution time.
#[derive(Debug, Clone)]
pub struct RazorpayInfo {
    pub key_id: String,
    pub key_secret: SecretString,
    pub webhook_secret: SecretString,
    pub api_url: String,
}

impl RazorpayInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            key_id: env::var("RAZORPAY_KEY_ID")
                .map_err(|_| eyre::eyre!("RAZORPAY_KEY_ID must be set"))?,
            key_secret: SecretString::from(
                env::var("RAZORPAY_KEY_SECRET")
                    .map_err(|_| eyre::eyre!("RAZORPAY_KEY_SECRET must be set"))?,
            ),
            webhook_secret: SecretString::from(
                env::var("RAZORPAY_WEBHOOK_SECRET")
                    .map_err(|_| eyre::eyre!("RAZORPAY_WEBHOOK_SECRET must be set"))?,
            ),
            api_url: env::var("RAZORPAY_API_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com".into()),
        })
    }
}
