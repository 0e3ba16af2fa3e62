use attendly_primitives::error::ApiError;

#[derive(Clone)]
pub struct WhatsAppClient {}

impl Default for WhatsAppClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatsAppClient {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn send_message(&self, to: &str, _template_vars: &serde_json::Value) -> Result<(), ApiError> {
        // Placeholder for real WhatsApp template sending logic
        tracing::info!("Sending WhatsApp message to: {}", to);
        Ok(())
    }
}
