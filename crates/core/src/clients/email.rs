use attendly_primitives::error::ApiError;

#[derive(Clone)]
pub struct EmailClient {}

impl Default for EmailClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailClient {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), ApiError> {
        // Placeholder for real email sending logic
        tracing::info!("Sending email to: {}, subject: {}", to, subject);
        Ok(())
    }
}
