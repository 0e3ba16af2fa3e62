use eyre::Report;
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct AdminInfo {
    pub admin_api_key: SecretString,
}

impl AdminInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            admin_api_key: SecretString::from(
                env::var("ADMIN_API_KEY").map_err(|_| eyre::eyre!("ADMIN_API_KEY must be set"))?,
            ),
        })
    }
}
