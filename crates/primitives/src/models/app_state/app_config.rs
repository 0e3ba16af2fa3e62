use crate::models::app_state::admin_details::AdminInfo;
use crate::models::app_state::razorpay_details::RazorpayInfo;
use eyre::Report;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_url: String,

    pub razorpay_details: RazorpayInfo,

    pub admin_details: AdminInfo,

    /// Minutes inside which a second checkout for the same (email, amount)
    /// reuses the existing pending order.
    pub duplicate_order_window_mins: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report> {
        Ok(Self {
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".into()),

            razorpay_details: RazorpayInfo::new()?,

            admin_details: AdminInfo::new()?,

            duplicate_order_window_mins: env::var("DUPLICATE_ORDER_WINDOW_MINS")
                .unwrap_or_else(|_| "5".into())
                .parse()?,
        })
    }
}
