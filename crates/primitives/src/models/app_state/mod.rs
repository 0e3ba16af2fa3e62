pub mod admin_details;
pub mod app_config;
pub mod razorpay_details;

pub use admin_details::*;
pub use app_config::*;
pub use razorpay_details::*;
