pub mod email;
pub mod razorpay;
pub mod whatsapp;

pub use email::EmailClient;
pub use razorpay::{GatewayCredentials, RazorpayClient};
pub use whatsapp::WhatsAppClient;
