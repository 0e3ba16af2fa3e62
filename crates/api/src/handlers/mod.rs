pub mod create_order;
pub mod health;
pub mod razorpay_webhook;
pub mod reconcile;
pub mod verify_payment;
