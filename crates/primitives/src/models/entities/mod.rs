pub mod addon;
pub mod discount_code;
pub mod enum_types;
pub mod event;
pub mod group_order;
pub mod outbox;
pub mod payment;
pub mod payment_alert;
pub mod registration;
pub mod ticket_type;

pub use addon::*;
pub use discount_code::*;
pub use enum_types::*;
pub use event::*;
pub use group_order::*;
pub use outbox::*;
pub use payment::*;
pub use payment_alert::*;
pub use registration::*;
pub use ticket_type::*;
