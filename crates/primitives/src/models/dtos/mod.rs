pub mod health_dto;
pub mod order_dto;
pub mod reconcile_dto;
pub mod verify_dto;
pub mod webhook_dto;

pub use health_dto::*;
pub use order_dto::*;
pub use reconcile_dto::*;
pub use verify_dto::*;
pub use webhook_dto::*;
