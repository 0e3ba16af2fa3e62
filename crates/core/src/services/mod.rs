pub mod confirmation_service;
pub mod inventory_service;
pub mod notification_service;
pub mod order_service;
pub mod reconciliation_service;
pub mod registration_service;

pub use confirmation_service::ConfirmationService;
pub use inventory_service::{InventoryOutcome, InventoryService};
pub use notification_service::NotificationService;
pub use order_service::OrderService;
pub use reconciliation_service::ReconciliationService;
pub use registration_service::RegistrationService;
