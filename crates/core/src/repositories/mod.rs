pub mod addon_repository;
pub mod alert_repository;
pub mod discount_repository;
pub mod event_repository;
pub mod group_order_repository;
pub mod outbox_repository;
pub mod payment_repository;
pub mod registration_repository;
pub mod ticket_type_repository;

pub use addon_repository::AddonRepository;
pub use alert_repository::AlertRepository;
pub use discount_repository::DiscountRepository;
pub use event_repository::EventRepository;
pub use group_order_repository::GroupOrderRepository;
pub use outbox_repository::OutboxRepository;
pub use payment_repository::PaymentRepository;
pub use registration_repository::RegistrationRepository;
pub use ticket_type_repository::TicketTypeRepository;
