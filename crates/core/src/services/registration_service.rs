use crate::repositories::{EventRepository, RegistrationRepository};
use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::enum_types::RegistrationStatus;
use attendly_primitives::models::entities::event::Event;
use attendly_primitives::models::entities::payment::Payment;
use attendly_primitives::models::entities::registration::{NewRegistration, Registration};
use chrono::Utc;
use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

pub struct RegistrationService;

impl RegistrationService {
    /// Next registration number for the event. Custom numbering draws from
    /// the event's atomic counter; otherwise a date-stamped random number
    /// that needs no shared state.
    pub fn next_registration_number(
        conn: &mut PgConnection,
        event: &Event,
    ) -> Result<String, ApiError> {
        if event.custom_numbering {
            let n = EventRepository::allocate_registration_number(conn, event.id)?;
            Ok(Self::format_number(&event.reg_prefix, n, &event.reg_suffix))
        } else {
            Ok(Self::default_number())
        }
    }

    pub fn format_number(prefix: &str, n: i64, suffix: &str) -> String {
        format!("{}{}{}", prefix, n, suffix)
    }

    pub fn default_number() -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect();

        format!("REG-{}-{}", Utc::now().format("%Y%m%d"), token)
    }

    /// Build a registration from nothing but the payment row. Used when the
    /// purchase intent is missing or unusable: the attendee gets a record,
    /// an admin gets a review flag.
    pub fn synthesize_from_payment(
        conn: &mut PgConnection,
        payment: &Payment,
        event: Option<&Event>,
    ) -> Result<Registration, ApiError> {
        let event_id = payment
            .event_id
            .ok_or_else(|| ApiError::Payment("Cannot materialize a payment with no event".into()))?;

        let number = match event {
            Some(event) => Self::next_registration_number(conn, event)?,
            None => Self::default_number(),
        };

        RegistrationRepository::create(
            conn,
            NewRegistration {
                registration_number: &number,
                event_id,
                ticket_type_id: None,
                payment_id: Some(payment.id),
                group_order_id: None,
                attendee_name: &payment.payer_name,
                attendee_email: &payment.payer_email,
                attendee_phone: payment.payer_phone.as_deref(),
                quantity: 1,
                amount: payment.amount,
                status: RegistrationStatus::Confirmed,
                needs_review: true,
                custom_fields: json!({
                    "synthesized": true,
                    "payment_number": payment.payment_number,
                }),
            },
        )
    }

    pub fn find_primary_for_payment(
        conn: &mut PgConnection,
        payment_id: Uuid,
    ) -> Result<Option<Registration>, ApiError> {
        Ok(RegistrationRepository::find_by_payment(conn, payment_id)?
            .into_iter()
            .next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_number_concatenates_prefix_and_suffix() {
        assert_eq!(
            RegistrationService::format_number("CONF24-", 42, "-IN"),
            "CONF24-42-IN"
        );
        assert_eq!(RegistrationService::format_number("", 7, ""), "7");
    }

    #[test]
    fn default_number_shape() {
        let n = RegistrationService::default_number();
        assert!(n.starts_with("REG-"));
        // REG- + yyyymmdd + - + 6 chars
        assert_eq!(n.len(), 4 + 8 + 1 + 6);
        let token = &n[13..];
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!token.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn default_numbers_are_distinct() {
        let a = RegistrationService::default_number();
        let b = RegistrationService::default_number();
        assert_ne!(a, b);
    }
}
