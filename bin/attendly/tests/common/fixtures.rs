use attendly_core::clients::RazorpayClient;
use attendly_primitives::models::entities::enum_types::{
    CurrencyCode, PaymentKind, PaymentStatus, RegistrationStatus,
};
use attendly_primitives::models::entities::event::{Event, NewEvent};
use attendly_primitives::models::entities::payment::{NewPayment, Payment};
use attendly_primitives::models::entities::registration::{NewRegistration, Registration};
use attendly_primitives::models::entities::ticket_type::{NewTicketType, TicketType};
use attendly_primitives::schema::{
    events, payments, registrations, ticket_inventory_claims, ticket_types,
};
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

pub fn cleanup(conn: &mut PgConnection) {
    let _ = diesel::sql_query(
        "TRUNCATE events, ticket_types, group_orders, payments, registrations, addons, \
         registration_addons, discount_codes, payment_alerts, ticket_inventory_claims, \
         notification_outbox CASCADE",
    )
    .execute(conn);
}

pub fn seed_event(conn: &mut PgConnection, custom_numbering: bool) -> Event {
    diesel::insert_into(events::table)
        .values(NewEvent {
            name: "RustConf India",
            currency: CurrencyCode::INR,
            custom_numbering,
            reg_prefix: "RC-",
            reg_suffix: "",
            reg_start: 100,
        })
        .get_result(conn)
        .expect("seed event")
}

pub fn seed_ticket_type(
    conn: &mut PgConnection,
    event_id: Uuid,
    price: i64,
    quantity_total: Option<i32>,
) -> TicketType {
    diesel::insert_into(ticket_types::table)
        .values(NewTicketType {
            event_id,
            name: "General Admission",
            price,
            tax_bps: 0,
            quantity_total,
        })
        .get_result(conn)
        .expect("seed ticket type")
}

/// A pending payment carrying a normal individual-purchase intent.
pub fn seed_pending_payment(
    conn: &mut PgConnection,
    event: &Event,
    ticket_type_id: Option<Uuid>,
    amount: i64,
    quantity: i32,
    order_id: &str,
) -> Payment {
    seed_payment_with_intent(
        conn,
        event,
        amount,
        order_id,
        json!({
            "intent": {
                "ticket_type_id": ticket_type_id,
                "quantity": quantity,
                "addons": [],
            }
        }),
    )
}

pub fn seed_payment_with_intent(
    conn: &mut PgConnection,
    event: &Event,
    amount: i64,
    order_id: &str,
    metadata: serde_json::Value,
) -> Payment {
    let payment_number = format!("PAY-TEST-{}", &order_id[order_id.len().saturating_sub(6)..]);
    diesel::insert_into(payments::table)
        .values(NewPayment {
            payment_number: &payment_number,
            event_id: Some(event.id),
            gateway_order_id: order_id,
            gateway_payment_id: None,
            amount,
            currency: CurrencyCode::INR,
            payer_name: "Asha Rao",
            payer_email: "asha@example.com",
            payer_phone: Some("+919900112233"),
            status: PaymentStatus::Pending,
            kind: PaymentKind::Registration,
            is_orphan: false,
            metadata,
        })
        .get_result(conn)
        .expect("seed payment")
}

pub fn seed_pending_registration(
    conn: &mut PgConnection,
    event: &Event,
    ticket_type_id: Option<Uuid>,
    group_order_id: Option<Uuid>,
    number: &str,
    email: &str,
) -> Registration {
    diesel::insert_into(registrations::table)
        .values(NewRegistration {
            registration_number: number,
            event_id: event.id,
            ticket_type_id,
            payment_id: None,
            group_order_id,
            attendee_name: "Attendee",
            attendee_email: email,
            attendee_phone: None,
            quantity: 1,
            amount: 0,
            status: RegistrationStatus::Pending,
            needs_review: false,
            custom_fields: json!({}),
        })
        .get_result(conn)
        .expect("seed registration")
}

pub fn quantity_sold(conn: &mut PgConnection, ticket_type_id: Uuid) -> i32 {
    ticket_types::table
        .find(ticket_type_id)
        .select(ticket_types::quantity_sold)
        .first(conn)
        .expect("quantity_sold")
}

pub fn claim_count(conn: &mut PgConnection, payment_id: Uuid) -> i64 {
    ticket_inventory_claims::table
        .filter(ticket_inventory_claims::payment_id.eq(payment_id))
        .count()
        .get_result(conn)
        .expect("claim count")
}

pub fn payment_status(conn: &mut PgConnection, payment_id: Uuid) -> PaymentStatus {
    payments::table
        .find(payment_id)
        .select(payments::status)
        .first(conn)
        .expect("payment status")
}

pub fn registrations_for(conn: &mut PgConnection, payment_id: Uuid) -> Vec<Registration> {
    registrations::table
        .filter(registrations::payment_id.eq(payment_id))
        .load(conn)
        .expect("registrations")
}

pub fn sign_payment(order_id: &str, payment_id: &str) -> String {
    RazorpayClient::sign_payment(order_id, payment_id, super::TEST_KEY_SECRET)
}

pub fn sign_webhook(body: &[u8]) -> String {
    RazorpayClient::sign_webhook(body, super::TEST_WEBHOOK_SECRET)
}

pub fn captured_webhook_body(order_id: &str, gateway_payment_id: &str, amount: i64) -> String {
    json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": gateway_payment_id,
                    "order_id": order_id,
                    "amount": amount,
                    "currency": "INR",
                    "status": "captured",
                    "email": "asha@example.com"
                }
            }
        }
    })
    .to_string()
}

pub fn refund_webhook_body(gateway_payment_id: &str, amount: i64) -> String {
    json!({
        "event": "refund.processed",
        "payload": {
            "refund": {
                "entity": {
                    "id": "rfnd_test_1",
                    "payment_id": gateway_payment_id,
                    "amount": amount,
                    "status": "processed"
                }
            }
        }
    })
    .to_string()
}
