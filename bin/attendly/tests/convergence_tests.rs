mod common;

use attendly_primitives::models::entities::enum_types::{PaymentStatus, RegistrationStatus};
use attendly_primitives::schema::{ticket_inventory_claims, ticket_types};
use common::fixtures;
use diesel::prelude::*;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Undo the inventory side effects of a confirmation, leaving the payment
/// completed and the registration in place. This is the state a process
/// crash between the confirmation transaction and inventory accounting
/// leaves behind.
fn wipe_inventory(conn: &mut PgConnection, payment_id: Uuid, ticket_type_id: Uuid) {
    diesel::delete(
        ticket_inventory_claims::table.filter(ticket_inventory_claims::payment_id.eq(payment_id)),
    )
    .execute(conn)
    .expect("delete claims");
    diesel::update(ticket_types::table.find(ticket_type_id))
        .set(ticket_types::quantity_sold.eq(0))
        .execute(conn)
        .expect("reset quantity_sold");
}

#[tokio::test]
#[serial]
async fn webhook_then_verify_converges_on_one_registration() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_c1");

    let body = fixtures::captured_webhook_body("order_c1", "pay_c1", 50_000);
    server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(body.as_bytes()))
        .text(body)
        .await
        .assert_status_ok();

    // The client's verify lands after the webhook already confirmed. No
    // gateway mock: an already completed payment is never re-fetched.
    let response = server
        .post("/api/payments/verify")
        .json(&json!({
            "razorpay_order_id": "order_c1",
            "razorpay_payment_id": "pay_c1",
            "razorpay_signature": fixtures::sign_payment("order_c1", "pay_c1"),
        }))
        .await;

    response.assert_status_ok();
    let response_body: serde_json::Value = response.json();
    assert_eq!(response_body["success"], true);
    assert_eq!(response_body["is_duplicate"], true);
    assert!(response_body["registration_number"].is_string());

    assert_eq!(
        fixtures::payment_status(&mut conn, payment.id),
        PaymentStatus::Completed
    );
    let regs = fixtures::registrations_for(&mut conn, payment.id);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].status, RegistrationStatus::Confirmed);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);
    assert_eq!(fixtures::claim_count(&mut conn, payment.id), 1);
}

#[tokio::test]
#[serial]
async fn verify_then_webhook_converges_on_one_registration() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_c2");

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_c2",
            "order_id": "order_c2",
            "amount": 50_000,
            "currency": "INR",
            "status": "captured"
        })))
        .mount(&gateway)
        .await;

    server
        .post("/api/payments/verify")
        .json(&json!({
            "razorpay_order_id": "order_c2",
            "razorpay_payment_id": "pay_c2",
            "razorpay_signature": fixtures::sign_payment("order_c2", "pay_c2"),
        }))
        .await
        .assert_status_ok();

    // The gateway's own delivery arrives second and must change nothing.
    let body = fixtures::captured_webhook_body("order_c2", "pay_c2", 50_000);
    server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(body.as_bytes()))
        .text(body)
        .await
        .assert_status_ok();

    assert_eq!(
        fixtures::payment_status(&mut conn, payment.id),
        PaymentStatus::Completed
    );
    let regs = fixtures::registrations_for(&mut conn, payment.id);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].status, RegistrationStatus::Confirmed);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);
    assert_eq!(fixtures::claim_count(&mut conn, payment.id), 1);
}

#[tokio::test]
#[serial]
async fn redelivered_webhook_repairs_missing_inventory() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_c3");

    let body = fixtures::captured_webhook_body("order_c3", "pay_c3", 50_000);
    let signature = fixtures::sign_webhook(body.as_bytes());

    server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", signature.clone())
        .text(body.clone())
        .await
        .assert_status_ok();

    wipe_inventory(&mut conn, payment.id, ticket.id);

    let response = server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", signature)
        .text(body)
        .await;

    response.assert_status_ok();
    assert_eq!(fixtures::registrations_for(&mut conn, payment.id).len(), 1);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);
    assert_eq!(fixtures::claim_count(&mut conn, payment.id), 1);
}

#[tokio::test]
#[serial]
async fn repeated_verify_repairs_missing_inventory() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_c4");

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_c4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_c4",
            "order_id": "order_c4",
            "amount": 50_000,
            "currency": "INR",
            "status": "captured"
        })))
        .mount(&gateway)
        .await;

    let request = json!({
        "razorpay_order_id": "order_c4",
        "razorpay_payment_id": "pay_c4",
        "razorpay_signature": fixtures::sign_payment("order_c4", "pay_c4"),
    });

    server
        .post("/api/payments/verify")
        .json(&request)
        .await
        .assert_status_ok();

    wipe_inventory(&mut conn, payment.id, ticket.id);

    let response = server.post("/api/payments/verify").json(&request).await;

    response.assert_status_ok();
    let response_body: serde_json::Value = response.json();
    assert_eq!(response_body["is_duplicate"], true);

    assert_eq!(fixtures::registrations_for(&mut conn, payment.id).len(), 1);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);
    assert_eq!(fixtures::claim_count(&mut conn, payment.id), 1);
}
