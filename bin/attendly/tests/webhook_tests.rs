mod common;

use attendly_primitives::models::entities::enum_types::{PaymentStatus, RegistrationStatus};
use attendly_primitives::schema::{notification_outbox, payments};
use common::fixtures;
use diesel::prelude::*;
use serial_test::serial;
use wiremock::MockServer;

#[tokio::test]
#[serial]
async fn captured_webhook_confirms_pending_payment() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_w1");

    let body = fixtures::captured_webhook_body("order_w1", "pay_w1", 50_000);
    let response = server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(body.as_bytes()))
        .text(body)
        .await;

    response.assert_status_ok();
    assert_eq!(
        fixtures::payment_status(&mut conn, payment.id),
        PaymentStatus::Completed
    );
    let regs = fixtures::registrations_for(&mut conn, payment.id);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].status, RegistrationStatus::Confirmed);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);

    // The queued notification carries the phone number WhatsApp delivery
    // needs, not just the email.
    let payload: serde_json::Value = notification_outbox::table
        .select(notification_outbox::payload)
        .first(&mut conn)
        .expect("outbox entry");
    assert_eq!(payload["attendee_phone"], "+919900112233");
    assert_eq!(payload["attendee_email"], "asha@example.com");
}

#[tokio::test]
#[serial]
async fn redelivered_webhook_does_not_double_count_inventory() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_w2");

    let body = fixtures::captured_webhook_body("order_w2", "pay_w2", 50_000);
    let signature = fixtures::sign_webhook(body.as_bytes());

    for _ in 0..3 {
        let response = server
            .post("/api/webhooks/razorpay")
            .add_header("x-razorpay-signature", signature.clone())
            .text(body.clone())
            .await;
        response.assert_status_ok();
    }

    assert_eq!(fixtures::registrations_for(&mut conn, payment.id).len(), 1);
    assert_eq!(fixtures::quantity_sold(&mut conn, ticket.id), 1);
    assert_eq!(fixtures::claim_count(&mut conn, payment.id), 1);
}

#[tokio::test]
#[serial]
async fn webhook_for_unknown_order_records_an_orphan_payment() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let body = fixtures::captured_webhook_body("order_stranger", "pay_stranger", 75_000);
    let response = server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(body.as_bytes()))
        .text(body)
        .await;

    response.assert_status_ok();

    let mut conn = common::get_conn(&state);
    let (status, is_orphan, event_id): (PaymentStatus, bool, Option<uuid::Uuid>) = payments::table
        .filter(payments::gateway_order_id.eq("order_stranger"))
        .select((payments::status, payments::is_orphan, payments::event_id))
        .first(&mut conn)
        .expect("orphan payment row");

    assert_eq!(status, PaymentStatus::Completed);
    assert!(is_orphan);
    assert!(event_id.is_none());
}

#[tokio::test]
#[serial]
async fn redelivered_orphan_webhook_is_acknowledged() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let body = fixtures::captured_webhook_body("order_ghost", "pay_ghost", 60_000);
    let signature = fixtures::sign_webhook(body.as_bytes());

    // Orphans have no purchase intent, so a redelivery must be acknowledged
    // as-is rather than bounced back into the gateway's retry loop.
    for _ in 0..2 {
        let response = server
            .post("/api/webhooks/razorpay")
            .add_header("x-razorpay-signature", signature.clone())
            .text(body.clone())
            .await;
        response.assert_status_ok();
    }

    let mut conn = common::get_conn(&state);
    let rows: i64 = payments::table
        .filter(payments::gateway_order_id.eq("order_ghost"))
        .count()
        .get_result(&mut conn)
        .expect("orphan count");
    assert_eq!(rows, 1);

    let is_orphan: bool = payments::table
        .filter(payments::gateway_order_id.eq("order_ghost"))
        .select(payments::is_orphan)
        .first(&mut conn)
        .expect("orphan row");
    assert!(is_orphan);
}

#[tokio::test]
#[serial]
async fn refund_webhook_cascades_to_registrations() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_w3");

    let capture = fixtures::captured_webhook_body("order_w3", "pay_w3", 50_000);
    server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(capture.as_bytes()))
        .text(capture)
        .await
        .assert_status_ok();

    let refund = fixtures::refund_webhook_body("pay_w3", 50_000);
    let response = server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", fixtures::sign_webhook(refund.as_bytes()))
        .text(refund)
        .await;

    response.assert_status_ok();
    assert_eq!(
        fixtures::payment_status(&mut conn, payment.id),
        PaymentStatus::Refunded
    );
    let regs = fixtures::registrations_for(&mut conn, payment.id);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].status, RegistrationStatus::Refunded);
}

#[tokio::test]
#[serial]
async fn webhook_with_bad_signature_is_rejected() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 50_000, Some(100));
    let payment =
        fixtures::seed_pending_payment(&mut conn, &event, Some(ticket.id), 50_000, 1, "order_w4");

    let body = fixtures::captured_webhook_body("order_w4", "pay_w4", 50_000);
    let response = server
        .post("/api/webhooks/razorpay")
        .add_header("x-razorpay-signature", "deadbeef")
        .text(body)
        .await;

    response.assert_status(http::StatusCode::BAD_REQUEST);
    assert_eq!(
        fixtures::payment_status(&mut conn, payment.id),
        PaymentStatus::Pending
    );
    assert!(fixtures::registrations_for(&mut conn, payment.id).is_empty());
}

#[tokio::test]
#[serial]
async fn webhook_without_signature_header_is_rejected() {
    let gateway = MockServer::start().await;
    let Some((_state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let body = fixtures::captured_webhook_body("order_w5", "pay_w5", 50_000);
    let response = server.post("/api/webhooks/razorpay").text(body).await;

    response.assert_status(http::StatusCode::BAD_REQUEST);
}
