mod common;

use attendly_primitives::models::entities::enum_types::PaymentStatus;
use attendly_primitives::schema::payments;
use common::fixtures;
use diesel::prelude::*;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_gateway_order(order_id: &str, amount: i64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": order_id,
            "amount": amount,
            "currency": "INR",
            "status": "created"
        })))
}

#[tokio::test]
#[serial]
async fn create_order_computes_the_charge_server_side() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 40_000, Some(100));

    mock_gateway_order("order_o1", 80_000).mount(&gateway).await;

    let response = server
        .post("/api/orders")
        .json(&json!({
            "event_id": event.id,
            "ticket_type_id": ticket.id,
            "quantity": 2,
            "name": "Asha Rao",
            "email": "asha@example.com",
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["order_id"], "order_o1");
    assert_eq!(body["amount"], 80_000);
    assert_eq!(body["is_duplicate"], false);
    assert_eq!(body["key_id"], common::TEST_KEY_ID);

    let payment_id: Uuid = body["payment_id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("payment id in response");
    assert_eq!(
        fixtures::payment_status(&mut conn, payment_id),
        PaymentStatus::Pending
    );

    let (amount, metadata): (i64, serde_json::Value) = payments::table
        .find(payment_id)
        .select((payments::amount, payments::metadata))
        .first(&mut conn)
        .expect("payment row");
    assert_eq!(amount, 80_000);
    assert_eq!(metadata["intent"]["quantity"], 2);
    assert_eq!(
        metadata["intent"]["ticket_type_id"],
        json!(ticket.id.to_string())
    );
}

#[tokio::test]
#[serial]
async fn repeat_checkout_reuses_the_pending_order() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 40_000, Some(100));

    // The gateway must only be asked for one order.
    mock_gateway_order("order_o2", 40_000)
        .expect(1)
        .mount(&gateway)
        .await;

    let request = json!({
        "event_id": event.id,
        "ticket_type_id": ticket.id,
        "quantity": 1,
        "name": "Asha Rao",
        "email": "asha@example.com",
    });

    let first = server.post("/api/orders").json(&request).await;
    first.assert_status_ok();
    let first_body: serde_json::Value = first.json();

    let second = server.post("/api/orders").json(&request).await;
    second.assert_status_ok();
    let second_body: serde_json::Value = second.json();

    assert_eq!(second_body["is_duplicate"], true);
    assert_eq!(second_body["order_id"], first_body["order_id"]);
    assert_eq!(second_body["payment_id"], first_body["payment_id"]);
}

#[tokio::test]
#[serial]
async fn sold_out_ticket_type_is_rejected() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 40_000, Some(1));

    let response = server
        .post("/api/orders")
        .json(&json!({
            "event_id": event.id,
            "ticket_type_id": ticket.id,
            "quantity": 2,
            "name": "Asha Rao",
            "email": "asha@example.com",
        }))
        .await;

    response.assert_status(http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn invalid_order_input_fails_validation() {
    let gateway = MockServer::start().await;
    let Some((state, server)) = common::try_server(&gateway.uri()) else {
        return;
    };

    let mut conn = common::get_conn(&state);
    let event = fixtures::seed_event(&mut conn, false);
    let ticket = fixtures::seed_ticket_type(&mut conn, event.id, 40_000, Some(100));

    let zero_quantity = server
        .post("/api/orders")
        .json(&json!({
            "event_id": event.id,
            "ticket_type_id": ticket.id,
            "quantity": 0,
            "name": "Asha Rao",
            "email": "asha@example.com",
        }))
        .await;
    zero_quantity.assert_status(http::StatusCode::BAD_REQUEST);

    let bad_email = server
        .post("/api/orders")
        .json(&json!({
            "event_id": event.id,
            "ticket_type_id": ticket.id,
            "quantity": 1,
            "name": "Asha Rao",
            "email": "not-an-email",
        }))
        .await;
    bad_email.assert_status(http::StatusCode::BAD_REQUEST);
}
