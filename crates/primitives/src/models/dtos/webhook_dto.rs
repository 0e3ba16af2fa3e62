use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Gateway webhook envelope: `{event, payload: {payment?, refund?}}`.
/// Signature verification runs over the raw body before this is parsed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WebhookPayload {
    pub payment: Option<PaymentWrapper>,
    pub refund: Option<RefundWrapper>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentWrapper {
    pub entity: GatewayPayment,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefundWrapper {
    pub entity: GatewayRefund,
}

/// Payment entity as the gateway reports it, both in webhook payloads and
/// fetch-by-id responses.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: i64,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    #[serde(default)]
    pub notes: Value,
}

impl GatewayPayment {
    /// Captured or authorized both count as money secured.
    pub fn is_settled(&self) -> bool {
        matches!(self.status.as_deref(), Some("captured") | Some("authorized"))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GatewayRefund {
    pub id: String,
    pub payment_id: String,
    #[serde(default)]
    pub amount: i64,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_captured_payment_envelope() {
        let body = r#"{
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_abc123",
                        "order_id": "order_xyz789",
                        "amount": 150000,
                        "currency": "INR",
                        "status": "captured",
                        "email": "payer@example.com"
                    }
                }
            }
        }"#;

        let envelope: WebhookEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.event, "payment.captured");
        let payment = envelope.payload.payment.unwrap().entity;
        assert_eq!(payment.order_id.as_deref(), Some("order_xyz789"));
        assert!(payment.is_settled());
    }

    #[test]
    fn parses_refund_envelope_without_payment_block() {
        let body = r#"{
            "event": "refund.processed",
            "payload": {
                "refund": {
                    "entity": {
                        "id": "rfnd_1",
                        "payment_id": "pay_abc123",
                        "amount": 150000,
                        "status": "processed"
                    }
                }
            }
        }"#;

        let envelope: WebhookEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.payload.payment.is_none());
        let refund = envelope.payload.refund.unwrap().entity;
        assert_eq!(refund.payment_id, "pay_abc123");
    }

    #[test]
    fn unknown_event_with_empty_payload_still_parses() {
        let envelope: WebhookEnvelope =
            serde_json::from_str(r#"{"event": "payment.authorized"}"#).unwrap();
        assert!(envelope.payload.payment.is_none());
        assert!(envelope.payload.refund.is_none());
    }

    #[test]
    fn authorized_counts_as_settled_but_failed_does_not() {
        let mut payment: GatewayPayment = serde_json::from_str(
            r#"{"id": "pay_1", "order_id": "order_1", "status": "authorized"}"#,
        )
        .unwrap();
        assert!(payment.is_settled());

        payment.status = Some("failed".into());
        assert!(!payment.is_settled());
    }
}
