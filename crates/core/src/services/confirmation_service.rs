use crate::app_state::AppState;
use crate::clients::RazorpayClient;
use crate::repositories::{
    AddonRepository, AlertRepository, EventRepository, GroupOrderRepository, OutboxRepository,
    PaymentRepository, RegistrationRepository,
};
use crate::services::inventory_service::{InventoryOutcome, InventoryService};
use crate::services::registration_service::RegistrationService;
use attendly_primitives::error::ApiError;
use attendly_primitives::models::dtos::order_dto::OrderIntent;
use attendly_primitives::models::dtos::verify_dto::{VerifyPaymentRequest, VerifyPaymentResponse};
use attendly_primitives::models::dtos::webhook_dto::{GatewayPayment, WebhookEnvelope};
use attendly_primitives::models::entities::addon::NewRegistrationAddon;
use attendly_primitives::models::entities::enum_types::{CurrencyCode, PaymentStatus, RegistrationStatus};
use attendly_primitives::models::entities::event::Event;
use attendly_primitives::models::entities::outbox::NewOutboxEntry;
use attendly_primitives::models::entities::payment::{NewPayment, Payment};
use attendly_primitives::models::entities::payment_alert::NewPaymentAlert;
use attendly_primitives::models::entities::registration::{NewRegistration, Registration};
use chrono::Utc;
use diesel::prelude::*;
use diesel::Connection;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{info, warn};

/// How a confirmation reached us; recorded in the payment's audit trail.
#[derive(Debug, Clone, Copy)]
pub enum ConfirmationTrigger {
    Verify,
    Webhook,
}

impl ConfirmationTrigger {
    fn as_str(self) -> &'static str {
        match self {
            ConfirmationTrigger::Verify => "verify",
            ConfirmationTrigger::Webhook => "webhook",
        }
    }
}

struct MaterializeResult {
    primary: Option<Registration>,
    newly_confirmed: Vec<Registration>,
}

pub struct ConfirmationService;

impl ConfirmationService {
    /// Client-initiated confirmation. Signature proves the gateway issued
    /// the (order, payment) pair; the gateway fetch cross-checks capture
    /// status and amount when reachable.
    pub async fn verify(
        state: &AppState,
        req: VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ApiError> {
        let mut conn = state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let mut payment =
            PaymentRepository::find_by_gateway_order_id(&mut conn, &req.razorpay_order_id)?
                .ok_or_else(|| ApiError::NotFound("No order found for this payment".into()))?;

        match payment.status {
            PaymentStatus::Completed => {
                // Orphans carry no intent; there is nothing to materialize.
                if payment.is_orphan {
                    return Ok(Self::respond(&payment, None, true));
                }
                // Already done: report it, but repair any side effect an
                // earlier attempt died before finishing. Inventory is
                // re-checked even when the registration exists because the
                // claim is written after the confirmation transaction.
                if let Some(reg) =
                    RegistrationService::find_primary_for_payment(&mut conn, payment.id)?
                {
                    Self::account_inventory(&mut conn, &payment);
                    return Ok(Self::respond(&payment, Some(&reg), true));
                }
                let result = Self::materialize_completed(&mut conn, &payment)?;
                return Ok(Self::respond(&payment, result.primary.as_ref(), true));
            }
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                return Err(ApiError::Payment(
                    "Payment is not in a confirmable state".into(),
                ));
            }
            PaymentStatus::Pending => {}
        }

        let event = match payment.event_id {
            Some(event_id) => EventRepository::find_by_id(&mut conn, event_id)?,
            None => None,
        };

        let creds = state.razorpay.credentials_for(event.as_ref());
        RazorpayClient::verify_payment_signature(
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
            creds.key_secret.expose_secret(),
        )?;

        // Cross-check against the gateway's own record. A transport failure
        // is tolerated (the signature already proved authenticity); a
        // definitive "not captured" is not.
        match state.razorpay.fetch_payment(&creds, &req.razorpay_payment_id).await {
            Ok(gateway_payment) => {
                if !gateway_payment.is_settled() {
                    PaymentRepository::mark_failed(
                        &mut conn,
                        payment.id,
                        Some(&req.razorpay_payment_id),
                    )?;
                    return Err(ApiError::Payment(
                        "Gateway reports payment not captured".into(),
                    ));
                }
                if gateway_payment.amount != payment.amount {
                    AlertRepository::record(
                        &mut conn,
                        NewPaymentAlert {
                            alert_type: "amount_mismatch",
                            message: "Gateway amount differs from order amount",
                            payment_id: Some(payment.id),
                            event_id: payment.event_id,
                            details: json!({
                                "expected": payment.amount,
                                "reported": gateway_payment.amount,
                            }),
                        },
                    );
                    return Err(ApiError::Payment(
                        "Payment amount does not match the order".into(),
                    ));
                }
            }
            Err(e) => {
                warn!(order_id = %req.razorpay_order_id, "Gateway cross-check unavailable: {}", e);
            }
        }

        // A registration the client created before paying flows into the
        // stored intent, so webhook deliveries and replays see the same
        // linkage. Only written after the signature proved the caller.
        if let Some(registration_id) = req.registration_id {
            let already_linked = payment
                .metadata
                .get("intent")
                .and_then(|i| i.get("registration_id"))
                .is_some_and(|v| !v.is_null());
            if !already_linked {
                let mut intent = payment
                    .metadata
                    .get("intent")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                if let Some(obj) = intent.as_object_mut() {
                    obj.insert("registration_id".into(), json!(registration_id));
                }
                PaymentRepository::merge_metadata(&mut conn, payment.id, &json!({ "intent": intent }))?;
                if let Some(meta) = payment.metadata.as_object_mut() {
                    meta.insert("intent".into(), intent);
                }
            }
        }

        let (payment, result) = Self::confirm(
            &mut conn,
            payment,
            event.as_ref(),
            &req.razorpay_payment_id,
            ConfirmationTrigger::Verify,
        )?;

        Ok(Self::respond(&payment, result.primary.as_ref(), false))
    }

    /// Gateway-initiated confirmation. The raw body, not a re-serialization,
    /// is what the signature covers.
    pub async fn handle_webhook(
        state: &AppState,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<(), ApiError> {
        let envelope: WebhookEnvelope = serde_json::from_slice(raw_body)
            .map_err(|_| ApiError::BadRequest("Malformed webhook payload".into()))?;

        let mut conn = state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        // Resolve the local payment first: its event decides which webhook
        // secret should have signed this delivery.
        let payment = match envelope.event.as_str() {
            "refund.processed" | "refund.failed" => {
                let refund = envelope
                    .payload
                    .refund
                    .as_ref()
                    .ok_or_else(|| ApiError::BadRequest("Refund event without refund entity".into()))?;
                PaymentRepository::find_by_gateway_payment_id(&mut conn, &refund.entity.payment_id)?
            }
            _ => {
                let order_id = envelope
                    .payload
                    .payment
                    .as_ref()
                    .and_then(|p| p.entity.order_id.as_deref());
                match order_id {
                    Some(order_id) => {
                        PaymentRepository::find_by_gateway_order_id(&mut conn, order_id)?
                    }
                    None => None,
                }
            }
        };

        let event = match payment.as_ref().and_then(|p| p.event_id) {
            Some(event_id) => EventRepository::find_by_id(&mut conn, event_id)?,
            None => None,
        };

        Self::verify_webhook(state, raw_body, signature, event.as_ref())?;

        match envelope.event.as_str() {
            "payment.captured" => {
                let gateway_payment = envelope
                    .payload
                    .payment
                    .ok_or_else(|| ApiError::BadRequest("Capture event without payment entity".into()))?
                    .entity;

                match payment {
                    Some(payment) if payment.status == PaymentStatus::Pending => {
                        Self::confirm(
                            &mut conn,
                            payment,
                            event.as_ref(),
                            &gateway_payment.id,
                            ConfirmationTrigger::Webhook,
                        )?;
                    }
                    Some(payment) => {
                        // Redelivery or lost race against verify; make sure
                        // every side effect finished, then drop it. Orphans
                        // are acknowledged as-is, they have no intent.
                        if payment.status == PaymentStatus::Completed && !payment.is_orphan {
                            if RegistrationRepository::exists_for_payment(&mut conn, payment.id)? {
                                Self::account_inventory(&mut conn, &payment);
                            } else {
                                Self::materialize_completed(&mut conn, &payment)?;
                            }
                        }
                        info!(payment_number = %payment.payment_number, "Duplicate capture webhook ignored");
                    }
                    None => {
                        Self::record_orphan(&mut conn, &gateway_payment)?;
                    }
                }
            }
            "payment.failed" => {
                let gateway_payment = envelope
                    .payload
                    .payment
                    .ok_or_else(|| ApiError::BadRequest("Failure event without payment entity".into()))?
                    .entity;

                match payment {
                    Some(payment) => {
                        let transitioned = PaymentRepository::mark_failed(
                            &mut conn,
                            payment.id,
                            Some(&gateway_payment.id),
                        )?;
                        if transitioned {
                            PaymentRepository::merge_metadata(
                                &mut conn,
                                payment.id,
                                &json!({
                                    "gateway_error_code": gateway_payment.error_code,
                                    "gateway_error_description": gateway_payment.error_description,
                                }),
                            )?;
                        }
                        if !transitioned && payment.status == PaymentStatus::Completed {
                            // Failure after completion is a gateway-side
                            // contradiction worth a human look.
                            AlertRepository::record(
                                &mut conn,
                                NewPaymentAlert {
                                    alert_type: "failed_after_completed",
                                    message: "Failure webhook for an already completed payment",
                                    payment_id: Some(payment.id),
                                    event_id: payment.event_id,
                                    details: json!({
                                        "gateway_payment_id": gateway_payment.id,
                                        "error_code": gateway_payment.error_code,
                                    }),
                                },
                            );
                        }
                    }
                    None => {
                        info!(gateway_payment_id = %gateway_payment.id, "Failure webhook for unknown order ignored");
                    }
                }
            }
            "refund.processed" => {
                let refund = envelope
                    .payload
                    .refund
                    .ok_or_else(|| ApiError::BadRequest("Refund event without refund entity".into()))?
                    .entity;

                match payment {
                    Some(payment) => {
                        let transitioned = PaymentRepository::mark_refunded(&mut conn, payment.id)?;
                        if transitioned {
                            let cascaded =
                                RegistrationRepository::mark_refunded_by_payment(&mut conn, payment.id)?;
                            info!(
                                payment_number = %payment.payment_number,
                                cascaded,
                                "Refund processed"
                            );
                        }
                    }
                    None => {
                        AlertRepository::record(
                            &mut conn,
                            NewPaymentAlert {
                                alert_type: "orphan_refund",
                                message: "Refund webhook for an unknown payment",
                                payment_id: None,
                                event_id: None,
                                details: json!({ "gateway_payment_id": refund.payment_id, "refund_id": refund.id }),
                            },
                        );
                    }
                }
            }
            "refund.failed" => {
                AlertRepository::record(
                    &mut conn,
                    NewPaymentAlert {
                        alert_type: "refund_failed",
                        message: "Gateway reports a failed refund",
                        payment_id: payment.as_ref().map(|p| p.id),
                        event_id: payment.as_ref().and_then(|p| p.event_id),
                        details: json!({ "event": envelope.event }),
                    },
                );
            }
            other => {
                info!(event = other, "Ignoring unhandled webhook event");
            }
        }

        Ok(())
    }

    fn verify_webhook(
        state: &AppState,
        raw_body: &[u8],
        signature: &str,
        event: Option<&Event>,
    ) -> Result<(), ApiError> {
        let secrets = state.razorpay.webhook_secrets_for(event);
        for secret in &secrets {
            if RazorpayClient::verify_webhook_signature(raw_body, signature, secret.expose_secret())
                .is_ok()
            {
                return Ok(());
            }
        }
        Err(ApiError::Signature("Invalid webhook signature".into()))
    }

    /// The shared completion path: ledger transition, audit trail,
    /// materialization and side-effect scheduling in one transaction, then
    /// inventory accounting in its own transactions.
    fn confirm(
        conn: &mut PgConnection,
        mut payment: Payment,
        event: Option<&Event>,
        gateway_payment_id: &str,
        trigger: ConfirmationTrigger,
    ) -> Result<(Payment, MaterializeResult), ApiError> {
        let result = conn.transaction::<_, ApiError, _>(|conn| {
            let won = PaymentRepository::mark_completed(conn, payment.id, gateway_payment_id)?;

            PaymentRepository::merge_metadata(
                conn,
                payment.id,
                &json!({
                    "verified_at": Utc::now().to_rfc3339(),
                    "verified_via": trigger.as_str(),
                    "gateway_payment_id": gateway_payment_id,
                }),
            )?;

            let result = Self::materialize(conn, &payment, event)?;

            // Notifications only for work this call actually did; the loser
            // of the ledger race materializes idempotently but stays silent.
            if won {
                for reg in &result.newly_confirmed {
                    OutboxRepository::enqueue(
                        conn,
                        NewOutboxEntry {
                            registration_id: reg.id,
                            kind: "registration_confirmed",
                            payload: json!({
                                "registration_number": reg.registration_number,
                                "attendee_name": reg.attendee_name,
                                "attendee_email": reg.attendee_email,
                                "attendee_phone": reg.attendee_phone,
                                "event_id": reg.event_id,
                            }),
                        },
                    )?;
                }
            }

            Ok(result)
        })?;

        payment.status = PaymentStatus::Completed;
        payment.gateway_payment_id = Some(gateway_payment_id.to_string());

        Self::account_inventory(conn, &payment);

        info!(
            payment_number = %payment.payment_number,
            via = trigger.as_str(),
            confirmed = result.newly_confirmed.len(),
            "Payment confirmed"
        );

        Ok((payment, result))
    }

    /// Repair path for a payment already completed but missing its
    /// registrations.
    fn materialize_completed(
        conn: &mut PgConnection,
        payment: &Payment,
    ) -> Result<MaterializeResult, ApiError> {
        let event = match payment.event_id {
            Some(event_id) => EventRepository::find_by_id(conn, event_id)?,
            None => None,
        };

        let result = conn.transaction::<_, ApiError, _>(|conn| {
            let result = Self::materialize(conn, payment, event.as_ref())?;
            for reg in &result.newly_confirmed {
                OutboxRepository::enqueue(
                    conn,
                    NewOutboxEntry {
                        registration_id: reg.id,
                        kind: "registration_confirmed",
                        payload: json!({
                            "registration_number": reg.registration_number,
                            "attendee_name": reg.attendee_name,
                            "attendee_email": reg.attendee_email,
                            "attendee_phone": reg.attendee_phone,
                            "event_id": reg.event_id,
                        }),
                    },
                )?;
            }
            Ok(result)
        })?;

        Self::account_inventory(conn, payment);

        Ok(result)
    }

    /// Turn the stored purchase intent into confirmed registrations. Every
    /// branch is safe to replay: guarded confirms, conflict-ignoring addon
    /// attaches, and existence checks before creation.
    fn materialize(
        conn: &mut PgConnection,
        payment: &Payment,
        event: Option<&Event>,
    ) -> Result<MaterializeResult, ApiError> {
        let intent: Option<OrderIntent> = payment
            .metadata
            .get("intent")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        let Some(intent) = intent else {
            return Self::materialize_safety_net(conn, payment, event);
        };

        // Group purchase: confirm every attendee registration under the
        // group order.
        if let Some(group_order_id) = intent.group_order_id {
            let regs = RegistrationRepository::find_by_group_order(conn, group_order_id)?;
            if regs.is_empty() {
                return Self::materialize_safety_net(conn, payment, event);
            }

            let mut newly_confirmed = Vec::new();
            for reg in &regs {
                if RegistrationRepository::confirm_if_pending(conn, reg.id, payment.id)? {
                    let mut confirmed = reg.clone();
                    confirmed.status = RegistrationStatus::Confirmed;
                    confirmed.payment_id = Some(payment.id);
                    newly_confirmed.push(confirmed);
                }
            }
            GroupOrderRepository::mark_paid(conn, group_order_id, payment.id)?;

            return Ok(MaterializeResult {
                primary: regs.into_iter().next(),
                newly_confirmed,
            });
        }

        // Addon-only purchase against an existing registration: attach the
        // purchased lines, no new registration.
        if intent.ticket_type_id.is_none() {
            let Some(registration_id) = intent.registration_id else {
                return Self::materialize_safety_net(conn, payment, event);
            };
            let Some(reg) = RegistrationRepository::find_by_id(conn, registration_id)? else {
                return Self::materialize_safety_net(conn, payment, event);
            };

            Self::attach_addons(conn, &intent, reg.id)?;

            return Ok(MaterializeResult {
                primary: Some(reg),
                newly_confirmed: Vec::new(),
            });
        }

        // Individual purchase with a pre-created registration.
        if let Some(registration_id) = intent.registration_id {
            let Some(reg) = RegistrationRepository::find_by_id(conn, registration_id)? else {
                return Self::materialize_safety_net(conn, payment, event);
            };

            let confirmed_now =
                RegistrationRepository::confirm_if_pending(conn, reg.id, payment.id)?;
            Self::attach_addons(conn, &intent, reg.id)?;

            let mut reg = reg;
            if confirmed_now {
                reg.status = RegistrationStatus::Confirmed;
                reg.payment_id = Some(payment.id);
            }
            let newly_confirmed = if confirmed_now { vec![reg.clone()] } else { Vec::new() };

            return Ok(MaterializeResult { primary: Some(reg), newly_confirmed });
        }

        // Individual purchase, registration created here. A replay finds the
        // existing row and stops.
        if let Some(existing) = RegistrationService::find_primary_for_payment(conn, payment.id)? {
            return Ok(MaterializeResult { primary: Some(existing), newly_confirmed: Vec::new() });
        }

        let Some(event_id) = payment.event_id else {
            return Self::materialize_safety_net(conn, payment, event);
        };

        let number = match event {
            Some(event) => RegistrationService::next_registration_number(conn, event)?,
            None => RegistrationService::default_number(),
        };

        let reg = RegistrationRepository::create(
            conn,
            NewRegistration {
                registration_number: &number,
                event_id,
                ticket_type_id: intent.ticket_type_id,
                payment_id: Some(payment.id),
                group_order_id: None,
                attendee_name: &payment.payer_name,
                attendee_email: &payment.payer_email,
                attendee_phone: payment.payer_phone.as_deref(),
                quantity: intent.quantity,
                amount: payment.amount,
                status: RegistrationStatus::Confirmed,
                needs_review: false,
                custom_fields: json!({}),
            },
        )?;

        Self::attach_addons(conn, &intent, reg.id)?;

        Ok(MaterializeResult { primary: Some(reg.clone()), newly_confirmed: vec![reg] })
    }

    /// Last resort: the money is real even when the intent is not usable.
    /// Synthesize a flagged registration so the attendee exists and an admin
    /// can sort out the rest.
    fn materialize_safety_net(
        conn: &mut PgConnection,
        payment: &Payment,
        event: Option<&Event>,
    ) -> Result<MaterializeResult, ApiError> {
        if let Some(existing) = RegistrationService::find_primary_for_payment(conn, payment.id)? {
            return Ok(MaterializeResult { primary: Some(existing), newly_confirmed: Vec::new() });
        }

        let reg = RegistrationService::synthesize_from_payment(conn, payment, event)?;

        AlertRepository::record(
            conn,
            NewPaymentAlert {
                alert_type: "materialize_fallback",
                message: "Registration synthesized without usable purchase intent",
                payment_id: Some(payment.id),
                event_id: payment.event_id,
                details: json!({ "payment_number": payment.payment_number }),
            },
        );

        warn!(payment_number = %payment.payment_number, "Materialized via safety net");

        Ok(MaterializeResult { primary: Some(reg.clone()), newly_confirmed: vec![reg] })
    }

    fn attach_addons(
        conn: &mut PgConnection,
        intent: &OrderIntent,
        registration_id: uuid::Uuid,
    ) -> Result<(), ApiError> {
        for line in &intent.addons {
            AddonRepository::attach(
                conn,
                NewRegistrationAddon {
                    registration_id,
                    addon_id: line.addon_id,
                    variant: &line.variant,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                },
            )?;
        }
        Ok(())
    }

    /// Inventory runs outside the confirmation transaction: its claim table
    /// is its own idempotency gate, and the degraded fallback needs a fresh
    /// transaction anyway. A failure here is logged and alerted, never
    /// bubbled, because the money and the registration are already durable.
    fn account_inventory(conn: &mut PgConnection, payment: &Payment) {
        let intent: Option<OrderIntent> = payment
            .metadata
            .get("intent")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        let Some(intent) = intent else { return };

        match InventoryService::record_sale(conn, intent.ticket_type_id, payment.id, intent.quantity)
        {
            Ok(InventoryOutcome::Incremented) | Ok(InventoryOutcome::Skipped) => {}
            Ok(InventoryOutcome::AlreadyProcessed) => {
                info!(payment_number = %payment.payment_number, "Inventory already accounted");
            }
            Ok(InventoryOutcome::IncrementedDegraded) => {
                warn!(payment_number = %payment.payment_number, "Inventory accounted via degraded path");
            }
            Err(e) => {
                warn!(payment_number = %payment.payment_number, "Inventory accounting failed: {}", e);
                AlertRepository::record(
                    conn,
                    NewPaymentAlert {
                        alert_type: "inventory_failure",
                        message: "Inventory accounting failed after confirmation",
                        payment_id: Some(payment.id),
                        event_id: payment.event_id,
                        details: json!({ "error": e.to_string() }),
                    },
                );
            }
        }
    }

    /// Orphan capture: money arrived for an order this system never created.
    /// Record it as completed and flagged so reconciliation and alerts make
    /// it visible; there is no intent to materialize.
    fn record_orphan(
        conn: &mut PgConnection,
        gateway_payment: &GatewayPayment,
    ) -> Result<(), ApiError> {
        let payment_number = format!("PAY-ORPHAN-{}", &gateway_payment.id);
        let order_id = gateway_payment
            .order_id
            .clone()
            .unwrap_or_else(|| gateway_payment.id.clone());
        let currency = gateway_payment
            .currency
            .as_deref()
            .and_then(|c| CurrencyCode::parse(c).ok())
            .unwrap_or(CurrencyCode::INR);

        let payment = PaymentRepository::create(
            conn,
            NewPayment {
                payment_number: &payment_number,
                event_id: None,
                gateway_order_id: &order_id,
                gateway_payment_id: Some(&gateway_payment.id),
                amount: gateway_payment.amount,
                currency,
                payer_name: "Unknown",
                payer_email: gateway_payment.email.as_deref().unwrap_or(""),
                payer_phone: gateway_payment.contact.as_deref(),
                status: PaymentStatus::Completed,
                kind: attendly_primitives::models::entities::enum_types::PaymentKind::Registration,
                is_orphan: true,
                metadata: json!({ "orphan": true, "notes": gateway_payment.notes }),
            },
        )?;

        AlertRepository::record(
            conn,
            NewPaymentAlert {
                alert_type: "orphan_payment",
                message: "Capture webhook for an order with no local payment",
                payment_id: Some(payment.id),
                event_id: None,
                details: json!({
                    "gateway_order_id": order_id,
                    "gateway_payment_id": gateway_payment.id,
                    "amount": gateway_payment.amount,
                }),
            },
        );

        warn!(gateway_payment_id = %gateway_payment.id, "Recorded orphan payment");

        Ok(())
    }

    fn respond(
        payment: &Payment,
        registration: Option<&Registration>,
        is_duplicate: bool,
    ) -> VerifyPaymentResponse {
        VerifyPaymentResponse {
            success: true,
            payment_id: payment.id,
            registration_id: registration.map(|r| r.id),
            registration_number: registration.map(|r| r.registration_number.clone()),
            status: PaymentStatus::Completed,
            is_duplicate,
        }
    }
}
