use crate::app_state::AppState;
use crate::repositories::{
    AddonRepository, DiscountRepository, EventRepository, GroupOrderRepository, PaymentRepository,
    RegistrationRepository, TicketTypeRepository,
};
use crate::services::registration_service::RegistrationService;
use attendly_primitives::error::ApiError;
use attendly_primitives::models::dtos::order_dto::{
    AddonIntent, CreateOrderRequest, CreateOrderResponse, OrderIntent,
};
use attendly_primitives::models::entities::enum_types::{PaymentKind, PaymentStatus, RegistrationStatus};
use attendly_primitives::models::entities::event::Event;
use attendly_primitives::models::entities::group_order::NewGroupOrder;
use attendly_primitives::models::entities::payment::NewPayment;
use attendly_primitives::models::entities::registration::NewRegistration;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::Connection;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// One line of the charge calculation.
pub struct AddonLine {
    pub unit_price: i64,
    pub quantity: i64,
}

pub struct DiscountTerms {
    pub amount_off: i64,
    pub percent_bps: i64,
}

/// Server-side charge calculation in minor units. Tax applies to the ticket
/// subtotal only; the discount comes off last and can never push the total
/// below zero.
pub fn compute_order_amount(
    ticket_price: i64,
    quantity: i64,
    tax_bps: i64,
    addons: &[AddonLine],
    discount: Option<&DiscountTerms>,
) -> i64 {
    let subtotal = ticket_price * quantity;
    let tax = subtotal * tax_bps / 10_000;
    let addon_total: i64 = addons.iter().map(|a| a.unit_price * a.quantity).sum();

    let gross = subtotal + tax + addon_total;

    let discount_amount = discount
        .map(|d| d.amount_off + subtotal * d.percent_bps / 10_000)
        .unwrap_or(0);

    (gross - discount_amount).max(0)
}

pub struct OrderService;

impl OrderService {
    pub async fn create_order(
        state: &AppState,
        req: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let mut conn = state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let event = EventRepository::find_by_id(&mut conn, req.event_id)?
            .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

        let is_addon_only = req.ticket_type_id.is_none();
        if is_addon_only && req.registration_id.is_none() {
            return Err(ApiError::BadRequest(
                "Addon-only orders require a registration_id".into(),
            ));
        }
        if is_addon_only && req.addons.is_empty() {
            return Err(ApiError::BadRequest(
                "Addon-only orders must select at least one addon".into(),
            ));
        }
        if let Some(registration_id) = req.registration_id {
            RegistrationRepository::find_by_id(&mut conn, registration_id)?
                .ok_or_else(|| ApiError::NotFound("Registration not found".into()))?;
        }

        // Group checkout carries one attendee entry per seat.
        let quantity = if req.attendees.is_empty() {
            i64::from(req.quantity)
        } else {
            req.attendees.len() as i64
        };

        let (ticket_price, tax_bps) = match req.ticket_type_id {
            Some(ticket_type_id) => {
                let ticket_type = TicketTypeRepository::find_by_id(&mut conn, ticket_type_id)?
                    .ok_or_else(|| ApiError::NotFound("Ticket type not found".into()))?;
                if ticket_type.event_id != event.id {
                    return Err(ApiError::BadRequest(
                        "Ticket type does not belong to this event".into(),
                    ));
                }
                if let Some(total) = ticket_type.quantity_total {
                    let remaining = i64::from(total) - i64::from(ticket_type.quantity_sold);
                    if remaining < quantity {
                        return Err(ApiError::Payment("Ticket type is sold out".into()));
                    }
                }
                (ticket_type.price, i64::from(ticket_type.tax_bps))
            }
            None => (0, 0),
        };

        // Addon prices always come from the catalog, never the client.
        let mut addon_lines = Vec::with_capacity(req.addons.len());
        let mut addon_intents = Vec::with_capacity(req.addons.len());
        if !req.addons.is_empty() {
            let ids: Vec<Uuid> = req.addons.iter().map(|a| a.addon_id).collect();
            let catalog = AddonRepository::find_active(&mut conn, event.id, &ids)?;
            for selection in &req.addons {
                if selection.quantity < 1 {
                    return Err(ApiError::BadRequest("Addon quantity must be positive".into()));
                }
                let addon = catalog
                    .iter()
                    .find(|a| a.id == selection.addon_id)
                    .ok_or_else(|| ApiError::BadRequest("Unknown or inactive addon".into()))?;
                addon_lines.push(AddonLine {
                    unit_price: addon.price,
                    quantity: i64::from(selection.quantity),
                });
                addon_intents.push(AddonIntent {
                    addon_id: addon.id,
                    variant: selection.variant.clone().unwrap_or_default(),
                    quantity: selection.quantity,
                    unit_price: addon.price,
                });
            }
        }

        let discount = match req.discount_code.as_deref() {
            Some(code) => DiscountRepository::find_active(&mut conn, event.id, code)?
                .map(|d| DiscountTerms {
                    amount_off: d.amount_off,
                    percent_bps: i64::from(d.percent_bps),
                }),
            None => None,
        };
        if req.discount_code.is_some() && discount.is_none() {
            return Err(ApiError::BadRequest("Invalid discount code".into()));
        }

        let amount = compute_order_amount(ticket_price, quantity, tax_bps, &addon_lines, discount.as_ref());
        if amount <= 0 {
            return Err(ApiError::BadRequest("Order amount must be positive".into()));
        }

        // A second checkout for the same buyer and amount inside the window
        // reuses the existing pending order instead of creating another.
        let window_start = Utc::now() - Duration::minutes(state.config.duplicate_order_window_mins);
        if let Some(existing) = PaymentRepository::find_recent_pending_duplicate(
            &mut conn,
            event.id,
            &req.email,
            amount,
            window_start,
        )? {
            info!(payment_number = %existing.payment_number, "Reusing recent pending order");
            return Ok(CreateOrderResponse {
                order_id: existing.gateway_order_id,
                payment_id: existing.id,
                payment_number: existing.payment_number,
                amount: existing.amount,
                currency: existing.currency,
                key_id: state.razorpay.credentials_for(Some(&event)).key_id,
                is_duplicate: true,
            });
        }

        let group_order_id = if req.attendees.is_empty() {
            None
        } else {
            Some(Self::create_group(&mut conn, &event, &req)?)
        };

        let payment_number = Self::payment_number();
        let creds = state.razorpay.credentials_for(Some(&event));
        let gateway_order = state
            .razorpay
            .create_order(
                &creds,
                amount,
                event.currency,
                &payment_number,
                json!({ "payment_number": payment_number, "event_id": event.id }),
            )
            .await?;

        let intent = OrderIntent {
            ticket_type_id: req.ticket_type_id,
            quantity: quantity as i32,
            addons: addon_intents,
            discount_code: req.discount_code.clone(),
            registration_id: req.registration_id,
            group_order_id,
        };

        let kind = if is_addon_only {
            PaymentKind::AddonPurchase
        } else {
            PaymentKind::Registration
        };

        // If this insert fails the buyer must not be sent to checkout: a
        // gateway order with no local payment row is unconfirmable.
        let payment = PaymentRepository::create(
            &mut conn,
            NewPayment {
                payment_number: &payment_number,
                event_id: Some(event.id),
                gateway_order_id: &gateway_order.id,
                gateway_payment_id: None,
                amount,
                currency: event.currency,
                payer_name: &req.name,
                payer_email: &req.email,
                payer_phone: req.phone.as_deref(),
                status: PaymentStatus::Pending,
                kind,
                is_orphan: false,
                metadata: json!({ "intent": intent }),
            },
        )?;

        info!(
            payment_number = %payment.payment_number,
            order_id = %payment.gateway_order_id,
            amount,
            "Created order"
        );

        Ok(CreateOrderResponse {
            order_id: payment.gateway_order_id,
            payment_id: payment.id,
            payment_number: payment.payment_number,
            amount: payment.amount,
            currency: payment.currency,
            key_id: creds.key_id,
            is_duplicate: false,
        })
    }

    /// One pending registration per attendee, linked under a group order.
    fn create_group(
        conn: &mut PgConnection,
        event: &Event,
        req: &CreateOrderRequest,
    ) -> Result<Uuid, ApiError> {
        conn.transaction::<_, ApiError, _>(|conn| {
            let order_code = Self::order_code();
            let group = GroupOrderRepository::create(
                conn,
                NewGroupOrder {
                    order_code: &order_code,
                    event_id: event.id,
                    buyer_name: &req.name,
                    buyer_email: &req.email,
                },
            )?;

            for attendee in &req.attendees {
                let number = RegistrationService::next_registration_number(conn, event)?;
                RegistrationRepository::create(
                    conn,
                    NewRegistration {
                        registration_number: &number,
                        event_id: event.id,
                        ticket_type_id: req.ticket_type_id,
                        payment_id: None,
                        group_order_id: Some(group.id),
                        attendee_name: &attendee.name,
                        attendee_email: &attendee.email,
                        attendee_phone: attendee.phone.as_deref(),
                        quantity: 1,
                        amount: 0,
                        status: RegistrationStatus::Pending,
                        needs_review: false,
                        custom_fields: json!({}),
                    },
                )?;
            }

            Ok(group.id)
        })
    }

    fn payment_number() -> String {
        format!("PAY-{}-{}", Utc::now().format("%Y%m%d"), Self::token(6))
    }

    fn order_code() -> String {
        format!("GRP-{}", Self::token(8))
    }

    fn token(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect()
    }
}
