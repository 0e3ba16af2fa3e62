use crate::app_state::AppState;
use crate::repositories::{AlertRepository, EventRepository, PaymentRepository, RegistrationRepository};
use crate::services::registration_service::RegistrationService;
use attendly_primitives::error::ApiError;
use attendly_primitives::models::dtos::reconcile_dto::{
    ReconcileFinding, ReconcileRequest, ReconcileResponse,
};
use attendly_primitives::models::entities::enum_types::RegistrationStatus;
use attendly_primitives::models::entities::payment::Payment;
use attendly_primitives::models::entities::payment_alert::NewPaymentAlert;
use attendly_primitives::models::entities::registration::NewRegistration;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

/// Two payments from the same buyer for the same amount inside this window
/// look like an accidental double charge.
pub const DUPLICATE_WINDOW_MINS: i64 = 5;

/// A pending payment older than this either failed silently at the gateway
/// or its confirmation never arrived.
pub const STALE_PENDING_MINS: i64 = 30;

/// The fields duplicate detection compares on.
#[derive(Debug, Clone)]
pub struct PaymentDigest {
    pub id: Uuid,
    pub payment_number: String,
    pub event_id: Option<Uuid>,
    pub payer_email: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentDigest {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id,
            payment_number: p.payment_number.clone(),
            event_id: p.event_id,
            payer_email: p.payer_email.clone(),
            amount: p.amount,
            created_at: p.created_at,
        }
    }
}

/// Pair pending and completed payments that share (event, payer, amount)
/// within the duplicate window. Input must be sorted by `created_at`
/// ascending; each later payment pairs with the closest earlier match only,
/// so a triple produces two findings, not three.
pub fn find_duplicate_pairs(digests: &[PaymentDigest]) -> Vec<(PaymentDigest, PaymentDigest)> {
    let window = Duration::minutes(DUPLICATE_WINDOW_MINS);
    let mut pairs = Vec::new();

    for (i, later) in digests.iter().enumerate() {
        let earlier = digests[..i]
            .iter()
            .rev()
            .find(|earlier| {
                earlier.event_id == later.event_id
                    && earlier.payer_email == later.payer_email
                    && earlier.amount == later.amount
                    && later.created_at - earlier.created_at <= window
            });

        if let Some(earlier) = earlier {
            pairs.push((earlier.clone(), later.clone()));
        }
    }

    pairs
}

pub struct ReconciliationService;

impl ReconciliationService {
    /// Sweep the window for payments that drifted out of shape: completed
    /// without registrations, suspiciously duplicated, or stuck pending.
    /// Fix mode creates flagged pending registrations for orphans; payment
    /// status itself is never touched here.
    pub fn run(state: &AppState, req: &ReconcileRequest) -> Result<ReconcileResponse, ApiError> {
        let mut conn = state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let now = Utc::now();
        let since = now - Duration::hours(req.hours);
        let mut details = Vec::new();
        let mut fixed = 0usize;

        let orphaned = PaymentRepository::find_completed_without_registrations(&mut conn, since)?;
        for payment in &orphaned {
            let mut note = None;

            if req.fix {
                match Self::create_review_registration(&mut conn, payment) {
                    Ok(number) => {
                        fixed += 1;
                        note = Some(format!("created registration {}", number));
                    }
                    Err(e) => {
                        warn!(payment_number = %payment.payment_number, "Could not repair orphan: {}", e);
                        note = Some(format!("unfixable: {}", e));
                    }
                }
            }

            details.push(Self::finding("orphaned", payment, None, note));
        }

        let candidates = PaymentRepository::find_duplicate_candidates(&mut conn, since)?;
        let digests: Vec<PaymentDigest> = candidates.iter().map(PaymentDigest::from).collect();
        let pairs = find_duplicate_pairs(&digests);
        for (earlier, later) in &pairs {
            details.push(ReconcileFinding {
                finding: "duplicate".into(),
                payment_id: later.id,
                payment_number: later.payment_number.clone(),
                related_payment_id: Some(earlier.id),
                amount: later.amount,
                payer_email: later.payer_email.clone(),
                created_at: later.created_at,
                note: Some(format!("possible duplicate of {}", earlier.payment_number)),
            });

            AlertRepository::record(
                &mut conn,
                NewPaymentAlert {
                    alert_type: "duplicate_payment",
                    message: "Two payments from the same buyer within the window",
                    payment_id: Some(later.id),
                    event_id: later.event_id,
                    details: json!({
                        "earlier": earlier.payment_number,
                        "later": later.payment_number,
                        "amount": later.amount,
                    }),
                },
            );
        }

        let stale_cutoff = now - Duration::minutes(STALE_PENDING_MINS);
        let stale = PaymentRepository::find_stale_pending(&mut conn, stale_cutoff, since)?;
        for payment in &stale {
            details.push(Self::finding(
                "stale_pending",
                payment,
                None,
                Some("pending past the confirmation window".into()),
            ));
        }

        info!(
            orphaned = orphaned.len(),
            duplicates = pairs.len(),
            stale = stale.len(),
            fixed,
            fix = req.fix,
            "Reconciliation sweep complete"
        );

        Ok(ReconcileResponse {
            orphaned: orphaned.len(),
            duplicates: pairs.len(),
            stale: stale.len(),
            fixed,
            details,
        })
    }

    /// The repair is deliberately conservative: a pending registration with
    /// the review flag, not a confirmed one, so a human signs off before the
    /// attendee record goes live.
    fn create_review_registration(
        conn: &mut PgConnection,
        payment: &Payment,
    ) -> Result<String, ApiError> {
        let event_id = payment
            .event_id
            .ok_or_else(|| ApiError::Payment("orphan payment has no event".into()))?;
        let event = EventRepository::find_by_id(conn, event_id)?;

        let number = match event.as_ref() {
            Some(event) => RegistrationService::next_registration_number(conn, event)?,
            None => RegistrationService::default_number(),
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
                status: RegistrationStatus::Pending,
                needs_review: true,
                custom_fields: json!({ "reconciled": true }),
            },
        )?;

        Ok(number)
    }

    fn finding(
        kind: &str,
        payment: &Payment,
        related: Option<Uuid>,
        note: Option<String>,
    ) -> ReconcileFinding {
        ReconcileFinding {
            finding: kind.into(),
            payment_id: payment.id,
            payment_number: payment.payment_number.clone(),
            related_payment_id: related,
            amount: payment.amount,
            payer_email: payment.payer_email.clone(),
            created_at: payment.created_at,
            note,
        }
    }
}
