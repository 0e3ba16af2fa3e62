use crate::handlers::{
    create_order::__path_create_order, health::__path_health_check,
    razorpay_webhook::__path_razorpay_webhook, reconcile::__path_reconcile,
    verify_payment::__path_verify_payment,
};
use attendly_primitives::models::dtos::health_dto::HealthStatus;
use attendly_primitives::models::dtos::order_dto::{CreateOrderRequest, CreateOrderResponse};
use attendly_primitives::models::dtos::reconcile_dto::{ReconcileRequest, ReconcileResponse};
use attendly_primitives::models::dtos::verify_dto::{VerifyPaymentRequest, VerifyPaymentResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        create_order, verify_payment, razorpay_webhook, reconcile, health_check
    ),
    components(schemas(
        CreateOrderRequest, CreateOrderResponse,
        VerifyPaymentRequest, VerifyPaymentResponse,
        ReconcileRequest, ReconcileResponse,
        HealthStatus
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Orders", description = "Checkout order creation"),
        (name = "Payments", description = "Payment verification"),
        (name = "Webhooks", description = "Gateway event delivery"),
        (name = "Admin", description = "Reconciliation and operations"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "adminKey".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-key"))),
            );
        }
    }
}
