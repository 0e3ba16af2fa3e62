use crate::config::swagger_config::ApiDoc;
use crate::handlers::{
    create_order::create_order, health::health_check, razorpay_webhook::razorpay_webhook,
    reconcile::reconcile, verify_payment::verify_payment,
};
use attendly_core::{AppState, SecurityConfig};
use axum::routing::{get, post};
use axum::{middleware, Router};
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn create_router(
    state: Arc<AppState>,
    metric_layer: PrometheusMetricLayer<'static>,
    metric_handle: PrometheusHandle,
) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .finish()
            .expect("governor configuration is static"),
    );

    let public_router = create_public_routers();
    let admin_router = create_admin_routers(&state);

    let mut router = Router::new()
        .merge(public_router)
        .merge(admin_router)
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http()),
        )
        .layer(metric_layer);

    // rate limiting breaks key extraction under the test harness
    if std::env::var("APP_ENV").unwrap_or_default() != "test" {
        router = router.layer(GovernorLayer::new(governor_conf));
    }

    router.with_state(state)
}

fn create_admin_routers(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/reconcile", post(reconcile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            SecurityConfig::admin_middleware,
        ))
}

fn create_public_routers() -> Router<Arc<AppState>> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/orders", post(create_order))
        .route("/api/payments/verify", post(verify_payment))
        .route("/api/webhooks/razorpay", post(razorpay_webhook))
        .route("/api/health", get(health_check))
}
