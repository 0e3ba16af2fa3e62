use attendly_core::app_state::AppState;
use attendly_primitives::models::app_state::{AdminInfo, AppConfig, RazorpayInfo};
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::PrometheusMetricLayer;
use axum_test::TestServer;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use secrecy::SecretString;
use std::sync::{Arc, OnceLock};

pub mod fixtures;

pub const TEST_KEY_ID: &str = "rzp_test_key";
pub const TEST_KEY_SECRET: &str = "test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "test_webhook_secret";
pub const TEST_ADMIN_KEY: &str = "test_admin_key";

/// Build the full application against the test database and a mock gateway.
/// Returns `None` when no test database is configured, so suites stay green
/// on machines without Postgres.
pub fn try_server(gateway_url: &str) -> Option<(Arc<AppState>, TestServer)> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return None;
    };

    std::env::set_var("APP_ENV", "test");

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = match Pool::builder().max_size(5).build(manager) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("skipping: test database unreachable: {}", e);
            return None;
        }
    };

    {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                eprintln!("skipping: test database unreachable: {}", e);
                return None;
            }
        };
        run_test_migrations(&mut conn);
        fixtures::cleanup(&mut conn);
    }

    let config = AppConfig {
        app_url: "http://localhost:8080".into(),
        razorpay_details: RazorpayInfo {
            key_id: TEST_KEY_ID.into(),
            key_secret: SecretString::from(TEST_KEY_SECRET),
            webhook_secret: SecretString::from(TEST_WEBHOOK_SECRET),
            api_url: gateway_url.to_string(),
        },
        admin_details: AdminInfo {
            admin_api_key: SecretString::from(TEST_ADMIN_KEY),
        },
        duplicate_order_window_mins: 5,
    };

    let state = AppState::new(pool, config).expect("test state");

    let (metric_layer, metric_handle) = metrics_pair();
    let router = attendly_api::app::create_router(state.clone(), metric_layer, metric_handle);
    let server = TestServer::new(router).expect("test server");

    Some((state, server))
}

// The prometheus recorder is process-global; build the pair once per test
// binary and clone it for every server.
fn metrics_pair() -> (PrometheusMetricLayer<'static>, PrometheusHandle) {
    static METRICS: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();
    METRICS.get_or_init(PrometheusMetricLayer::pair).clone()
}

pub fn run_test_migrations(conn: &mut PgConnection) {
    use diesel_migrations::MigrationHarness;

    conn.run_pending_migrations(attendly::utility::db_pool::MIGRATIONS)
        .expect("Failed to run migrations");
}

pub fn get_conn(
    state: &Arc<AppState>,
) -> diesel::r2d2::PooledConnection<ConnectionManager<PgConnection>> {
    state.db.get().expect("test db connection")
}
