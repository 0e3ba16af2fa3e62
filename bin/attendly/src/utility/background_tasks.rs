use attendly_core::services::{NotificationService, ReconciliationService};
use attendly_core::AppState;
use attendly_primitives::models::dtos::reconcile_dto::ReconcileRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::log::info;
use tracing::{error, warn};

const OUTBOX_DRAIN_INTERVAL: Duration = Duration::from_secs(30);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const OUTBOX_BATCH_SIZE: i64 = 50;

pub fn spawn_background_tasks(state: Arc<AppState>) {
    let state_clone = state.clone();
    tokio::spawn(async move {
        info!("Starting notification outbox drain task");
        drain_outbox(state_clone).await;
    });

    let state_clone = state.clone();
    tokio::spawn(async move {
        info!("Starting hourly reconciliation sweep task");
        periodic_sweep(state_clone).await;
    });

    info!("Background tasks spawned");
}

async fn drain_outbox(state: Arc<AppState>) {
    let mut interval = interval(OUTBOX_DRAIN_INTERVAL);
    interval.tick().await;

    loop {
        interval.tick().await;

        if let Err(e) = NotificationService::drain_once(&state, OUTBOX_BATCH_SIZE).await {
            error!("Outbox drain failed: {}", e);
        }
    }
}

/// Hourly dry-run sweep over the last day. Findings surface through logs and
/// payment alerts; repairs stay behind the admin endpoint's fix flag.
async fn periodic_sweep(state: Arc<AppState>) {
    let mut interval = interval(SWEEP_INTERVAL);
    interval.tick().await;

    loop {
        interval.tick().await;

        let req = ReconcileRequest { fix: false, hours: 24 };
        match ReconciliationService::run(&state, &req) {
            Ok(report) => {
                if report.orphaned + report.duplicates + report.stale > 0 {
                    warn!(
                        orphaned = report.orphaned,
                        duplicates = report.duplicates,
                        stale = report.stale,
                        "Periodic sweep found inconsistencies"
                    );
                }
            }
            Err(e) => error!("Periodic sweep failed: {}", e),
        }
    }
}
