use std::env;
use std::io::{stdout, IsTerminal};
use tracing_subscriber::EnvFilter;

/// ANSI output on a terminal, JSON lines otherwise so log shippers get
/// structured records.
pub fn setup_logging() {
    let default_filter =
        env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info,hyper=warn".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if IsTerminal::is_terminal(&stdout()) {
        builder.with_ansi(true).init();
    } else {
        builder.json().with_ansi(false).init();
    }

    tracing::info!(filter = %default_filter, "Logging initialized");
}
