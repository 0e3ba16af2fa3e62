use crate::utility::shutdown::shutdown_signal;
use axum::Router;
use eyre::{Report, WrapErr};
use std::net::{IpAddr, SocketAddr};

pub async fn serve(router: Router) -> Result<(), Report> {
    let host: IpAddr = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".into())
        .parse()
        .wrap_err("HOST is not a valid IP address")?;
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .wrap_err("PORT is not a valid port number")?;
    let addr = SocketAddr::new(host, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Could not bind {addr}"))?;

    tracing::info!("Attendly listening on http://{}", addr);
    tracing::info!("API docs at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
