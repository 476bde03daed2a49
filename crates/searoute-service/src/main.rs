//! Sea-route HTTP microservice.
//!
//! Configuration comes from the environment; see [`ServiceConfig`] and
//! [`LoggingConfig`]. The water grid is loaded in the background so the
//! liveness probe answers immediately and readiness flips once it is in.

use std::net::SocketAddr;

use tracing::{error, info, warn};

use searoute_service::{app, init_logging, AppState, LoggingConfig, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env());

    let config = ServiceConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    info!(
        mask = %config.mask_location,
        port = config.port,
        cost_model = %config.router.cost_model,
        simplify = %config.router.simplify,
        max_snap_radius = config.router.max_snap_radius,
        "starting sea-route service"
    );

    let state = AppState::open(&config.mask_location, config.router.clone());

    let loader = state.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.grid().await {
            warn!(error = %e, "initial water grid load failed; routes fall back to straight lines");
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
