use super::control;
use crate::state::FtpState;
use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Binds the control listener at the configured endpoint.
pub async fn bind(state: &FtpState) -> Result<TcpListener> {
    let endpoint = (
        state.config.server.hostname.as_str(),
        state.config.server.listen_port,
    );
    let listener = TcpListener::bind(endpoint)
        .await
        .with_context(|| {
            format!(
                "Failed to bind control listener on {}:{}",
                endpoint.0, endpoint.1
            )
        })?;
    info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept loop: one task per client. A connection's failure is logged
/// and dies with that connection; the listener keeps going.
pub async fn serve(listener: TcpListener, state: Arc<FtpState>) -> Result<()> {
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("New connection from {}", addr);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = control::run(socket, state).await {
                error!("Connection error for {}: {:#}", addr, e);
            }
        });
    }
}

pub async fn start_server(state: Arc<FtpState>) -> Result<()> {
    let listener = bind(&state).await?;
    serve(listener, state).await
}
