use super::SessionEvent;
use log::{debug, warn};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Active-mode opener: dial the client's advertised endpoint and hand
/// the socket (or the failure) to the owning control connection.
pub fn spawn_dial(session_id: u64, addr: SocketAddr, events: mpsc::Sender<SessionEvent>) {
    tokio::spawn(async move {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                debug!("Session {} data dial to {} connected", session_id, addr);
                if events.send(SessionEvent::DataSocket(stream)).await.is_err() {
                    debug!(
                        "Session {} went away before its data dial finished",
                        session_id
                    );
                }
            }
            Err(e) => {
                warn!("Session {} data dial to {} failed: {}", session_id, addr, e);
                let _ = events.send(SessionEvent::DialFailed(e)).await;
            }
        }
    });
}
