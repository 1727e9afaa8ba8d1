use super::{SessionEvent, TransferOutcome};
use crate::constants::DATA_BUFFER_SIZE;
use crate::registry::Registry;
use crate::session::{DataChannel, TransferMode};
use log::{debug, warn};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

/// Runs one data connection to completion and reports back.
///
/// The task is only spawned after the preliminary 150 has been written
/// and flushed on the control connection, so the final reply can never
/// overtake it. The abort receiver fires on ABOR (or when the control
/// task dies); either way the socket is dropped and `Aborted` reported.
pub fn spawn_transfer(
    session_id: u64,
    socket: TcpStream,
    channel: DataChannel,
    mode: TransferMode,
    abort_rx: oneshot::Receiver<()>,
    events: mpsc::Sender<SessionEvent>,
    registry: Arc<Registry>,
) {
    tokio::spawn(async move {
        let mut socket = socket;
        let mut abort_rx = abort_rx;
        let mut bytes: u64 = 0;

        let outcome = match channel {
            DataChannel::Outbound(mut source) => {
                pump_out(&mut source, &mut socket, &mut abort_rx, &mut bytes).await
            }
            DataChannel::Inbound(mut sink) => {
                pump_in(&mut socket, &mut sink, &mut abort_rx, &mut bytes).await
            }
        };

        debug!(
            "Session {} transfer finished: {:?}, {} bytes",
            session_id, outcome, bytes
        );

        if mode.is_upload() {
            registry.add_uploaded(bytes);
        } else {
            registry.add_downloaded(bytes);
        }

        if events
            .send(SessionEvent::TransferDone { outcome, bytes })
            .await
            .is_err()
        {
            debug!("Session {} closed before its transfer report", session_id);
        }
    });
}

/// Server-to-client pump (RETR and the listing commands). Backpressure
/// comes from awaiting the socket write before the next read.
async fn pump_out(
    source: &mut crate::core_fs::FsReader,
    socket: &mut TcpStream,
    abort_rx: &mut oneshot::Receiver<()>,
    bytes: &mut u64,
) -> TransferOutcome {
    let mut buf = vec![0u8; DATA_BUFFER_SIZE];
    loop {
        let read = tokio::select! {
            _ = &mut *abort_rx => return TransferOutcome::Aborted,
            r = source.read(&mut buf) => r,
        };
        let n = match read {
            Ok(0) => {
                if let Err(e) = socket.shutdown().await {
                    debug!("Data socket shutdown after send: {}", e);
                }
                return TransferOutcome::Success;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Error reading transfer source: {}", e);
                return TransferOutcome::Failed;
            }
        };
        let write = tokio::select! {
            _ = &mut *abort_rx => return TransferOutcome::Aborted,
            w = socket.write_all(&buf[..n]) => w,
        };
        if let Err(e) = write {
            warn!("Error writing to data socket: {}", e);
            return TransferOutcome::Failed;
        }
        *bytes += n as u64;
    }
}

/// Client-to-server pump (STOR/APPE/STOU). The peer closing the socket
/// ends the upload; anything the sink refuses fails it.
async fn pump_in(
    socket: &mut TcpStream,
    sink: &mut crate::core_fs::FsWriter,
    abort_rx: &mut oneshot::Receiver<()>,
    bytes: &mut u64,
) -> TransferOutcome {
    let mut buf = vec![0u8; DATA_BUFFER_SIZE];
    loop {
        let read = tokio::select! {
            _ = &mut *abort_rx => return TransferOutcome::Aborted,
            r = socket.read(&mut buf) => r,
        };
        let n = match read {
            Ok(0) => {
                if let Err(e) = sink.shutdown().await {
                    warn!("Error finishing upload sink: {}", e);
                    return TransferOutcome::Failed;
                }
                return TransferOutcome::Success;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Error reading from data socket: {}", e);
                return TransferOutcome::Failed;
            }
        };
        let write = tokio::select! {
            _ = &mut *abort_rx => return TransferOutcome::Aborted,
            w = sink.write_all(&buf[..n]) => w,
        };
        if let Err(e) = write {
            warn!("Error writing upload to sink: {}", e);
            return TransferOutcome::Failed;
        }
        *bytes += n as u64;
    }
}
