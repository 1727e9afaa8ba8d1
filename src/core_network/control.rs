use super::{active, data, SessionEvent, TransferOutcome};
use crate::constants::MAX_LINE_LENGTH;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::dispatch::execute_command;
use crate::helpers::quote_path;
use crate::reply::Reply;
use crate::session::{ActiveTransfer, DataOpener, Session, TransferMode};
use crate::state::FtpState;
use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

/// Drives one control connection from accept to close.
///
/// The task serializes four event sources: control-socket bytes, its own
/// command execution, data-connection reports, and passive-pool socket
/// arrivals. The session is owned here and mutated nowhere else.
pub async fn run(stream: TcpStream, state: Arc<FtpState>) -> Result<()> {
    let remote = stream.peer_addr()?;
    let (mut reader, mut writer) = stream.into_split();

    if state.suspended() {
        let reply = Reply::new(421, "Service not available, closing control connection.");
        writer.write_all(reply.serialize().as_bytes()).await?;
        writer.flush().await?;
        info!("Refused connection from {} while suspended", remote);
        return Ok(());
    }

    let id = state.registry.register(remote);
    let mut session = Session::new(id, remote, state.config.server.guest);
    info!("Session {} connected from {}", id, remote);

    let (events_tx, mut events_rx) = mpsc::channel::<SessionEvent>(16);

    let result = drive(
        &state,
        &mut session,
        &events_tx,
        &mut events_rx,
        &mut reader,
        &mut writer,
    )
    .await;

    // Closing drops the abort sender of any in-flight pump, which makes
    // the pump abort, and frees any pending passive reservation.
    state.pasv.cancel(id);
    state.registry.unregister(id);
    info!(
        "Session {} from {} closed ({} bytes up, {} bytes down, connected {})",
        id,
        session.remote,
        session.uploaded_bytes,
        session.downloaded_bytes,
        session.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    result
}

async fn drive(
    state: &Arc<FtpState>,
    session: &mut Session,
    events_tx: &mpsc::Sender<SessionEvent>,
    events_rx: &mut mpsc::Receiver<SessionEvent>,
    reader: &mut tokio::net::tcp::OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
) -> Result<()> {
    let welcome = Reply::new(
        220,
        format!("{} FTP server ready.", state.config.server.hostname),
    );
    write_reply_chain(writer, &welcome).await?;

    let timeout = Duration::from_secs(state.config.timeout_secs());
    let mut deadline = Instant::now() + timeout;
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        // Run every buffered line the interrupt gate lets through. Each
        // reply is written and flushed before the next line is taken, so
        // one command is in flight at a time.
        loop {
            if session.poisoned && session.transfer_idle() {
                return Ok(());
            }
            let Some(line) = take_allowed_line(&mut buffer, session.interrupted) else {
                break;
            };
            deadline = Instant::now() + timeout;
            let cmd = Command::parse(&line);
            debug!("Session {} command: {}", session.id, cmd.raw_verb);
            let reply = execute_command(state, session, events_tx, &cmd).await;
            let wrote = write_reply_chain(writer, &reply).await?;
            if wrote {
                if reply_chain_has_preliminary(&reply) {
                    session.interrupted = true;
                }
                if let Some(verb) = cmd.verb {
                    if verb.is_interrupt() && verb.clears_interrupt() && session.interrupted {
                        session.interrupted = false;
                    }
                }
            }
            maybe_start_transfer(state, session, events_tx);
        }

        if session.poisoned && session.transfer_idle() {
            return Ok(());
        }

        tokio::select! {
            read = reader.read(&mut chunk) => {
                let n = read?;
                if n == 0 {
                    debug!("Session {} peer closed the control connection", session.id);
                    return Ok(());
                }
                buffer.extend_from_slice(&chunk[..n]);
                if line_overflows(&buffer) {
                    warn!("Session {} exceeded the line cap", session.id);
                    let reply = Reply::new(500, "Line too long.");
                    write_reply_chain(writer, &reply).await?;
                    return Ok(());
                }
            }
            event = events_rx.recv() => {
                // recv() cannot yield None while we hold a sender.
                if let Some(event) = event {
                    deadline = Instant::now() + timeout;
                    handle_event(state, session, events_tx, writer, event).await?;
                }
            }
            _ = sleep_until(deadline) => {
                warn!("Session {} idle timeout", session.id);
                let reply = Reply::new(421, "Timeout.");
                let _ = write_reply_chain(writer, &reply).await;
                return Ok(());
            }
        }
    }
}

/// Extracts the first complete line if the interrupt gate allows it.
/// While a transfer is outstanding only ABOR/STAT/QUIT come through;
/// everything else stays buffered for later.
fn take_allowed_line(buffer: &mut Vec<u8>, interrupted: bool) -> Option<String> {
    let idx = buffer.iter().position(|&b| b == b'\n')?;
    let mut end = idx;
    if end > 0 && buffer[end - 1] == b'\r' {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buffer[..end]).into_owned();
    if interrupted {
        let cmd = Command::parse(&line);
        if !cmd.verb.map(|v| v.is_interrupt()).unwrap_or(false) {
            return None;
        }
    }
    buffer.drain(..=idx);
    Some(line)
}

/// A line (terminated or not) longer than the cap means the client is
/// misbehaving; the connection is closed after a 500.
fn line_overflows(buffer: &[u8]) -> bool {
    match buffer.iter().position(|&b| b == b'\n') {
        Some(idx) => idx > MAX_LINE_LENGTH,
        None => buffer.len() > MAX_LINE_LENGTH,
    }
}

/// Writes a reply chain to the socket and flushes it into the OS buffer.
/// The flush is the ordering hand-off: nothing that must follow this
/// reply (a data pump, the next command) starts before it returns.
/// Returns whether anything was actually written.
async fn write_reply_chain(writer: &mut OwnedWriteHalf, reply: &Reply) -> Result<bool> {
    if reply.noop {
        return Ok(false);
    }
    let mut current = Some(reply);
    while let Some(r) = current {
        writer.write_all(r.serialize().as_bytes()).await?;
        current = r.next.as_deref();
    }
    writer.flush().await?;
    Ok(true)
}

fn reply_chain_has_preliminary(reply: &Reply) -> bool {
    let mut current = Some(reply);
    while let Some(r) = current {
        if r.is_preliminary() {
            return true;
        }
        current = r.next.as_deref();
    }
    false
}

/// Couples an armed transfer with its data socket. For active mode the
/// dial starts here, strictly after the preliminary reply was flushed;
/// for passive mode the socket may already be parked on the session.
fn maybe_start_transfer(
    state: &Arc<FtpState>,
    session: &mut Session,
    events_tx: &mpsc::Sender<SessionEvent>,
) {
    if session.pending.is_none() {
        return;
    }
    if session.data_socket.is_some() {
        start_pump(state, session, events_tx);
        return;
    }
    if let Some(DataOpener::Active(addr)) = session.opener {
        let pending = session.pending.as_mut().unwrap();
        if !pending.dialing {
            pending.dialing = true;
            active::spawn_dial(session.id, addr, events_tx.clone());
        }
    }
}

fn start_pump(
    state: &Arc<FtpState>,
    session: &mut Session,
    events_tx: &mpsc::Sender<SessionEvent>,
) {
    let pending = match session.pending.take() {
        Some(pending) => pending,
        None => return,
    };
    let socket = match session.data_socket.take() {
        Some(socket) => socket,
        None => {
            session.pending = Some(pending);
            return;
        }
    };
    let (abort_tx, abort_rx) = oneshot::channel();
    session.opener = None;
    session.data_conn = Some(ActiveTransfer {
        mode: pending.mode,
        filename: pending.filename.clone(),
        abort: Some(abort_tx),
    });
    data::spawn_transfer(
        session.id,
        socket,
        pending.channel,
        pending.mode,
        abort_rx,
        events_tx.clone(),
        Arc::clone(&state.registry),
    );
}

async fn handle_event(
    state: &Arc<FtpState>,
    session: &mut Session,
    events_tx: &mpsc::Sender<SessionEvent>,
    writer: &mut OwnedWriteHalf,
    event: SessionEvent,
) -> Result<()> {
    match event {
        SessionEvent::DataSocket(stream) => {
            if session.pending.is_some() {
                session.data_socket = Some(stream);
                start_pump(state, session, events_tx);
            } else if matches!(session.opener, Some(DataOpener::Passive)) {
                // Client connected right after PASV; park the socket
                // until a transfer command arms a channel.
                session.data_socket = Some(stream);
            } else {
                debug!(
                    "Session {} dropping data socket with no transfer armed",
                    session.id
                );
            }
        }
        SessionEvent::DialFailed(e) => {
            warn!("Session {} active dial failed: {}", session.id, e);
            session.clear_data_state();
            let reply = Reply::new(426, "Connection closed, transfer failed.");
            write_reply_chain(writer, &reply).await?;
            session.interrupted = false;
        }
        SessionEvent::TransferDone { outcome, bytes } => {
            let (mode, filename) = match session.data_conn.take() {
                Some(active) => (active.mode, active.filename),
                None => (TransferMode::List, String::new()),
            };
            if mode.is_upload() {
                session.uploaded_bytes += bytes;
            } else {
                session.downloaded_bytes += bytes;
            }
            // Data fields are gone before the outcome reply goes out.
            session.clear_data_state();
            let reply = match outcome {
                TransferOutcome::Success => Reply::new(
                    226,
                    format!("Transfer completed for \"{}\".", quote_path(&filename)),
                ),
                TransferOutcome::Failed => {
                    Reply::new(426, "Connection closed, transfer failed.")
                }
                TransferOutcome::Aborted => {
                    Reply::new(426, "Connection closed, transfer aborted.")
                        .followed_by(Reply::new(226, "Abort command successful."))
                }
            };
            write_reply_chain(writer, &reply).await?;
            session.interrupted = false;
        }
    }
    Ok(())
}
