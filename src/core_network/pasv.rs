use super::SessionEvent;
use crate::constants::PASV_ACCEPT_DEADLINE_MS;
use crate::helpers::{format_pasv_endpoint, pasv_ipv4};
use crate::reply::Reply;
use crate::session::{DataOpener, Session};
use crate::state::FtpState;
use log::{debug, info, warn};
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Messages into the pool actor.
enum PoolMsg {
    Accept {
        session_id: u64,
        events: mpsc::Sender<SessionEvent>,
        reply: oneshot::Sender<Option<(IpAddr, u16)>>,
    },
    Cancel {
        session_id: u64,
    },
    /// Internal: the accept task for this session finished.
    Consumed {
        session_id: u64,
    },
}

struct Reservation {
    slot: u16,
    acceptor: JoinHandle<()>,
}

/// Handle to the passive-mode listener pool. Cheap to clone; all
/// mutation happens inside the pool task.
#[derive(Clone)]
pub struct PasvHandle {
    tx: mpsc::UnboundedSender<PoolMsg>,
}

impl PasvHandle {
    /// Reserve a port and arm a single accept for this session. Returns
    /// the advertised `(ip, port)` or `None` when the pool is exhausted
    /// or does not answer within the deadline.
    pub async fn accept(
        &self,
        session_id: u64,
        events: mpsc::Sender<SessionEvent>,
    ) -> Option<(IpAddr, u16)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PoolMsg::Accept {
                session_id,
                events,
                reply: reply_tx,
            })
            .ok()?;
        match tokio::time::timeout(Duration::from_millis(PASV_ACCEPT_DEADLINE_MS), reply_rx).await
        {
            Ok(Ok(result)) => result,
            _ => None,
        }
    }

    /// Tear down any pending reservation for this session.
    pub fn cancel(&self, session_id: u64) {
        let _ = self.tx.send(PoolMsg::Cancel { session_id });
    }
}

/// Spawn the pool actor. `external_ip` is what PASV advertises; sockets
/// bind the wildcard address on the configured ports (a `0` entry binds
/// an ephemeral port).
pub fn spawn_pool(external_ip: IpAddr, ports: Vec<u16>) -> PasvHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let pool_tx = tx.clone();
    tokio::spawn(run_pool(external_ip, ports, rx, pool_tx));
    PasvHandle { tx }
}

async fn run_pool(
    external_ip: IpAddr,
    ports: Vec<u16>,
    mut rx: mpsc::UnboundedReceiver<PoolMsg>,
    pool_tx: mpsc::UnboundedSender<PoolMsg>,
) {
    let mut free: VecDeque<u16> = ports.into_iter().collect();
    let mut reservations: HashMap<u64, Reservation> = HashMap::new();

    while let Some(msg) = rx.recv().await {
        match msg {
            PoolMsg::Accept {
                session_id,
                events,
                reply,
            } => {
                // A second PASV from the same session replaces the first.
                if let Some(old) = reservations.remove(&session_id) {
                    old.acceptor.abort();
                    free.push_back(old.slot);
                    debug!(
                        "Replaced pending passive reservation for session {}",
                        session_id
                    );
                }

                let mut outcome = None;
                for _ in 0..free.len() {
                    let slot = match free.pop_front() {
                        Some(slot) => slot,
                        None => break,
                    };
                    match TcpListener::bind((Ipv4Addr::UNSPECIFIED, slot)).await {
                        Ok(listener) => {
                            let port = listener
                                .local_addr()
                                .map(|a| a.port())
                                .unwrap_or(slot);
                            let acceptor = tokio::spawn(accept_one(
                                listener,
                                session_id,
                                events.clone(),
                                pool_tx.clone(),
                            ));
                            reservations.insert(session_id, Reservation { slot, acceptor });
                            info!(
                                "Passive port {} reserved for session {}",
                                port, session_id
                            );
                            outcome = Some((external_ip, port));
                            break;
                        }
                        Err(e) => {
                            warn!("Could not bind passive port {}: {}", slot, e);
                            free.push_back(slot);
                        }
                    }
                }
                if outcome.is_none() {
                    warn!(
                        "Passive pool exhausted, rejecting session {}",
                        session_id
                    );
                }
                let _ = reply.send(outcome);
            }
            PoolMsg::Cancel { session_id } => {
                if let Some(res) = reservations.remove(&session_id) {
                    res.acceptor.abort();
                    free.push_back(res.slot);
                    debug!(
                        "Cancelled passive reservation for session {}",
                        session_id
                    );
                }
            }
            PoolMsg::Consumed { session_id } => {
                // A stale Consumed (the reservation was replaced in the
                // meantime) must not free the successor's slot.
                let finished = reservations
                    .get(&session_id)
                    .map(|r| r.acceptor.is_finished())
                    .unwrap_or(false);
                if finished {
                    if let Some(res) = reservations.remove(&session_id) {
                        free.push_back(res.slot);
                    }
                }
            }
        }
    }
}

/// Accept exactly one client on the reserved port, hand the socket to
/// the owning session, then report back so the port returns to the pool.
async fn accept_one(
    listener: TcpListener,
    session_id: u64,
    events: mpsc::Sender<SessionEvent>,
    pool_tx: mpsc::UnboundedSender<PoolMsg>,
) {
    match listener.accept().await {
        Ok((stream, peer)) => {
            debug!(
                "Passive data connection from {} for session {}",
                peer, session_id
            );
            if events.send(SessionEvent::DataSocket(stream)).await.is_err() {
                debug!("Session {} went away before its data socket", session_id);
            }
        }
        Err(e) => {
            warn!("Passive accept failed for session {}: {}", session_id, e);
        }
    }
    let _ = pool_tx.send(PoolMsg::Consumed { session_id });
}

/// Sets up a passive listener for the session and formats the 227 reply.
pub async fn handle_pasv_command(
    state: &FtpState,
    session: &mut Session,
    events: &mpsc::Sender<SessionEvent>,
) -> Reply {
    match state.pasv.accept(session.id, events.clone()).await {
        Some((ip, port)) => {
            session.opener = Some(DataOpener::Passive);
            session.data_socket = None;
            Reply::new(
                227,
                format!(
                    "Entering Passive Mode ({})",
                    format_pasv_endpoint(pasv_ipv4(ip), port)
                ),
            )
        }
        None => Reply::new(425, "Can't open data connection."),
    }
}

/// RFC 2428 EPSV: same reservation, different reply shape.
pub async fn handle_epsv_command(
    state: &FtpState,
    session: &mut Session,
    events: &mpsc::Sender<SessionEvent>,
) -> Reply {
    match state.pasv.accept(session.id, events.clone()).await {
        Some((_, port)) => {
            session.opener = Some(DataOpener::Passive);
            session.data_socket = None;
            Reply::new(
                229,
                format!("Entering Extended Passive Mode (|||{}|)", port),
            )
        }
        None => Reply::new(425, "Can't open data connection."),
    }
}
