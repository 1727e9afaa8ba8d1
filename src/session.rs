use crate::core_fs::{FsReader, FsWriter};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

/// TYPE setting. Only ASCII and Image survive the RFC in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

impl TransferType {
    pub fn as_char(&self) -> char {
        match self {
            TransferType::Ascii => 'A',
            TransferType::Image => 'I',
        }
    }
}

/// Which command armed the pending transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Retr,
    Stor,
    Stou,
    List,
}

impl TransferMode {
    pub fn is_upload(&self) -> bool {
        matches!(self, TransferMode::Stor | TransferMode::Stou)
    }
}

/// Who opens the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOpener {
    /// A passive listener is armed in the pool and must be consumed once.
    Passive,
    /// Dial the client at this endpoint when the transfer starts.
    Active(SocketAddr),
}

/// The byte source or sink a transfer command handed over.
pub enum DataChannel {
    /// Server-to-client bytes (RETR, LIST, NLST, MLSD).
    Outbound(FsReader),
    /// Client-to-server bytes (STOR, APPE, STOU).
    Inbound(FsWriter),
}

/// A transfer that has been armed but whose pump has not started yet.
pub struct PendingTransfer {
    pub mode: TransferMode,
    pub channel: DataChannel,
    pub filename: String,
    /// The active-mode dialer has been spawned for this transfer.
    pub dialing: bool,
}

/// A running data connection, seen from the control side.
pub struct ActiveTransfer {
    pub mode: TransferMode,
    pub filename: String,
    pub abort: Option<oneshot::Sender<()>>,
}

/// Per-control-connection state. Owned and mutated exclusively by the
/// connection's own task; everything else talks to it through events.
pub struct Session {
    pub id: u64,
    pub remote: SocketAddr,
    pub created_at: DateTime<Utc>,

    pub username: Option<String>,
    pub password: Option<String>,
    pub logged_in: bool,
    pub guest: bool,

    pub current_dir: String,
    pub transfer_type: TransferType,

    pub opener: Option<DataOpener>,
    pub pending: Option<PendingTransfer>,
    /// Passive socket that connected before the transfer was armed.
    pub data_socket: Option<TcpStream>,
    pub data_conn: Option<ActiveTransfer>,
    pub restart_marker: u64,

    /// A preliminary reply is outstanding; only ABOR/STAT/QUIT may run.
    pub interrupted: bool,
    /// QUIT received; close the control connection once idle.
    pub poisoned: bool,

    pub uploaded_bytes: u64,
    pub downloaded_bytes: u64,

    pub rename_from: Option<String>,
}

impl Session {
    pub fn new(id: u64, remote: SocketAddr, guest: bool) -> Self {
        Self {
            id,
            remote,
            created_at: Utc::now(),
            username: None,
            password: None,
            logged_in: false,
            guest,
            current_dir: String::from("/"),
            transfer_type: TransferType::Image,
            opener: None,
            pending: None,
            data_socket: None,
            data_conn: None,
            restart_marker: 0,
            interrupted: false,
            poisoned: false,
            uploaded_bytes: 0,
            downloaded_bytes: 0,
            rename_from: None,
        }
    }

    /// Completes a successful authentication.
    pub fn login(&mut self, password: String, home: String) {
        self.password = Some(password);
        self.logged_in = true;
        self.current_dir = home;
    }

    /// One-shot REST marker: read it and clear it.
    pub fn take_restart_marker(&mut self) -> u64 {
        std::mem::take(&mut self.restart_marker)
    }

    /// Drop every data-transfer field. Called when a transfer concludes
    /// or the connection is torn down.
    pub fn clear_data_state(&mut self) {
        self.opener = None;
        self.pending = None;
        self.data_socket = None;
        self.data_conn = None;
    }

    /// Nothing armed, nothing in flight.
    pub fn transfer_idle(&self) -> bool {
        self.pending.is_none() && self.data_conn.is_none()
    }
}
