pub mod active;
pub mod control;
pub mod data;
pub mod network;
pub mod pasv;
pub mod port;

#[cfg(test)]
mod test_session_flow;

use tokio::net::TcpStream;

/// How a data connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    Failed,
    Aborted,
}

/// Everything that can land in a control connection's inbox besides
/// bytes on the socket itself. The session is only ever mutated by its
/// own task, so all outside actors talk to it through these.
#[derive(Debug)]
pub enum SessionEvent {
    /// A data socket is ready: a passive accept or a completed dial.
    DataSocket(TcpStream),
    /// Active-mode dial to the client's endpoint failed.
    DialFailed(std::io::Error),
    /// The data connection finished and reports its fate.
    TransferDone {
        outcome: TransferOutcome,
        bytes: u64,
    },
}
