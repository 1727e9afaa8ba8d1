use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::{DataChannel, Session, TransferMode};
use crate::state::FtpState;
use log::info;

use super::utils::arm_transfer;

/// Handles the RETR (Retrieve) FTP command.
///
/// Opens the file at the session's REST marker, threads it through the
/// active filter chain, and arms the transfer. The marker is one-shot:
/// it is consumed here whether or not a REST preceded this command.
pub async fn handle_retr_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }

    let path = resolve_virtual(&session.current_dir, arg);
    let offset = session.take_restart_marker();
    let reader = match state.fs.open_read(&path, offset).await {
        Ok(reader) => reader,
        Err(e) => return e.to_reply(),
    };
    let reader = state.filters.apply_read(session, reader);
    info!(
        "Session {} retrieving {} from offset {}",
        session.id, path, offset
    );
    arm_transfer(
        session,
        TransferMode::Retr,
        DataChannel::Outbound(reader),
        arg.to_string(),
    )
}
