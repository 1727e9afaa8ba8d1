use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::{DataChannel, Session, TransferMode};
use crate::state::FtpState;
use log::info;

use super::utils::{arm_transfer, filter_veto_reply};

/// Handles the STOR (Store File) FTP command.
pub async fn handle_stor_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    store(state, session, arg, false).await
}

/// Handles APPE. Appending needs byte-exact positioning, so it is
/// refused while a length-changing filter is active.
pub async fn handle_appe_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if state.filters.modifies_length(session) {
        return filter_veto_reply("APPE", session);
    }
    store(state, session, arg, true).await
}

async fn store(state: &FtpState, session: &mut Session, arg: &str, append: bool) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    let writer = match state.fs.open_write(&path, append).await {
        Ok(writer) => writer,
        Err(e) => return e.to_reply(),
    };
    let writer = state.filters.apply_write(session, writer);
    info!(
        "Session {} storing {} (append: {})",
        session.id, path, append
    );
    arm_transfer(
        session,
        TransferMode::Stor,
        DataChannel::Inbound(writer),
        arg.to_string(),
    )
}

/// Handles STOU: the filesystem picks a name not yet present in the
/// current directory, and the replies carry that name.
pub async fn handle_stou_command(state: &FtpState, session: &mut Session) -> Reply {
    let parent = session.current_dir.clone();
    let (writer, name) = match state.fs.create_unique(&parent).await {
        Ok(created) => created,
        Err(e) => return e.to_reply(),
    };
    let writer = state.filters.apply_write(session, writer);
    info!(
        "Session {} storing unique {} under {}",
        session.id, name, parent
    );
    arm_transfer(
        session,
        TransferMode::Stou,
        DataChannel::Inbound(writer),
        name,
    )
}
