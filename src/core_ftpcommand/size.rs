use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;

use super::utils::filter_veto_reply;

/// Handles the SIZE FTP command. The on-disk size is meaningless when a
/// length-changing filter is active, so TYPE A refuses outright.
pub async fn handle_size_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    if state.filters.modifies_length(session) {
        return filter_veto_reply("SIZE", session);
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.stat(&path).await {
        Ok(Some(entry)) if entry.directory => Reply::new(550, "Not a plain file."),
        Ok(Some(entry)) => Reply::new(213, entry.size.to_string()),
        Ok(None) => Reply::new(550, "File not found."),
        Err(e) => e.to_reply(),
    }
}
