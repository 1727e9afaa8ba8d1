use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;

use super::utils::filter_veto_reply;

/// Handles the REST FTP command: stash a byte offset for the next
/// RETR/STOR. Meaningless when a filter may change the byte count, so
/// TYPE A rejects it outright.
pub async fn handle_rest_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if state.filters.modifies_length(session) {
        return filter_veto_reply("REST", session);
    }
    match arg.parse::<u64>() {
        Ok(marker) => {
            session.restart_marker = marker;
            Reply::new(
                350,
                format!(
                    "Restarting at {}. Send STORE or RETRIEVE to initiate transfer.",
                    marker
                ),
            )
        }
        Err(_) => Reply::new(501, "Syntax error in parameters or arguments."),
    }
}
