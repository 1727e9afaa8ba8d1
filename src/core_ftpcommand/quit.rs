use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the QUIT FTP command: poison the session so the control
/// connection closes as soon as nothing is in flight.
pub async fn handle_quit_command(state: &FtpState, session: &mut Session) -> Reply {
    session.poisoned = true;
    state.pasv.cancel(session.id);
    info!("Session {} quitting", session.id);

    if session.data_conn.is_some() {
        Reply::new(
            221,
            "Service closing control connection as soon as data transferred.",
        )
    } else {
        Reply::new(221, "Service closing control connection.")
    }
}
