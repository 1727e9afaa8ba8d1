use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the USER FTP command.
///
/// Records the name and tells the client what kind of password will do:
/// a mail address for anonymous logins when guest mode is on, a real
/// password otherwise.
pub async fn handle_user_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }

    session.username = Some(arg.to_string());
    state.registry.set_username(session.id, arg);
    info!("Session {} announced user {}", session.id, arg);

    if arg.eq_ignore_ascii_case("anonymous") {
        if session.guest {
            Reply::new(331, "Guest login ok, send your email address as password.")
        } else {
            Reply::new(332, "Need account for login.")
        }
    } else {
        Reply::new(331, "User name okay, need password.")
    }
}
