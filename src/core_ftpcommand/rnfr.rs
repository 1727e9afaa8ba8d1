use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the RNFR (Rename From) FTP command: remember the source for
/// the RNTO that must follow.
pub async fn handle_rnfr_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.stat(&path).await {
        Ok(Some(_)) => {
            info!("Session {} will rename {}", session.id, path);
            session.rename_from = Some(path);
            Reply::new(350, "Requested file action pending further information.")
        }
        Ok(None) => Reply::new(550, "File or directory does not exist."),
        Err(e) => e.to_reply(),
    }
}
