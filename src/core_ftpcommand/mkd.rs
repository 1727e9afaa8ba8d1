use crate::helpers::{quote_path, resolve_virtual};
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the MKD (Make Directory) FTP command.
pub async fn handle_mkd_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.mkdir(&path).await {
        Ok(()) => {
            info!("Session {} created directory {}", session.id, path);
            Reply::new(
                257,
                format!("\"{}\" directory created.", quote_path(&path)),
            )
        }
        Err(e) => e.to_reply(),
    }
}
