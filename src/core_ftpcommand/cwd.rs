use crate::helpers::{quote_path, resolve_virtual, virtual_parent};
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the CWD FTP command: the target must exist and be a
/// directory before the session moves there.
pub async fn handle_cwd_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let target = resolve_virtual(&session.current_dir, arg);
    change_dir(state, session, target).await
}

/// Handles CDUP: one level up, clamped at the root.
pub async fn handle_cdup_command(state: &FtpState, session: &mut Session) -> Reply {
    let target = virtual_parent(&session.current_dir);
    change_dir(state, session, target).await
}

async fn change_dir(state: &FtpState, session: &mut Session, target: String) -> Reply {
    match state.fs.stat(&target).await {
        Ok(Some(entry)) if entry.directory => {
            session.current_dir = target;
            info!(
                "Session {} changed directory to {}",
                session.id, session.current_dir
            );
            Reply::new(
                250,
                format!("Directory changed to \"{}\".", quote_path(&session.current_dir)),
            )
        }
        Ok(Some(_)) => Reply::new(550, "Not a directory."),
        Ok(None) => Reply::new(550, "Failed to change directory."),
        Err(e) => e.to_reply(),
    }
}
