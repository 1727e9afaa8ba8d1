use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the DELE (Delete File) FTP command.
pub async fn handle_dele_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.stat(&path).await {
        Ok(Some(entry)) if entry.directory => {
            return Reply::new(550, "Not a plain file, use RMD.")
        }
        Ok(Some(_)) => {}
        Ok(None) => return Reply::new(550, "File does not exist."),
        Err(e) => return e.to_reply(),
    }
    match state.fs.delete(&path).await {
        Ok(()) => {
            info!("Session {} deleted {}", session.id, path);
            Reply::new(250, "DELE command successful.")
        }
        Err(e) => e.to_reply(),
    }
}

/// Handles RMD: same shape as DELE but insists on a directory.
pub async fn handle_rmd_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.stat(&path).await {
        Ok(Some(entry)) if !entry.directory => return Reply::new(550, "Not a directory."),
        Ok(Some(_)) => {}
        Ok(None) => return Reply::new(550, "Directory does not exist."),
        Err(e) => return e.to_reply(),
    }
    match state.fs.delete(&path).await {
        Ok(()) => {
            info!("Session {} removed directory {}", session.id, path);
            Reply::new(250, "RMD command successful.")
        }
        Err(e) => e.to_reply(),
    }
}
