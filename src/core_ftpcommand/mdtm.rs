use crate::helpers::{format_mlsx_time, resolve_virtual};
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;

/// Handles the MDTM FTP command: modification time of a plain file as
/// `yyyyMMddHHmmss` UTC.
pub async fn handle_mdtm_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let path = resolve_virtual(&session.current_dir, arg);
    match state.fs.stat(&path).await {
        Ok(Some(entry)) if entry.directory => Reply::new(550, "Not a plain file."),
        Ok(Some(entry)) => Reply::new(213, format_mlsx_time(entry.modified)),
        Ok(None) => Reply::new(550, "File not found."),
        Err(e) => e.to_reply(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logged_in_session, make_state};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn mdtm_formats_timestamp() {
        let (state, _guard) = make_state(true).await;
        let mut w = state.fs.open_write("/t.txt", false).await.unwrap();
        w.write_all(b"x").await.unwrap();
        w.shutdown().await.unwrap();
        let mut s = logged_in_session();
        let reply = handle_mdtm_command(&state, &mut s, "t.txt").await;
        assert_eq!(reply.code, 213);
        assert_eq!(reply.text.len(), 14);
        assert!(reply.text.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn mdtm_on_directory_is_550() {
        let (state, _guard) = make_state(true).await;
        state.fs.mkdir("/d").await.unwrap();
        let mut s = logged_in_session();
        assert_eq!(handle_mdtm_command(&state, &mut s, "d").await.code, 550);
        assert_eq!(handle_mdtm_command(&state, &mut s, "nope").await.code, 550);
    }
}
