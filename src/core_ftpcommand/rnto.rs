use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the RNTO (Rename To) FTP command. Requires a preceding RNFR;
/// the stashed source is cleared whatever happens.
pub async fn handle_rnto_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    let Some(from) = session.rename_from.take() else {
        return Reply::new(503, "Bad sequence of commands.");
    };
    let to = resolve_virtual(&session.current_dir, arg);
    match state.fs.rename(&from, &to).await {
        Ok(()) => {
            info!("Session {} renamed {} to {}", session.id, from, to);
            Reply::new(250, "Rename successful.")
        }
        Err(e) => e.to_reply(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logged_in_session, make_state};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn rnto_without_rnfr_is_503() {
        let (state, _guard) = make_state(true).await;
        let mut s = logged_in_session();
        let reply = handle_rnto_command(&state, &mut s, "new").await;
        assert_eq!(reply.code, 503);
    }

    #[tokio::test]
    async fn rnfr_then_rnto_renames() {
        let (state, _guard) = make_state(true).await;
        let mut w = state.fs.open_write("/old.txt", false).await.unwrap();
        w.write_all(b"x").await.unwrap();
        w.shutdown().await.unwrap();
        let mut s = logged_in_session();
        s.rename_from = Some("/old.txt".into());
        let reply = handle_rnto_command(&state, &mut s, "new.txt").await;
        assert_eq!(reply.code, 250);
        assert!(s.rename_from.is_none());
        assert!(state.fs.stat("/new.txt").await.unwrap().is_some());
        assert!(state.fs.stat("/old.txt").await.unwrap().is_none());
    }
}
