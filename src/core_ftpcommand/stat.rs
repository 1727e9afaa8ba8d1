use crate::helpers::resolve_virtual;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;

use super::list::list_lines;

/// Handles the STAT FTP command. Runs during transfers (it is one of
/// the interrupt commands), in which case it only acknowledges the
/// transfer; otherwise it reports connection state or an inline listing.
pub async fn handle_stat_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if session.data_conn.is_some() {
        return Reply::new(221, "Waiting for data transfer to finish.");
    }
    if arg.is_empty() {
        return Reply::new(
            211,
            format!(
                "Control connection OK, TYPE {}, MODE S, STRU F.",
                session.transfer_type.as_char()
            ),
        );
    }
    let target = resolve_virtual(&session.current_dir, arg);
    match list_lines(state, &target).await {
        Ok(lines) => {
            let mut text = format!("Status of {}:", target);
            for line in lines {
                text.push('\n');
                text.push_str(&line);
            }
            text.push_str("\nend");
            Reply::new(212, text)
        }
        Err(reply) => reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ActiveTransfer;
    use crate::session::TransferMode;
    use crate::test_support::{logged_in_session, make_state};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn stat_during_transfer_is_221() {
        let (state, _guard) = make_state(true).await;
        let mut s = logged_in_session();
        s.data_conn = Some(ActiveTransfer {
            mode: TransferMode::Retr,
            filename: "f".into(),
            abort: None,
        });
        let reply = handle_stat_command(&state, &mut s, "").await;
        assert_eq!(reply.code, 221);
    }

    #[tokio::test]
    async fn stat_idle_reports_settings() {
        let (state, _guard) = make_state(true).await;
        let mut s = logged_in_session();
        let reply = handle_stat_command(&state, &mut s, "").await;
        assert_eq!(reply.code, 211);
        assert!(reply.text.contains("TYPE I"));
    }

    #[tokio::test]
    async fn stat_with_path_lists_inline() {
        let (state, _guard) = make_state(true).await;
        let mut w = state.fs.open_write("/x.txt", false).await.unwrap();
        w.write_all(b"abc").await.unwrap();
        w.shutdown().await.unwrap();
        let mut s = logged_in_session();
        let reply = handle_stat_command(&state, &mut s, "/").await;
        assert_eq!(reply.code, 212);
        let wire = reply.serialize();
        assert!(wire.starts_with("212-Status of /:\r\n"));
        assert!(wire.contains("x.txt"));
        assert!(wire.ends_with("212 end\r\n"));
    }
}
