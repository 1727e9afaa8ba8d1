use crate::helpers::quote_path;
use crate::reply::Reply;
use crate::session::Session;

/// Handles the PWD FTP command. Embedded quotes are doubled per RFC 959.
pub async fn handle_pwd_command(session: &Session) -> Reply {
    Reply::new(
        257,
        format!("\"{}\" is current directory.", quote_path(&session.current_dir)),
    )
}
