use crate::reply::Reply;

/// Handles the NOOP FTP command: proof of life, nothing else.
pub async fn handle_noop_command() -> Reply {
    Reply::new(200, "NOOP command successful.")
}

/// Handles ALLO. Storage is not pre-allocated here, so the request is
/// acknowledged and ignored.
pub async fn handle_allo_command() -> Reply {
    Reply::new(200, "ALLO command successful.")
}
