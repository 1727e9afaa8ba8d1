use crate::reply::Reply;
use crate::session::{Session, TransferType};

/// Handles the TYPE FTP command. Only ASCII and Image are on offer;
/// mode and structure are pinned to stream/file by the companions below.
pub async fn handle_type_command(session: &mut Session, arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    match arg.to_ascii_uppercase().as_str() {
        "A" => {
            session.transfer_type = TransferType::Ascii;
            Reply::new(200, "Type set to A")
        }
        "I" => {
            session.transfer_type = TransferType::Image;
            Reply::new(200, "Type set to I")
        }
        other => Reply::new(504, format!("Type {} not supported.", other)),
    }
}

/// Handles MODE: stream is the only mode this server speaks.
pub async fn handle_mode_command(arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    match arg.to_ascii_uppercase().as_str() {
        "S" => Reply::new(200, "Mode set to S"),
        other => Reply::new(504, format!("Mode {} not supported.", other)),
    }
}

/// Handles STRU: file structure only.
pub async fn handle_stru_command(arg: &str) -> Reply {
    if arg.is_empty() {
        return Reply::new(501, "Syntax error in parameters or arguments.");
    }
    match arg.to_ascii_uppercase().as_str() {
        "F" => Reply::new(200, "Structure set to F"),
        other => Reply::new(504, format!("Structure {} not supported.", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(1, "127.0.0.1:1".parse().unwrap(), false)
    }

    #[tokio::test]
    async fn type_a_and_i_are_accepted() {
        let mut s = session();
        assert_eq!(handle_type_command(&mut s, "A").await.code, 200);
        assert_eq!(s.transfer_type, TransferType::Ascii);
        assert_eq!(handle_type_command(&mut s, "i").await.code, 200);
        assert_eq!(s.transfer_type, TransferType::Image);
    }

    #[tokio::test]
    async fn type_e_is_rejected() {
        let mut s = session();
        let reply = handle_type_command(&mut s, "E").await;
        assert_eq!(reply.code, 504);
        assert_eq!(s.transfer_type, TransferType::Image);
    }

    #[tokio::test]
    async fn empty_type_is_501() {
        let mut s = session();
        assert_eq!(handle_type_command(&mut s, "").await.code, 501);
    }

    #[tokio::test]
    async fn mode_and_stru_accept_only_stream_file() {
        assert_eq!(handle_mode_command("S").await.code, 200);
        assert_eq!(handle_mode_command("B").await.code, 504);
        assert_eq!(handle_mode_command("").await.code, 501);
        assert_eq!(handle_stru_command("F").await.code, 200);
        assert_eq!(handle_stru_command("R").await.code, 504);
        assert_eq!(handle_stru_command("").await.code, 501);
    }
}
