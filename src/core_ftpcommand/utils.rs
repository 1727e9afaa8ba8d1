use crate::reply::Reply;
use crate::session::{DataChannel, PendingTransfer, Session, TransferMode};

/// Common tail of every transfer-arming command: verify an opener is
/// armed, stash the channel on the session, and build the preliminary
/// 150. The caller must not have started a transfer already (the
/// interrupt gate guarantees that).
pub fn arm_transfer(
    session: &mut Session,
    mode: TransferMode,
    channel: DataChannel,
    filename: String,
) -> Reply {
    if session.opener.is_none() {
        // Dropping the channel closes whatever the filesystem handed out.
        drop(channel);
        return Reply::new(425, "Use PORT or PASV first.");
    }
    if !session.transfer_idle() {
        drop(channel);
        return Reply::new(425, "A data transfer is already in progress.");
    }
    let type_char = session.transfer_type.as_char();
    session.pending = Some(PendingTransfer {
        mode,
        channel,
        filename: filename.clone(),
        dialing: false,
    });
    Reply::new(
        150,
        format!(
            "Opening {} mode data connection for \"{}\".",
            type_char, filename
        ),
    )
}

/// 550 used wherever the active filter chain forbids byte-exact
/// operations (REST/APPE/SIZE under TYPE A).
pub fn filter_veto_reply(verb: &str, session: &Session) -> Reply {
    Reply::new(
        550,
        format!(
            "{} unavailable for TYPE {}, MODE S, STRU F.",
            verb,
            session.transfer_type.as_char()
        ),
    )
}
