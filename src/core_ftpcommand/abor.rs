use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::info;

/// Handles the ABOR FTP command.
///
/// With a data connection in flight the reply here is a noop: aborting
/// the pump produces an `Aborted` report, and that report drives the
/// user-visible 426 + 226 pair. Without one, any armed-but-unstarted
/// transfer and any passive reservation are dropped and 226 goes out
/// directly.
pub async fn handle_abor_command(state: &FtpState, session: &mut Session) -> Reply {
    state.pasv.cancel(session.id);

    if let Some(active) = session.data_conn.as_mut() {
        if let Some(abort) = active.abort.take() {
            let _ = abort.send(());
        }
        info!("Session {} aborting transfer in flight", session.id);
        return Reply::none();
    }

    session.clear_data_state();
    info!("Session {} abort with nothing in flight", session.id);
    Reply::new(226, "Abort command successful.")
}
