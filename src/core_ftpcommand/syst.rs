use crate::reply::Reply;
use crate::state::FtpState;

/// Handles the SYST FTP command. The answer follows the filesystem's
/// path separator rather than the host OS: a backend may be serving a
/// foreign tree.
pub async fn handle_syst_command(state: &FtpState) -> Reply {
    if state.fs.separator() == '/' {
        Reply::new(215, "UNIX Type: L8")
    } else {
        Reply::new(215, "Windows_NT")
    }
}
