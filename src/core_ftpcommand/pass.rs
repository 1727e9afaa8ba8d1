use crate::constants::GUEST_MAIL_REGEX;
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static MAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(GUEST_MAIL_REGEX).unwrap());

/// Handles the PASS FTP command.
///
/// Guest sessions accept anything shaped like a mail address for the
/// `anonymous` user; everyone else goes through the user store. The
/// user's home directory (when the store knows one) becomes the
/// session's working directory.
pub async fn handle_pass_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    if session.logged_in {
        return Reply::new(503, "Already logged in.");
    }
    let Some(username) = session.username.clone() else {
        return Reply::new(503, "Login with USER first.");
    };

    if session.guest && username.eq_ignore_ascii_case("anonymous") {
        if MAIL_RE.is_match(arg) {
            session.login(arg.to_string(), "/".to_string());
            info!("Session {} guest login as {}", session.id, arg);
            return Reply::new(230, "User logged in, proceed.");
        }
        warn!("Session {} guest login rejected", session.id);
        return Reply::new(530, "Login incorrect.");
    }

    if state.users.login(&username, arg) {
        let home = state
            .users
            .home_dir(&username)
            .unwrap_or_else(|| "/".to_string());
        session.login(arg.to_string(), home);
        info!("Session {} logged in as {}", session.id, username);
        Reply::new(230, "User logged in, proceed.")
    } else {
        warn!("Session {} failed login as {}", session.id, username);
        Reply::new(530, "Login incorrect.")
    }
}
