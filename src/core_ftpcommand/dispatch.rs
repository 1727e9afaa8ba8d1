use super::command::{Command, FtpCommand};
use crate::core_network::{pasv, port, SessionEvent};
use crate::reply::Reply;
use crate::session::Session;
use crate::state::FtpState;
use log::debug;
use tokio::sync::mpsc;

/// Runs one parsed command against the session and produces its reply.
///
/// This is the whole executor: the owning connection task calls it, so
/// execution is trivially serialized per session, and the only I/O a
/// command may await is the filesystem (plus the PASV pool handshake).
/// Errors never escape; they all become replies.
pub async fn execute_command(
    state: &FtpState,
    session: &mut Session,
    events: &mpsc::Sender<SessionEvent>,
    cmd: &Command,
) -> Reply {
    let Some(verb) = cmd.verb else {
        debug!(
            "Session {} sent unknown verb {}",
            session.id, cmd.raw_verb
        );
        return Reply::new(504, "Not implemented.");
    };

    if verb.requires_login() && !session.logged_in {
        return Reply::new(530, "Not logged in.");
    }

    let param = cmd.param.as_str();
    match verb {
        FtpCommand::USER => super::user::handle_user_command(state, session, param).await,
        FtpCommand::PASS => super::pass::handle_pass_command(state, session, param).await,
        FtpCommand::PWD => super::pwd::handle_pwd_command(session).await,
        FtpCommand::TYPE => super::type_::handle_type_command(session, param).await,
        FtpCommand::MODE => super::type_::handle_mode_command(param).await,
        FtpCommand::STRU => super::type_::handle_stru_command(param).await,
        FtpCommand::NOOP => super::noop::handle_noop_command().await,
        FtpCommand::ALLO => super::noop::handle_allo_command().await,
        FtpCommand::SYST => super::syst::handle_syst_command(state).await,
        FtpCommand::FEAT => super::feat::handle_feat_command().await,
        FtpCommand::OPTS => super::feat::handle_opts_command(param).await,
        FtpCommand::TVFS => super::feat::handle_tvfs_command().await,
        FtpCommand::PORT => port::handle_port_command(state, session, param),
        FtpCommand::EPRT => port::handle_eprt_command(state, session, param),
        FtpCommand::PASV => pasv::handle_pasv_command(state, session, events).await,
        FtpCommand::EPSV => pasv::handle_epsv_command(state, session, events).await,
        FtpCommand::LIST => super::list::handle_list_command(state, session, param).await,
        FtpCommand::NLST => super::list::handle_nlst_command(state, session, param).await,
        FtpCommand::MLSD => super::list::handle_mlsd_command(state, session, param).await,
        FtpCommand::MLST => super::list::handle_mlst_command(state, session, param).await,
        FtpCommand::RETR => super::retr::handle_retr_command(state, session, param).await,
        FtpCommand::STOR => super::stor::handle_stor_command(state, session, param).await,
        FtpCommand::APPE => super::stor::handle_appe_command(state, session, param).await,
        FtpCommand::STOU => super::stor::handle_stou_command(state, session).await,
        FtpCommand::REST => super::rest::handle_rest_command(state, session, param).await,
        FtpCommand::CWD => super::cwd::handle_cwd_command(state, session, param).await,
        FtpCommand::CDUP => super::cwd::handle_cdup_command(state, session).await,
        FtpCommand::DELE => super::dele::handle_dele_command(state, session, param).await,
        FtpCommand::RMD => super::dele::handle_rmd_command(state, session, param).await,
        FtpCommand::MKD => super::mkd::handle_mkd_command(state, session, param).await,
        FtpCommand::RNFR => super::rnfr::handle_rnfr_command(state, session, param).await,
        FtpCommand::RNTO => super::rnto::handle_rnto_command(state, session, param).await,
        FtpCommand::STAT => super::stat::handle_stat_command(state, session, param).await,
        FtpCommand::MDTM => super::mdtm::handle_mdtm_command(state, session, param).await,
        FtpCommand::SIZE => super::size::handle_size_command(state, session, param).await,
        FtpCommand::ABOR => super::abor::handle_abor_command(state, session).await,
        FtpCommand::QUIT => super::quit::handle_quit_command(state, session).await,
    }
}
