use crate::reply::Reply;

/// Handles the FEAT FTP command: the 211 block clients probe before
/// trying the post-959 extensions.
pub async fn handle_feat_command() -> Reply {
    Reply::new(
        211,
        "Extensions supported:\n\
         EPRT\n\
         EPSV\n\
         MDTM\n\
         MLST type*;size*;modify*;perm*;\n\
         REST STREAM\n\
         SIZE\n\
         TVFS\n\
         UTF8\n\
         End",
    )
}

/// Handles OPTS. Only `UTF8 ON` means anything here.
pub async fn handle_opts_command(arg: &str) -> Reply {
    if arg.eq_ignore_ascii_case("UTF8 ON") {
        Reply::new(200, "Always in UTF8 mode.")
    } else {
        Reply::new(501, "Option not understood.")
    }
}

/// Handles TVFS, which is purely declarative: the server already speaks
/// slash-separated virtual paths.
pub async fn handle_tvfs_command() -> Reply {
    Reply::new(200, "TVFS command successful.")
}
