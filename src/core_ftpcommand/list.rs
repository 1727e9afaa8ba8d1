use crate::core_fs::ListingEntry;
use crate::helpers::{format_listing_time, resolve_virtual, virtual_parent};
use crate::reply::Reply;
use crate::session::{DataChannel, Session, TransferMode};
use crate::state::FtpState;
use log::debug;

use super::utils::arm_transfer;

/// LIST/NLST/MLSD target resolution. Unix-style flags (`-la`) and glob
/// arguments fall back to the current directory.
fn listing_target(session: &Session, arg: &str) -> String {
    if arg.is_empty() || arg.starts_with('-') || arg.contains('*') {
        session.current_dir.clone()
    } else {
        resolve_virtual(&session.current_dir, arg)
    }
}

/// Stat the target and gather the entries to print: a directory lists
/// its children, a plain file lists itself.
async fn collect_entries(
    state: &FtpState,
    target: &str,
) -> Result<(ListingEntry, Vec<ListingEntry>), Reply> {
    match state.fs.stat(target).await {
        Ok(Some(entry)) if entry.directory => match state.fs.list(target).await {
            Ok(children) => Ok((entry, children)),
            Err(e) => Err(e.to_reply()),
        },
        Ok(Some(entry)) => {
            let single = vec![entry.clone()];
            Ok((entry, single))
        }
        Ok(None) => Err(Reply::new(450, format!("{}: not found", target))),
        Err(e) => Err(e.to_reply()),
    }
}

/// One classic `ls -l`-style line.
fn long_line(entry: &ListingEntry) -> String {
    let kind = if entry.directory { 'd' } else { '-' };
    format!(
        "{}{} 1 {} {} {} {}",
        kind,
        entry.permissions,
        entry.owner,
        entry.size,
        format_listing_time(entry.modified),
        entry.name
    )
}

/// The LIST body for a target, one line per entry. STAT reuses this for
/// its 212 block.
pub async fn list_lines(state: &FtpState, target: &str) -> Result<Vec<String>, Reply> {
    let (_, entries) = collect_entries(state, target).await?;
    Ok(entries.iter().map(long_line).collect())
}

fn lines_to_channel(lines: Vec<String>) -> DataChannel {
    let mut body = lines.join("\r\n");
    if !body.is_empty() {
        body.push_str("\r\n");
    }
    DataChannel::Outbound(Box::new(std::io::Cursor::new(body.into_bytes())))
}

/// Handles the LIST FTP command.
pub async fn handle_list_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    let target = listing_target(session, arg);
    let lines = match list_lines(state, &target).await {
        Ok(lines) => lines,
        Err(reply) => return reply,
    };
    debug!(
        "Session {} listing {} ({} entries)",
        session.id,
        target,
        lines.len()
    );
    arm_transfer(session, TransferMode::List, lines_to_channel(lines), target)
}

/// Handles NLST: bare names, directories marked with a trailing slash.
pub async fn handle_nlst_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    let target = listing_target(session, arg);
    let (_, entries) = match collect_entries(state, &target).await {
        Ok(found) => found,
        Err(reply) => return reply,
    };
    let lines: Vec<String> = entries
        .iter()
        .map(|e| {
            if e.directory {
                format!("{}/", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect();
    arm_transfer(session, TransferMode::List, lines_to_channel(lines), target)
}

/// Handles MLSD: machine-readable facts per entry, with `cdir`/`pdir`
/// rows for the directory itself and its parent.
pub async fn handle_mlsd_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    let target = listing_target(session, arg);
    let (target_entry, entries) = match collect_entries(state, &target).await {
        Ok(found) => found,
        Err(reply) => return reply,
    };

    let mut lines = Vec::with_capacity(entries.len() + 2);
    if target_entry.directory {
        lines.push(format!("{} {}", target_entry.mlsx_facts("cdir"), target));
        let parent = virtual_parent(&target);
        match state.fs.stat(&parent).await {
            Ok(Some(parent_entry)) => {
                lines.push(format!("{} {}", parent_entry.mlsx_facts("pdir"), parent));
            }
            _ => {}
        }
    }
    for entry in &entries {
        let kind = if entry.directory { "dir" } else { "file" };
        lines.push(format!("{} {}", entry.mlsx_facts(kind), entry.name));
    }
    arm_transfer(session, TransferMode::List, lines_to_channel(lines), target)
}

/// Handles MLST: the same facts for a single entry, delivered on the
/// control channel as a 250 block.
pub async fn handle_mlst_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    let path = if arg.is_empty() {
        session.current_dir.clone()
    } else {
        resolve_virtual(&session.current_dir, arg)
    };
    match state.fs.stat(&path).await {
        Ok(Some(entry)) => {
            let kind = if entry.directory { "dir" } else { "file" };
            Reply::new(
                250,
                format!("Listing {}\n{} {}\nEnd", path, entry.mlsx_facts(kind), path),
            )
        }
        Ok(None) => Reply::new(550, "File not found."),
        Err(e) => e.to_reply(),
    }
}
