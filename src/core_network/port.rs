use crate::reply::Reply;
use crate::session::{DataOpener, Session};
use crate::state::FtpState;
use log::info;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Parses the RFC 959 `h1,h2,h3,h4,p1,p2` PORT argument.
pub fn parse_port_endpoint(arg: &str) -> Option<SocketAddr> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return None;
    }
    let nums: Option<Vec<u8>> = parts.iter().map(|p| p.parse::<u8>().ok()).collect();
    let nums = nums?;
    let ip = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
    let port = u16::from(nums[4]) * 256 + u16::from(nums[5]);
    if port == 0 {
        return None;
    }
    Some(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Parses the RFC 2428 `<d>proto<d>addr<d>port<d>` EPRT argument. The
/// protocol field must match the family of the address literal.
pub fn parse_eprt_endpoint(arg: &str) -> Option<SocketAddr> {
    let delim = arg.chars().next()?;
    let parts: Vec<&str> = arg.split(delim).collect();
    // split yields ["", proto, addr, port, ""]
    if parts.len() != 5 || !parts[0].is_empty() || !parts[4].is_empty() {
        return None;
    }
    let port: u16 = parts[3].parse().ok()?;
    if port == 0 {
        return None;
    }
    let ip = match parts[1] {
        "1" => IpAddr::V4(parts[2].parse::<Ipv4Addr>().ok()?),
        "2" => IpAddr::V6(parts[2].parse::<Ipv6Addr>().ok()?),
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

/// Stores the client's endpoint for a later active-mode dial.
pub fn handle_port_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    match parse_port_endpoint(arg) {
        Some(addr) => {
            // A PORT after PASV drops the passive reservation.
            state.pasv.cancel(session.id);
            session.opener = Some(DataOpener::Active(addr));
            session.data_socket = None;
            info!("Session {} will dial {} for data", session.id, addr);
            Reply::new(200, "PORT command successful.")
        }
        None => Reply::new(501, "Syntax error in parameters or arguments."),
    }
}

pub fn handle_eprt_command(state: &FtpState, session: &mut Session, arg: &str) -> Reply {
    match parse_eprt_endpoint(arg) {
        Some(addr) => {
            state.pasv.cancel(session.id);
            session.opener = Some(DataOpener::Active(addr));
            session.data_socket = None;
            info!("Session {} will dial {} for data", session.id, addr);
            Reply::new(200, "EPRT command successful.")
        }
        None => Reply::new(501, "Syntax error in parameters or arguments."),
    }
}
