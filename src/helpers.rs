use chrono::{DateTime, Utc};
use std::net::{IpAddr, Ipv4Addr};

/// Doubles embedded quotes for 257-style replies (`PWD`, `MKD`).
pub fn quote_path(path: &str) -> String {
    path.replace('"', "\"\"")
}

/// Resolves `arg` against `current`, normalizing `.` and `..` without ever
/// escaping the virtual root. Both input and output are virtual absolute
/// paths using `/` separators.
pub fn resolve_virtual(current: &str, arg: &str) -> String {
    let joined = if arg.starts_with('/') {
        arg.to_string()
    } else if current.ends_with('/') {
        format!("{}{}", current, arg)
    } else {
        format!("{}/{}", current, arg)
    };

    let mut parts: Vec<&str> = Vec::new();
    for piece in joined.split('/') {
        match piece {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Parent of a virtual path; the root is its own parent.
pub fn virtual_parent(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Final component of a virtual path.
pub fn virtual_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `MMM dd HH:mm` with English month names, as `ls -l` prints it.
pub fn format_listing_time(when: DateTime<Utc>) -> String {
    when.format("%b %d %H:%M").to_string()
}

/// `yyyyMMddHHmmss` UTC, for MDTM replies and the MLSx `modify` fact.
pub fn format_mlsx_time(when: DateTime<Utc>) -> String {
    when.format("%Y%m%d%H%M%S").to_string()
}

/// The `h1,h2,h3,h4,p1,p2` tail of a 227 reply.
pub fn format_pasv_endpoint(ip: Ipv4Addr, port: u16) -> String {
    let octets = ip.octets();
    format!(
        "{},{},{},{},{},{}",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port / 256,
        port % 256
    )
}

/// PASV needs a dotted quad; map anything else to 0.0.0.0 so the reply
/// stays well-formed and the client falls back to the control address.
pub fn pasv_ipv4(addr: IpAddr) -> Ipv4Addr {
    match addr {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => v6.to_ipv4().unwrap_or(Ipv4Addr::UNSPECIFIED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_path(r#"a"b"#), r#"a""b"#);
        assert_eq!(quote_path("/plain"), "/plain");
    }

    #[test]
    fn resolve_relative_and_absolute() {
        assert_eq!(resolve_virtual("/", "sub"), "/sub");
        assert_eq!(resolve_virtual("/a/b", "c.txt"), "/a/b/c.txt");
        assert_eq!(resolve_virtual("/a/b", "/x"), "/x");
    }

    #[test]
    fn resolve_never_escapes_root() {
        assert_eq!(resolve_virtual("/", "../../etc/passwd"), "/etc/passwd");
        assert_eq!(resolve_virtual("/a", ".."), "/");
        assert_eq!(resolve_virtual("/a/b", "../c"), "/a/c");
        assert_eq!(resolve_virtual("/", "./."), "/");
    }

    #[test]
    fn parent_and_name() {
        assert_eq!(virtual_parent("/a/b"), "/a");
        assert_eq!(virtual_parent("/a"), "/");
        assert_eq!(virtual_parent("/"), "/");
        assert_eq!(virtual_name("/a/b.txt"), "b.txt");
    }

    #[test]
    fn listing_time_uses_english_months() {
        let when = Utc.with_ymd_and_hms(2025, 1, 3, 9, 5, 0).unwrap();
        assert_eq!(format_listing_time(when), "Jan 03 09:05");
    }

    #[test]
    fn mlsx_time_format() {
        let when = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(format_mlsx_time(when), "20251231235958");
    }

    #[test]
    fn pasv_endpoint_encoding() {
        let tail = format_pasv_endpoint(Ipv4Addr::new(127, 0, 0, 1), 6001);
        assert_eq!(tail, "127,0,0,1,23,113");
    }
}
