// src/constants.rs

/// Hard cap on a single control-channel line, CRLF included.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Buffer size used by the data-connection pump loops.
pub const DATA_BUFFER_SIZE: usize = 8 * 1024;

/// How long a PASV/EPSV command waits for the pool to hand out a port.
pub const PASV_ACCEPT_DEADLINE_MS: u64 = 1_000;

/// Anonymous logins must present something that looks like a mail address.
pub const GUEST_MAIL_REGEX: &str = r"^[A-Za-z0-9_\-.]+@[A-Za-z0-9_\-.]*$";

/// Attempts at picking a fresh unique name before STOU gives up.
pub const STOU_NAME_RETRIES: usize = 8;
