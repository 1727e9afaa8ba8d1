use std::fmt;

/// A numeric FTP reply plus its text, serialized per RFC 959.
///
/// Replies are plain values: command handlers build them, the control
/// connection serializes them onto the socket. A reply may chain a `next`
/// reply (a final reply following a preliminary one), and a `noop` reply
/// is consumed by the write loop without ever reaching the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
    pub noop: bool,
    pub next: Option<Box<Reply>>,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Reply {
            code,
            text: text.into(),
            noop: false,
            next: None,
        }
    }

    /// A reply that is accounted for but never written to the socket.
    pub fn none() -> Self {
        Reply {
            code: 0,
            text: String::new(),
            noop: true,
            next: None,
        }
    }

    /// Chain a final reply after this one.
    pub fn followed_by(mut self, next: Reply) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// Serialize this reply (not its chain) into wire format.
    ///
    /// Empty text yields `"<code>\r\n"`. Single-line text yields
    /// `"<code> <text>\r\n"`. Multi-line text yields the RFC 959 block
    /// format: `"<code>-<first>"`, continuation lines indented with a
    /// space, and `"<code> <last>"` closing the block. Lines are trimmed.
    pub fn serialize(&self) -> String {
        if self.text.is_empty() {
            return format!("{}\r\n", self.code);
        }
        let lines: Vec<&str> = self.text.split('\n').map(str::trim).collect();
        if lines.len() == 1 {
            return format!("{} {}\r\n", self.code, lines[0]);
        }
        let mut out = String::new();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("{}-{}\r\n", self.code, line));
            } else if i == last {
                out.push_str(&format!("{} {}\r\n", self.code, line));
            } else {
                out.push_str(&format!(" {}\r\n", line));
            }
        }
        out
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text.replace('\n', " / "))
    }
}
