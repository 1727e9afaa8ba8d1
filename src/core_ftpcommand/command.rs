/// Every verb the server understands.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    PWD,
    TYPE,
    MODE,
    STRU,
    NOOP,
    SYST,
    ALLO,
    PORT,
    PASV,
    LIST,
    NLST,
    CWD,
    RETR,
    STOR,
    APPE,
    STOU,
    REST,
    CDUP,
    DELE,
    MKD,
    RMD,
    RNFR,
    RNTO,
    STAT,
    ABOR,
    QUIT,
    EPRT,
    EPSV,
    TVFS,
    MDTM,
    SIZE,
    MLSD,
    MLST,
    FEAT,
    OPTS,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "PWD" => Some(FtpCommand::PWD),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            "NOOP" => Some(FtpCommand::NOOP),
            "SYST" => Some(FtpCommand::SYST),
            "ALLO" => Some(FtpCommand::ALLO),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "CWD" => Some(FtpCommand::CWD),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "STOU" => Some(FtpCommand::STOU),
            "REST" => Some(FtpCommand::REST),
            "CDUP" => Some(FtpCommand::CDUP),
            "DELE" => Some(FtpCommand::DELE),
            "MKD" => Some(FtpCommand::MKD),
            "RMD" => Some(FtpCommand::RMD),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "STAT" => Some(FtpCommand::STAT),
            "ABOR" => Some(FtpCommand::ABOR),
            "QUIT" => Some(FtpCommand::QUIT),
            "EPRT" => Some(FtpCommand::EPRT),
            "EPSV" => Some(FtpCommand::EPSV),
            "TVFS" => Some(FtpCommand::TVFS),
            "MDTM" => Some(FtpCommand::MDTM),
            "SIZE" => Some(FtpCommand::SIZE),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "FEAT" => Some(FtpCommand::FEAT),
            "OPTS" => Some(FtpCommand::OPTS),
            _ => None,
        }
    }

    /// Commands that must be rejected with 530 before authentication.
    pub fn requires_login(&self) -> bool {
        !matches!(
            self,
            FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::QUIT
                | FtpCommand::NOOP
                | FtpCommand::SYST
                | FtpCommand::FEAT
                | FtpCommand::OPTS
                | FtpCommand::ABOR
        )
    }

    /// Commands honored while a transfer is outstanding.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            FtpCommand::ABOR | FtpCommand::STAT | FtpCommand::QUIT
        )
    }

    /// Commands whose (written) reply drops the interrupt flag.
    pub fn clears_interrupt(&self) -> bool {
        matches!(self, FtpCommand::ABOR)
    }
}

/// A parsed control line: the verb (when recognized) and everything
/// after the first space.
#[derive(Debug, Clone)]
pub struct Command {
    pub verb: Option<FtpCommand>,
    pub raw_verb: String,
    pub param: String,
}

impl Command {
    /// Splits `line` on the first space; the verb matches
    /// case-insensitively, anything unknown stays `None`.
    pub fn parse(line: &str) -> Command {
        let line = line.trim_end_matches(['\r', '\n']);
        let (raw_verb, param) = match line.find(' ') {
            Some(idx) => (&line[..idx], line[idx + 1..].trim()),
            None => (line, ""),
        };
        Command {
            verb: FtpCommand::from_str(raw_verb),
            raw_verb: raw_verb.to_string(),
            param: param.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verb_and_param() {
        let cmd = Command::parse("RETR hello.txt\r\n");
        assert_eq!(cmd.verb, Some(FtpCommand::RETR));
        assert_eq!(cmd.param, "hello.txt");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Command::parse("pasv").verb, Some(FtpCommand::PASV));
        assert_eq!(Command::parse("Quit").verb, Some(FtpCommand::QUIT));
    }

    #[test]
    fn parse_keeps_spaces_inside_param() {
        let cmd = Command::parse("STOR a file with spaces.txt");
        assert_eq!(cmd.param, "a file with spaces.txt");
    }

    #[test]
    fn unknown_verb_is_none() {
        let cmd = Command::parse("FOO bar");
        assert_eq!(cmd.verb, None);
        assert_eq!(cmd.raw_verb, "FOO");
    }

    #[test]
    fn capability_flags() {
        assert!(FtpCommand::RETR.requires_login());
        assert!(!FtpCommand::USER.requires_login());
        assert!(!FtpCommand::FEAT.requires_login());
        assert!(FtpCommand::ABOR.is_interrupt());
        assert!(FtpCommand::STAT.is_interrupt());
        assert!(FtpCommand::QUIT.is_interrupt());
        assert!(!FtpCommand::LIST.is_interrupt());
        assert!(FtpCommand::ABOR.clears_interrupt());
        assert!(!FtpCommand::STAT.clears_interrupt());
    }
}
