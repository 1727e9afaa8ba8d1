use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub hostname: String,
    pub listen_port: u16,
    /// Idle deadline on the control connection, in seconds.
    pub timeout_secs: Option<u64>,
    /// Accept anonymous logins with a mail address as password.
    pub guest: bool,
    /// Root of the served tree. Logins land at `/` within it.
    pub homedir: String,
    /// Address advertised to clients in PASV replies.
    pub pasv_address: String,
    /// Ports the passive pool may hand out. `0` entries bind ephemeral.
    pub pasv_ports: Vec<u16>,
    /// Path to the `user:bcrypt-hash[:home]` passwd file.
    pub passwd_file: String,
    /// Refuse new control connections with 421 when set.
    pub suspended: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: String::from("0.0.0.0"),
            listen_port: 2021,
            timeout_secs: Some(15),
            guest: true,
            homedir: String::from("/srv/ftp"),
            pasv_address: String::from("127.0.0.1"),
            pasv_ports: vec![6001, 6002, 6003],
            passwd_file: String::from("/etc/oxidftpd.passwd"),
            suspended: Some(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;

        if config.server.timeout_secs.is_none() {
            config.server.timeout_secs = Some(15);
        }
        if config.server.suspended.is_none() {
            config.server.suspended = Some(false);
        }

        Ok(config)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.server.timeout_secs.unwrap_or(15)
    }

    pub fn suspended(&self) -> bool {
        self.server.suspended.unwrap_or(false)
    }
}
