use log::{error, warn};
use std::collections::HashMap;

/// The credential seam the PASS command consumes.
pub trait UserStore: Send + Sync {
    fn login(&self, user: &str, pass: &str) -> bool;

    /// Home directory (virtual path) for a user, when one is configured.
    fn home_dir(&self, user: &str) -> Option<String>;
}

/// One `user:bcrypt-hash[:home]` line of the passwd file.
#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
    home: Option<String>,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 || parts[0].is_empty() {
            return None;
        }
        Some(PasswdEntry {
            username: parts[0].to_string(),
            hashed_password: parts[1].to_string(),
            home: parts.get(2).map(|s| s.to_string()),
        })
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }
}

/// Passwd-file-backed user store.
pub struct PasswdFileStore {
    entries: HashMap<String, PasswdEntry>,
}

impl PasswdFileStore {
    pub fn from_file(path: &str) -> Self {
        let mut entries = HashMap::new();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                for line in contents.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    match PasswdEntry::from_line(line) {
                        Some(entry) => {
                            entries.insert(entry.username.clone(), entry);
                        }
                        None => warn!("Skipping malformed passwd line"),
                    }
                }
            }
            Err(e) => {
                warn!("Could not read passwd file {}: {}", path, e);
            }
        }
        Self { entries }
    }

    pub fn from_entries(list: Vec<PasswdEntry>) -> Self {
        let entries = list
            .into_iter()
            .map(|e| (e.username.clone(), e))
            .collect();
        Self { entries }
    }
}

impl UserStore for PasswdFileStore {
    fn login(&self, user: &str, pass: &str) -> bool {
        let Some(entry) = self.entries.get(user) else {
            return false;
        };
        match bcrypt::verify(pass, &entry.hashed_password) {
            Ok(ok) => ok,
            Err(e) => {
                error!("Bad password hash for user {}: {}", user, e);
                false
            }
        }
    }

    fn home_dir(&self, user: &str) -> Option<String> {
        self.entries.get(user).and_then(|e| e.home.clone())
    }
}
