use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

/// What the registry remembers about one live session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub remote: SocketAddr,
    pub username: Option<String>,
    pub connected_at: DateTime<Utc>,
}

/// Read-only view of the registry at one instant.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub sessions: Vec<(u64, SessionInfo)>,
    pub uploaded_bytes: u64,
    pub downloaded_bytes: u64,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    sessions: HashMap<u64, SessionInfo>,
    uploaded_bytes: u64,
    downloaded_bytes: u64,
}

/// Process-wide index of live sessions plus global byte totals.
/// Everything is behind one mutex; callers get snapshots, never the map.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh connection and hands back its session id.
    pub fn register(&self, remote: SocketAddr) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sessions.insert(
            id,
            SessionInfo {
                remote,
                username: None,
                connected_at: Utc::now(),
            },
        );
        id
    }

    pub fn set_username(&self, id: u64, username: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(info) = inner.sessions.get_mut(&id) {
            info.username = Some(username.to_string());
        }
    }

    pub fn unregister(&self, id: u64) {
        self.inner.lock().unwrap().sessions.remove(&id);
    }

    pub fn add_uploaded(&self, bytes: u64) {
        self.inner.lock().unwrap().uploaded_bytes += bytes;
    }

    pub fn add_downloaded(&self, bytes: u64) {
        self.inner.lock().unwrap().downloaded_bytes += bytes;
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.lock().unwrap();
        let mut sessions: Vec<(u64, SessionInfo)> = inner
            .sessions
            .iter()
            .map(|(id, info)| (*id, info.clone()))
            .collect();
        sessions.sort_by_key(|(id, _)| *id);
        RegistrySnapshot {
            sessions,
            uploaded_bytes: inner.uploaded_bytes,
            downloaded_bytes: inner.downloaded_bytes,
        }
    }
}
