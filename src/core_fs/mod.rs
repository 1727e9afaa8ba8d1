pub mod local;

use crate::reply::Reply;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

pub type FsReader = Box<dyn AsyncRead + Send + Sync + Unpin>;
pub type FsWriter = Box<dyn AsyncWrite + Send + Sync + Unpin>;

/// Reason codes a filesystem backend may fail with. Each maps onto a
/// fixed FTP reply code.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Permission denied: {0}")]
    NoPermissions(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("System error: {0}")]
    SystemError(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("{0}")]
    Other(String),
}

impl FsError {
    pub fn to_reply(&self) -> Reply {
        match self {
            FsError::NoPermissions(_) => Reply::new(550, self.to_string()),
            FsError::InvalidInput(_) => Reply::new(553, self.to_string()),
            FsError::PathError(_) => Reply::new(450, self.to_string()),
            FsError::SystemError(_) => Reply::new(451, self.to_string()),
            FsError::NotImplemented(_) => Reply::new(504, self.to_string()),
            FsError::Other(_) => Reply::new(450, self.to_string()),
        }
    }
}

/// One directory entry as the listing commands see it.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub directory: bool,
    pub permissions: String,
    pub owner: String,
}

impl ListingEntry {
    /// `key=value;` facts for MLSD/MLST, `type` first.
    pub fn mlsx_facts(&self, entry_type: &str) -> String {
        let perm = if self.directory { "flcdmpe" } else { "adfrw" };
        format!(
            "type={};size={};modify={};perm={};",
            entry_type,
            self.size,
            crate::helpers::format_mlsx_time(self.modified),
            perm
        )
    }
}

/// The narrow filesystem seam the engine consumes. Paths are virtual
/// absolute paths (`/a/b`); the backend decides what they map to.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Path separator the backing store uses, reported by SYST.
    fn separator(&self) -> char;

    /// Metadata for one path, `None` when it does not exist.
    async fn stat(&self, path: &str) -> Result<Option<ListingEntry>, FsError>;

    /// Entries of a directory.
    async fn list(&self, path: &str) -> Result<Vec<ListingEntry>, FsError>;

    /// Open a file for reading, positioned at `offset`.
    async fn open_read(&self, path: &str, offset: u64) -> Result<FsReader, FsError>;

    /// Open (create or truncate, or append) a file for writing.
    async fn open_write(&self, path: &str, append: bool) -> Result<FsWriter, FsError>;

    /// Create a file with a name not yet present in `parent`; returns the
    /// writer and the chosen name.
    async fn create_unique(&self, parent: &str) -> Result<(FsWriter, String), FsError>;

    /// Remove a file or an empty directory.
    async fn delete(&self, path: &str) -> Result<(), FsError>;

    async fn mkdir(&self, path: &str) -> Result<(), FsError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), FsError>;
}
