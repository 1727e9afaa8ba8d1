use super::{FileSystem, FsError, FsReader, FsWriter, ListingEntry};
use crate::constants::STOU_NAME_RETRIES;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use std::io::ErrorKind;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncSeekExt;

/// Local-disk backend rooted at a directory. Virtual paths are resolved
/// strictly beneath the root; the resolver only ever sees normalized
/// absolute paths, so no component can climb out.
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn real_path(&self, virtual_path: &str) -> Result<PathBuf, FsError> {
        if !virtual_path.starts_with('/') {
            return Err(FsError::InvalidInput(format!(
                "not an absolute path: {}",
                virtual_path
            )));
        }
        let mut real = self.root.clone();
        for piece in virtual_path.split('/') {
            match piece {
                "" | "." => {}
                ".." => {
                    return Err(FsError::InvalidInput(format!(
                        "unresolved parent reference in {}",
                        virtual_path
                    )))
                }
                other => real.push(other),
            }
        }
        Ok(real)
    }

    fn map_io(err: std::io::Error, what: &str) -> FsError {
        match err.kind() {
            ErrorKind::NotFound => FsError::PathError(format!("{}: not found", what)),
            ErrorKind::PermissionDenied => {
                FsError::NoPermissions(format!("{}: permission denied", what))
            }
            ErrorKind::AlreadyExists => {
                FsError::InvalidInput(format!("{}: already exists", what))
            }
            _ => FsError::SystemError(format!("{}: {}", what, err)),
        }
    }

    async fn entry_for(
        &self,
        name: String,
        virtual_path: String,
        real: &Path,
    ) -> Result<Option<ListingEntry>, FsError> {
        let meta = match tokio::fs::metadata(real).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Self::map_io(err, &virtual_path)),
        };
        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(Some(ListingEntry {
            name,
            path: virtual_path,
            size: meta.len(),
            modified,
            directory: meta.is_dir(),
            permissions: permissions_string(&meta),
            owner: String::from("ftp"),
        }))
    }
}

#[cfg(unix)]
fn permissions_string(meta: &std::fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(9);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn permissions_string(meta: &std::fs::Metadata) -> String {
    if meta.permissions().readonly() {
        String::from("r-xr-xr-x")
    } else {
        String::from("rwxr-xr-x")
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    fn separator(&self) -> char {
        std::path::MAIN_SEPARATOR
    }

    async fn stat(&self, path: &str) -> Result<Option<ListingEntry>, FsError> {
        let real = self.real_path(path)?;
        let name = crate::helpers::virtual_name(path).to_string();
        let name = if name.is_empty() { "/".to_string() } else { name };
        self.entry_for(name, path.to_string(), &real).await
    }

    async fn list(&self, path: &str) -> Result<Vec<ListingEntry>, FsError> {
        let real = self.real_path(path)?;
        let mut dir = tokio::fs::read_dir(&real)
            .await
            .map_err(|e| Self::map_io(e, path))?;
        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await.map_err(|e| Self::map_io(e, path))? {
            let name = match item.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping non-UTF-8 entry {:?} in {}", raw, path);
                    continue;
                }
            };
            let virtual_path = crate::helpers::resolve_virtual(path, &name);
            if let Some(entry) = self.entry_for(name, virtual_path, &item.path()).await? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn open_read(&self, path: &str, offset: u64) -> Result<FsReader, FsError> {
        let real = self.real_path(path)?;
        let meta = tokio::fs::metadata(&real)
            .await
            .map_err(|e| Self::map_io(e, path))?;
        if meta.is_dir() {
            return Err(FsError::InvalidInput(format!(
                "{}: is a directory",
                path
            )));
        }
        let mut file = File::open(&real).await.map_err(|e| Self::map_io(e, path))?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))
                .await
                .map_err(|e| Self::map_io(e, path))?;
        }
        Ok(Box::new(file))
    }

    async fn open_write(&self, path: &str, append: bool) -> Result<FsWriter, FsError> {
        let real = self.real_path(path)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(&real)
            .await
            .map_err(|e| Self::map_io(e, path))?;
        Ok(Box::new(file))
    }

    async fn create_unique(&self, parent: &str) -> Result<(FsWriter, String), FsError> {
        let real_parent = self.real_path(parent)?;
        for _ in 0..STOU_NAME_RETRIES {
            let name = format!("stou-{:08x}", rand::random::<u32>());
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(real_parent.join(&name))
                .await
            {
                Ok(file) => return Ok((Box::new(file), name)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(Self::map_io(err, parent)),
            }
        }
        Err(FsError::SystemError(format!(
            "{}: could not pick a unique name",
            parent
        )))
    }

    async fn delete(&self, path: &str) -> Result<(), FsError> {
        let real = self.real_path(path)?;
        let meta = tokio::fs::metadata(&real)
            .await
            .map_err(|e| Self::map_io(e, path))?;
        if meta.is_dir() {
            tokio::fs::remove_dir(&real)
                .await
                .map_err(|e| Self::map_io(e, path))
        } else {
            tokio::fs::remove_file(&real)
                .await
                .map_err(|e| Self::map_io(e, path))
        }
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let real = self.real_path(path)?;
        tokio::fs::create_dir(&real)
            .await
            .map_err(|e| Self::map_io(e, path))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        let real_from = self.real_path(from)?;
        let real_to = self.real_path(to)?;
        tokio::fs::rename(&real_from, &real_to)
            .await
            .map_err(|e| Self::map_io(e, from))
    }
}
