pub mod ascii;

use crate::core_fs::{FsReader, FsWriter};
use crate::session::{Session, TransferType};
use ascii::AsciiFilter;
use std::sync::Arc;

/// A byte-stream transform sitting between the filesystem and the data
/// connection. Filters that change the byte count (ASCII line-ending
/// translation does) veto REST/APPE/SIZE.
pub trait DataFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn modifies_data_length(&self) -> bool;

    fn wrap_read(&self, inner: FsReader) -> FsReader;

    fn wrap_write(&self, inner: FsWriter) -> FsWriter;
}

/// Decides which filters apply to a session and wraps channels with them.
pub struct FilterApplicator {
    ascii: Arc<dyn DataFilter>,
}

impl FilterApplicator {
    pub fn new() -> Self {
        Self {
            ascii: Arc::new(AsciiFilter),
        }
    }

    pub fn filters(&self, session: &Session) -> Vec<Arc<dyn DataFilter>> {
        match session.transfer_type {
            TransferType::Ascii => vec![Arc::clone(&self.ascii)],
            TransferType::Image => Vec::new(),
        }
    }

    /// True when any active filter may change the transferred byte count.
    pub fn modifies_length(&self, session: &Session) -> bool {
        self.filters(session)
            .iter()
            .any(|f| f.modifies_data_length())
    }

    pub fn apply_read(&self, session: &Session, mut reader: FsReader) -> FsReader {
        for filter in self.filters(session) {
            reader = filter.wrap_read(reader);
        }
        reader
    }

    pub fn apply_write(&self, session: &Session, mut writer: FsWriter) -> FsWriter {
        for filter in self.filters(session) {
            writer = filter.wrap_write(writer);
        }
        writer
    }
}

impl Default for FilterApplicator {
    fn default() -> Self {
        Self::new()
    }
}
