use crate::config::Config;
use crate::core_auth::UserStore;
use crate::core_filter::FilterApplicator;
use crate::core_fs::FileSystem;
use crate::core_network::pasv::PasvHandle;
use crate::registry::Registry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The service bundle handed to every connection. Immutable after boot
/// except for the `suspended` flag, which is read at connection start.
pub struct FtpState {
    pub config: Arc<Config>,
    pub fs: Arc<dyn FileSystem>,
    pub users: Arc<dyn UserStore>,
    pub filters: FilterApplicator,
    pub registry: Arc<Registry>,
    pub pasv: PasvHandle,
    suspended: AtomicBool,
}

impl FtpState {
    pub fn new(
        config: Arc<Config>,
        fs: Arc<dyn FileSystem>,
        users: Arc<dyn UserStore>,
        registry: Arc<Registry>,
        pasv: PasvHandle,
    ) -> Self {
        let suspended = config.suspended();
        Self {
            config,
            fs,
            users,
            filters: FilterApplicator::new(),
            registry,
            pasv,
            suspended: AtomicBool::new(suspended),
        }
    }

    pub fn suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    pub fn set_suspended(&self, value: bool) {
        self.suspended.store(value, Ordering::Relaxed);
    }
}
