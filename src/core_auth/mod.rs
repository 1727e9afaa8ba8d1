mod core_auth;

pub use core_auth::{PasswdEntry, PasswdFileStore, UserStore};
