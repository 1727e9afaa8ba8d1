use crate::config::Config;
use crate::core_auth::{PasswdFileStore, UserStore};
use crate::core_fs::local::LocalFs;
use crate::core_fs::FileSystem;
use crate::core_network::{network, pasv};
use crate::registry::Registry;
use crate::state::FtpState;
use anyhow::{Context, Result};
use log::info;
use std::net::IpAddr;
use std::sync::Arc;

/// Wires the service bundle together and runs the FTP server.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config: {:?}", config);

    let config = Arc::new(config);
    let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::new(&config.server.homedir));
    let users: Arc<dyn UserStore> =
        Arc::new(PasswdFileStore::from_file(&config.server.passwd_file));
    let registry = Arc::new(Registry::new());

    let pasv_ip: IpAddr = config
        .server
        .pasv_address
        .parse()
        .with_context(|| format!("Bad pasv_address: {}", config.server.pasv_address))?;
    let pasv = pasv::spawn_pool(pasv_ip, config.server.pasv_ports.clone());

    let state = Arc::new(FtpState::new(config, fs, users, registry, pasv));
    network::start_server(state).await
}
