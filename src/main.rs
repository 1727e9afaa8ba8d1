mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_filter;
mod core_fs;
mod core_ftpcommand;
mod core_network;
mod helpers;
mod registry;
mod reply;
mod server;
mod session;
mod state;

use crate::core_cli::Cli;
use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Determine the default config path based on the OS
    let default_config_path = if cfg!(target_os = "windows") {
        "C:\\oxidftpd\\etc\\oxidftpd.conf"
    } else {
        "/etc/oxidftpd.conf"
    };

    let config_path = if args.config.is_empty() {
        default_config_path
    } else {
        args.config.as_str()
    };
    let config = match config::Config::load_from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{:#}; falling back to built-in defaults", e);
            config::Config::default()
        }
    };

    server::run(config).await
}
