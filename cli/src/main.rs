//! Ferry command line: drive the wallet services against a live node and explorer.

mod commands;

use clap::Parser;
use ferry_utils::{init_logging, LogFormat};
use ferry_wallet_core::WalletConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ferry", about = "Ferry wallet command line")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "FERRY_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the node REST API.
    #[arg(long, env = "FERRY_NODE_HOST")]
    node_host: Option<String>,

    /// Base URL of the explorer REST API.
    #[arg(long, env = "FERRY_EXPLORER_API_HOST")]
    explorer_api_host: Option<String>,

    /// Transactions fetched per explorer page.
    #[arg(long, env = "FERRY_SYNC_PAGE_LIMIT")]
    sync_page_limit: Option<u32>,

    /// Seconds between two syncs in `watch`.
    #[arg(long, env = "FERRY_SYNC_INTERVAL_SECS")]
    sync_interval_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FERRY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FERRY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: commands::Command,
}

impl Cli {
    /// File (or defaults) first, then flags and env vars on top.
    fn resolve_config(&self) -> anyhow::Result<WalletConfig> {
        let base = match &self.config {
            Some(path) => WalletConfig::from_toml_file(path)?,
            None => WalletConfig::default(),
        };
        let config = WalletConfig {
            node_host: self.node_host.clone().unwrap_or(base.node_host),
            explorer_api_host: self
                .explorer_api_host
                .clone()
                .unwrap_or(base.explorer_api_host),
            sync_page_limit: self.sync_page_limit.unwrap_or(base.sync_page_limit),
            sync_interval_secs: self.sync_interval_secs.unwrap_or(base.sync_interval_secs),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    commands::run(cli.command, &config).await
}
