//! Hue-DMX - mirrors Philips Hue lights onto DMX512 fixtures
//!
//! Usage: `hue-dmx [CONFIG]`. Without an argument the path comes from
//! `HUEDMX_CONFIG`, then falls back to `hue-dmx.toml`.

mod app;
mod heartbeat;
mod logging_setup;

use anyhow::{Context, Result};
use huedmx_core::AppConfig;
use std::path::PathBuf;

const CONFIG_ENV: &str = "HUEDMX_CONFIG";
const DEFAULT_CONFIG: &str = "hue-dmx.toml";

fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn main() -> Result<()> {
    let path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let config = AppConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;

    let _log_guard = logging_setup::init(&config.log)?;
    tracing::info!("Hue-DMX {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Configuration: {:?}", config.bridge);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("hue-dmx-worker")
        .build()
        .context("Failed to create Tokio runtime")?;

    let result = runtime.block_on(app::run(config));
    if let Err(e) = &result {
        tracing::error!("Fatal: {:#}", e);
    }
    result
}
