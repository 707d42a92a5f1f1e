//! Shared setup for the hybridqa binaries.
use std::path::Path;

use anyhow::Context;
use hybridqa_core::config::{Config, Settings};
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Stdout stays
/// free for command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn load_config(dir: &Path) -> anyhow::Result<(Config, Settings)> {
    let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = Config::load_from(dir, &env_name)
        .with_context(|| format!("loading configuration from {}", dir.display()))?;
    let settings = config.settings()?;
    Ok((config, settings))
}
