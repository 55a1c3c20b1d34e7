//! Command line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

const MIN_TICK_MS: u64 = 50;
const MAX_TICK_MS: u64 = 5000;

#[derive(Parser, Debug, Clone)]
#[command(name = "audiobook-rs", version, about = "Terminal audiobook player")]
pub struct Config {
    /// Catalog to open on startup
    #[arg(env = "AUDIOBOOK_CATALOG", default_value = "Fables")]
    pub catalog: String,

    /// Directory that holds the catalogs
    #[arg(long, env = "AUDIOBOOK_LIBRARY", default_value = ".")]
    pub library: PathBuf,

    /// How often the playback position is sampled, in milliseconds
    #[arg(long = "tick-interval-ms", env = "AUDIOBOOK_TICK_MS", default_value_t = 500)]
    pub tick_interval_ms: u64,

    #[arg(long, env = "AUDIOBOOK_LOG_DIR", default_value = ".logs")]
    pub log_dir: PathBuf,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.clamp(MIN_TICK_MS, MAX_TICK_MS))
    }
}
