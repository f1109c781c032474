//! # configs
//!
//! Runtime configuration for the board engine. Values come from an
//! optional `ideaboard.toml` next to the binary and the `IDEABOARD_`
//! environment, with serde-backed defaults for everything.

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Undelivered events buffered per change-feed table before a slow
    /// subscriber lags and has to resync.
    pub feed_buffer: usize,
    pub max_title_chars: usize,
    pub max_description_chars: usize,
    pub max_comment_chars: usize,
    pub max_upload_bytes: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            feed_buffer: 256,
            max_title_chars: 120,
            max_description_chars: 4000,
            max_comment_chars: 1000,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

impl BoardConfig {
    /// Loads `.env` first (ignored if absent), then the optional file,
    /// then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let loaded = Config::builder()
            .add_source(File::with_name("ideaboard").required(false))
            .add_source(Environment::with_prefix("IDEABOARD").try_parsing(true))
            .build()?
            .try_deserialize::<BoardConfig>()?;
        debug!(?loaded, "configuration loaded");
        Ok(loaded)
    }
}
