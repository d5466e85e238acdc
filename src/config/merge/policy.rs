//! Base builder carrying built-in defaults.

use crate::store::COMPRESSION_THRESHOLD;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with defaults; every later source overrides these.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.compression", true)?
        .set_default("storage.compression_threshold", COMPRESSION_THRESHOLD as i64)?
        .set_default("logging.level", "info")
}
