//! Repository config: <root>/.notevc/config.toml

use crate::repository::NOTEVC_DIR;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";

/// Add the repository config file (optional).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = root.join(NOTEVC_DIR).join(CONFIG_FILE);
    Ok(builder.add_source(
        File::from(path)
            .format(FileFormat::Toml)
            .required(false),
    ))
}
