//! MergeService: orchestrates sources, applies merge policy, deserializes to NoteVcConfig.

use crate::config::sources::{environment, global_file, repository_file};
use crate::config::NoteVcConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config for the repository rooted at `root`.
    /// Precedence: global file (lowest) -> repository file -> environment (highest).
    pub fn load(root: &Path) -> Result<NoteVcConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = repository_file::add_to_builder(builder, root)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<NoteVcConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
