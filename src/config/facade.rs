//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::sources::repository_file::CONFIG_FILE;
use super::NoteVcConfig;
use crate::error::ApiError;
use crate::repository::NOTEVC_DIR;
use std::fs;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the repository rooted at `root`.
    pub fn load(root: &Path) -> Result<NoteVcConfig, ApiError> {
        Ok(MergeService::load(root)?)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<NoteVcConfig, ApiError> {
        Ok(MergeService::load_from_file(path)?)
    }

    /// Create default configuration.
    pub fn default() -> NoteVcConfig {
        NoteVcConfig::default()
    }

    /// Write `config` as the repository config file, replacing any existing one.
    pub fn write_repository_config(root: &Path, config: &NoteVcConfig) -> Result<(), ApiError> {
        let text = toml::to_string_pretty(config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        fs::write(root.join(NOTEVC_DIR).join(CONFIG_FILE), text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(
            &path,
            "author = \"ana\"\n[storage]\ncompression_threshold = 512\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.author.as_deref(), Some("ana"));
        assert_eq!(config.storage.compression_threshold, 512);
        assert!(config.storage.compression);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_repository_file_is_layered() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(NOTEVC_DIR)).unwrap();
        let written = NoteVcConfig {
            author: Some("repo-author".to_string()),
            ..ConfigLoader::default()
        };
        ConfigLoader::write_repository_config(temp.path(), &written).unwrap();

        let loaded = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(loaded.author.as_deref(), Some("repo-author"));
    }

    #[test]
    fn test_missing_repository_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let loaded = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(loaded.storage.compression_threshold, 100);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        fs::write(&path, "storage = [not toml").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(ApiError::ConfigError(_))
        ));
    }
}
