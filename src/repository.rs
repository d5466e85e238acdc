//! Repository
//!
//! A repository is a working directory with a `.notevc/` metadata directory:
//!
//! ```text
//! .notevc/
//!   metadata.json   RepoMetadata
//!   timeline.json   commits, newest first
//!   config.toml     optional repository config
//!   objects/        blob store
//!   blocks/         snapshot tree
//! ```

mod metadata;

pub use metadata::{CommitInfo, RepoConfig, RepoMetadata};

use crate::config::{ConfigLoader, NoteVcConfig};
use crate::error::ApiError;
use crate::snapshot::SnapshotStore;
use crate::store::FsObjectStore;
use crate::timeline::{CommitEntry, Timeline};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the metadata directory at the repository root
pub const NOTEVC_DIR: &str = ".notevc";

const METADATA_FILE: &str = "metadata.json";
const TIMELINE_FILE: &str = "timeline.json";
const OBJECTS_DIR: &str = "objects";
const BLOCKS_DIR: &str = "blocks";

/// Handle on a repository root and its configuration
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    config: NoteVcConfig,
}

impl Repository {
    /// Open the directory at `path`, which may or may not be initialized yet.
    pub fn at(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(ApiError::FileNotFound(path.display().to_string()));
        }
        let root = path.canonicalize()?;
        let config = ConfigLoader::load(&root)?;
        Ok(Self { root, config })
    }

    /// Find the repository containing `dir` by walking up its ancestors.
    pub fn find_from(dir: impl AsRef<Path>) -> Result<Self, ApiError> {
        let dir = dir.as_ref();
        let start = dir
            .canonicalize()
            .map_err(|_| ApiError::NotARepository(dir.to_path_buf()))?;
        for candidate in start.ancestors() {
            if candidate.join(NOTEVC_DIR).is_dir() {
                tracing::debug!(root = %candidate.display(), "Found repository");
                return Self::at(candidate);
            }
        }
        Err(ApiError::NotARepository(dir.to_path_buf()))
    }

    /// Find the repository containing the current directory
    pub fn find() -> Result<Self, ApiError> {
        Self::find_from(std::env::current_dir()?)
    }

    /// Create `.notevc/` with empty stores, metadata and a default config file.
    pub fn init(&self) -> Result<RepoMetadata, ApiError> {
        if self.is_initialized() {
            return Err(ApiError::AlreadyInitialized(self.root.clone()));
        }

        fs::create_dir_all(self.objects_dir())?;
        fs::create_dir_all(self.blocks_dir())?;

        let metadata = RepoMetadata::new(
            Utc::now(),
            RepoConfig {
                compression_enabled: self.config.storage.compression,
                ..RepoConfig::default()
            },
        );
        metadata.save(&self.metadata_path())?;
        self.timeline().init()?;
        ConfigLoader::write_repository_config(&self.root, &self.config)?;

        tracing::info!(root = %self.root.display(), "Initialized repository");
        Ok(metadata)
    }

    pub fn is_initialized(&self) -> bool {
        self.notevc_dir().is_dir()
    }

    /// Fail with `NotARepository` unless `.notevc/` exists
    pub fn require_initialized(&self) -> Result<(), ApiError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ApiError::NotARepository(self.root.clone()))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &NoteVcConfig {
        &self.config
    }

    pub fn notevc_dir(&self) -> PathBuf {
        self.root.join(NOTEVC_DIR)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.notevc_dir().join(METADATA_FILE)
    }

    pub fn timeline_path(&self) -> PathBuf {
        self.notevc_dir().join(TIMELINE_FILE)
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.notevc_dir().join(OBJECTS_DIR)
    }

    pub fn blocks_dir(&self) -> PathBuf {
        self.notevc_dir().join(BLOCKS_DIR)
    }

    pub fn object_store(&self) -> Arc<FsObjectStore> {
        let storage = &self.config.storage;
        Arc::new(
            FsObjectStore::new(self.objects_dir())
                .with_compression(storage.compression, storage.compression_threshold),
        )
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.blocks_dir(), self.object_store())
    }

    pub fn timeline(&self) -> Timeline {
        Timeline::new(self.timeline_path())
    }

    pub fn metadata(&self) -> Result<RepoMetadata, ApiError> {
        self.require_initialized()?;
        RepoMetadata::load(&self.metadata_path())
    }

    pub fn save_metadata(&self, metadata: &RepoMetadata) -> Result<(), ApiError> {
        metadata.save(&self.metadata_path())
    }

    /// Install the global subscriber from this repository's logging config,
    /// with the default log file scoped to the repository root.
    pub fn init_logging(&self) -> Result<(), ApiError> {
        crate::logging::init_logging(Some(&self.config.logging), Some(&self.root))
    }

    /// Record `entry` as the head commit. Written after the timeline, as a
    /// separate step.
    pub fn update_head(&self, entry: &CommitEntry) -> Result<(), ApiError> {
        let mut metadata = self.metadata()?;
        metadata.advance_head(entry);
        self.save_metadata(&metadata)
    }

    /// Normalize a user-supplied note path to a repository-relative,
    /// `/`-separated path. Absolute paths inside the root are made relative.
    pub fn relative_path(&self, file: &str) -> String {
        let path = Path::new(file);
        let relative = if path.is_absolute() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            canonical
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or(canonical)
        } else {
            path.to_path_buf()
        };
        relative
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
