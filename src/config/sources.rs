//! Config sources, one per layer.

pub mod environment;
pub mod global_file;
pub mod repository_file;
