//! Filesystem locations of configuration files.

pub mod xdg_root;
