//! Environment, filesystem, and settings state for claude-kit.
//!
//! This crate provides utilities for:
//! - Resolving the template catalog, project root, and `.claude` target.
//! - Writing files atomically (temp file in the destination directory, then rename).
//! - Reading and patching the `teammateMode` key of `settings.json`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Home, catalog, project, and target resolution.
pub mod env;
/// Atomic writes and copies.
pub mod io;
/// `settings.json` teammate mode.
pub mod settings;

pub use env::{
    home_dir, project_root, target_dir, template_dir, TARGET_DIR_NAME, TEMPLATE_DIR_ENV,
};
pub use io::{atomic_write, copy_dir_atomic, copy_dir_filtered, copy_file_atomic};
pub use settings::{
    patch_teammate_mode, read_teammate_mode, stored_teammate_mode, TeammateMode, SETTINGS_FILE,
};
