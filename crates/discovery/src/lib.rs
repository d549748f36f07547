//! Component discovery for claude-kit catalogs and project targets.
//!
//! This crate provides mechanisms for:
//! - Scanning a catalog root for agents, skills, commands, and rules.
//! - Reading back what is installed in a project's `.claude` directory.
//! - Extracting descriptions and skill dependencies from YAML frontmatter.
//!
//! # Examples
//!
//! ```
//! use ckit_discovery::{scan_catalog, ComponentKind};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let skill_dir = temp.path().join("skills/alpha");
//! std::fs::create_dir_all(&skill_dir).unwrap();
//! std::fs::write(skill_dir.join("SKILL.md"), "---\ndescription: Alpha\n---\n").unwrap();
//!
//! let categories = scan_catalog(temp.path()).unwrap();
//! assert_eq!(categories.len(), 1);
//! assert_eq!(categories[0].kind, ComponentKind::Skill);
//! assert_eq!(categories[0].components[0].description, "Alpha");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error taxonomy shared across claude-kit crates.
pub mod error;
/// Line-based frontmatter recognizer.
pub mod frontmatter;
/// Catalog and installed-state scanning.
pub mod scanner;
/// Component kinds, components, and categories.
pub mod types;

pub use error::{KitError, Result};
pub use frontmatter::{
    extract_description, extract_skill_deps, parse_description, parse_skill_deps,
};
pub use scanner::{
    component_path, find_referencing_agents, hash_file, hash_tree, installed_set, is_installed,
    scan_catalog, scan_installed, validate_name, SKILL_FILE,
};
pub use types::{Category, Component, ComponentKind};
