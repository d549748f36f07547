//! Stack detection and the generated `docs-index.md` for claude-kit projects.
//!
//! [`MarkerTable`] looks for dependency files, framework names inside them,
//! Terraform sources, and well-known directories. [`generate`] turns the
//! result into a docs index with per-technology directives and records a
//! dependency hash so [`staleness`] can tell when it needs refreshing.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Technology markers and the dependency hash.
pub mod detect;
/// Docs index rendering and staleness.
pub mod docs;

pub use detect::{dependency_hash, MarkerTable, StackDetector, Tech, TechCategory};
pub use docs::{
    generate, generate_at, render_index, staleness, DocsMeta, Staleness, DOCS_INDEX_FILE,
    DOCS_META_FILE, STALE_DAYS,
};
