//! Install, remove, and sync engine for claude-kit.
//!
//! A [`Kit`] pairs a template catalog with one project's `.claude` target.
//! Agents pull in the skills their frontmatter declares plus whatever the
//! [`RoleTable`] associates with their role.
//!
//! # Examples
//!
//! ```
//! use ckit_sync::{DepStatus, Kit};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let tmp = tempdir().unwrap();
//! let catalog = tmp.path().join("catalog");
//! fs::create_dir_all(catalog.join("agents")).unwrap();
//! fs::create_dir_all(catalog.join("skills/api-design")).unwrap();
//! fs::write(
//!     catalog.join("agents/backend.md"),
//!     "---\nskills:\n  - api-design\n---\n",
//! )
//! .unwrap();
//! fs::write(catalog.join("skills/api-design/SKILL.md"), "# API").unwrap();
//!
//! let kit = Kit::open(&catalog, tmp.path().join("project/.claude")).unwrap();
//! let report = kit.install_agent("backend").unwrap();
//! assert_eq!(report.deps[0].name, "api-design");
//! assert_eq!(report.deps[0].status, DepStatus::Added);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use ckit_discovery::{KitError, Result};

/// Install/remove/sync operations on [`Kit`].
pub mod engine;
/// Install plans and the BMAD bundle.
pub mod plan;
/// Reports returned by engine operations.
pub mod report;
/// Role table and dependency expansion.
pub mod roles;

pub use engine::{Kit, CLAUDE_MD};
pub use plan::{
    InstallPlan, BASE_RULES, BMAD_AGENTS, BMAD_COMMANDS, BMAD_WORKFLOW_COMMANDS, SYNC_COMMAND,
    TEAMS_RULE,
};
pub use report::{
    AgentReport, ApplyReport, BatchReport, BundleReport, DepOrigin, DepOutcome, DepStatus,
    InstallOutcome, RemoveOutcome, SkipReason, SyncReport,
};
pub use roles::{AgentDependencies, RoleProfile, RoleTable, ROLES_FILE};
