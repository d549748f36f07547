//! Reporting types for install, sync, and bundle operations.

use ckit_discovery::{ComponentKind, KitError};
use serde::Serialize;

/// Whether a single-component install created or replaced the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    /// The component was not present before.
    Installed,
    /// An existing copy was overwritten from the catalog.
    Updated,
}

/// Result of removing one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RemoveOutcome {
    /// Nothing to remove; the target was not touched.
    NotInstalled,
    /// Removed. For skills, installed agents that still list it.
    Removed {
        /// Agent names, sorted.
        referenced_by: Vec<String>,
    },
}

/// Why a dependency was pulled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepOrigin {
    /// Listed in the agent's `skills:` frontmatter.
    Frontmatter,
    /// Derived from the role table.
    Role,
    /// Part of a fixed bundle.
    Bundle,
}

/// What happened to one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DepStatus {
    /// Copied into the target.
    Added,
    /// Already installed, left as is.
    AlreadyPresent,
    /// Not in the catalog.
    Missing,
    /// Copy failed.
    Failed(String),
}

/// One dependency and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepOutcome {
    /// Dependency kind.
    pub kind: ComponentKind,
    /// Dependency name.
    pub name: String,
    /// Where the dependency came from.
    pub origin: DepOrigin,
    /// What happened.
    pub status: DepStatus,
}

impl DepOutcome {
    /// `kind/name`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

/// Per-agent install report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    /// Agent name.
    pub agent: String,
    /// Whether the agent file was new.
    pub outcome: InstallOutcome,
    /// Every dependency in install order: skills, rules, commands.
    pub deps: Vec<DepOutcome>,
}

impl AgentReport {
    /// Dependencies with the given status.
    pub fn with_status<'a>(
        &'a self,
        pred: impl Fn(&DepStatus) -> bool + 'a,
    ) -> impl Iterator<Item = &'a DepOutcome> + 'a {
        self.deps.iter().filter(move |d| pred(&d.status))
    }

    /// Dependencies copied by this install.
    pub fn added(&self) -> impl Iterator<Item = &DepOutcome> {
        self.with_status(|s| matches!(s, DepStatus::Added))
    }

    /// Skills the agent declares that the catalog lacks.
    pub fn missing_declared_skills(&self) -> impl Iterator<Item = &DepOutcome> {
        self.deps.iter().filter(|d| {
            d.origin == DepOrigin::Frontmatter && matches!(d.status, DepStatus::Missing)
        })
    }

    /// Dependencies whose copy failed.
    pub fn failed(&self) -> impl Iterator<Item = &DepOutcome> {
        self.with_status(|s| matches!(s, DepStatus::Failed(_)))
    }
}

/// Per-name results of a batch operation, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Each requested name and what happened to it.
    pub items: Vec<(String, Result<T, KitError>)>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> BatchReport<T> {
    /// Items that succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items
            .iter()
            .filter_map(|(name, r)| r.as_ref().ok().map(|v| (name.as_str(), v)))
    }

    /// Items that failed.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &KitError)> {
        self.items
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

/// Reasons an installed component was not refreshed during sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SkipReason {
    /// The catalog has no such component (user-created or removed upstream).
    NotInCatalog {
        /// `kind/name`.
        item: String,
    },
    /// Installed copy already matches the catalog.
    Unchanged {
        /// `kind/name`.
        item: String,
    },
}

impl SkipReason {
    /// Returns a human-readable description of the skip reason.
    pub fn description(&self) -> String {
        match self {
            Self::NotInCatalog { item } => format!("{item} not in catalog, left untouched"),
            Self::Unchanged { item } => format!("{item} unchanged (same hash)"),
        }
    }
}

/// Outcome of a sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Base files refreshed (`CLAUDE.md`, `settings.json`).
    pub base_files: Vec<String>,
    /// Components re-copied from the catalog (`kind/name`).
    pub updated: Vec<String>,
    /// Components not re-copied, with the reason.
    pub skipped: Vec<SkipReason>,
    /// Components whose refresh failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    /// Components that now match the catalog.
    pub fn total_current(&self) -> usize {
        self.updated.len()
            + self
                .skipped
                .iter()
                .filter(|s| matches!(s, SkipReason::Unchanged { .. }))
                .count()
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let unchanged = self.total_current() - self.updated.len();
        let foreign = self.skipped.len() - unchanged;
        let mut out = format!(
            "Updated {} components ({} unchanged)",
            self.updated.len(),
            unchanged
        );
        if foreign > 0 {
            out.push_str(&format!(", {foreign} not in catalog"));
        }
        if !self.failed.is_empty() {
            out.push_str(&format!(", {} failed", self.failed.len()));
        }
        out
    }
}

/// Outcome of the BMAD bundle install.
#[derive(Debug, Default)]
pub struct BundleReport {
    /// Core agents with their dependencies.
    pub agents: BatchReport<AgentReport>,
    /// Workflow commands.
    pub commands: Vec<DepOutcome>,
    /// Base rules.
    pub rules: Vec<DepOutcome>,
}

/// Outcome of applying an install plan.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Base files copied.
    pub base_files: Vec<String>,
    /// `kind/name` of every component copied.
    pub installed: Vec<String>,
    /// `kind/name` of planned components the catalog lacks.
    pub missing: Vec<String>,
    /// `kind/name` and error for failed copies.
    pub failed: Vec<(String, String)>,
}
