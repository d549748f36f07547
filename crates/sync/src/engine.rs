//! Install, remove, and sync components between a catalog and a target.

use crate::report::{
    AgentReport, BatchReport, DepOrigin, DepOutcome, DepStatus, InstallOutcome, RemoveOutcome,
    SkipReason, SyncReport,
};
use crate::roles::RoleTable;
use ckit_discovery::{
    component_path, extract_skill_deps, find_referencing_agents, hash_tree, is_installed,
    scan_installed, validate_name, ComponentKind, KitError, Result, SKILL_FILE,
};
use ckit_state::{
    copy_dir_filtered, copy_file_atomic, patch_teammate_mode, stored_teammate_mode,
    SETTINGS_FILE,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Project instructions file copied alongside `settings.json`.
pub const CLAUDE_MD: &str = "CLAUDE.md";

const BASE_FILES: [&str; 2] = [CLAUDE_MD, SETTINGS_FILE];

/// A template catalog paired with one project's `.claude` target.
#[derive(Debug, Clone)]
pub struct Kit {
    catalog: PathBuf,
    target: PathBuf,
    roles: RoleTable,
}

impl Kit {
    /// Creates a kit with an explicit role table.
    pub fn new(catalog: impl Into<PathBuf>, target: impl Into<PathBuf>, roles: RoleTable) -> Self {
        Self {
            catalog: catalog.into(),
            target: target.into(),
            roles,
        }
    }

    /// Creates a kit whose role table honours the catalog's `roles.yaml`.
    pub fn open(catalog: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Result<Self> {
        let catalog = catalog.into();
        let roles = RoleTable::load(&catalog)?;
        Ok(Self::new(catalog, target, roles))
    }

    /// Catalog root.
    pub fn catalog(&self) -> &Path {
        &self.catalog
    }

    /// Target (`.claude`) directory.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Role table used for dependency expansion.
    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Whether the target has the component.
    pub fn is_installed(&self, kind: ComponentKind, name: &str) -> bool {
        is_installed(&self.target, kind, name)
    }

    /// Whether the catalog offers the component.
    pub fn in_catalog(&self, kind: ComponentKind, name: &str) -> bool {
        is_installed(&self.catalog, kind, name)
    }

    /// Skills declared in the catalog copy of an agent.
    pub fn declared_skills(&self, agent: &str) -> Vec<String> {
        extract_skill_deps(&component_path(&self.catalog, ComponentKind::Agent, agent))
    }

    /// Copies one component from the catalog, replacing any installed copy.
    ///
    /// Skills are copied file by file, recursively; other kinds are a single
    /// markdown file. Every file is written atomically.
    pub fn install(&self, kind: ComponentKind, name: &str) -> Result<InstallOutcome> {
        self.copy_component(kind, name, &[])
    }

    /// Copies a component, leaving out the nested directories in `skip`.
    fn copy_component(
        &self,
        kind: ComponentKind,
        name: &str,
        skip: &[PathBuf],
    ) -> Result<InstallOutcome> {
        validate_name(kind, name)?;
        let src = component_path(&self.catalog, kind, name);
        if !self.in_catalog(kind, name) {
            let checked = if kind.is_directory() {
                src.join(SKILL_FILE)
            } else {
                src
            };
            return Err(KitError::not_found(format!("{} {name}", kind.label()), checked));
        }

        let existed = self.is_installed(kind, name);
        let dst = component_path(&self.target, kind, name);
        if kind.is_directory() {
            copy_dir_filtered(&src, &dst, |rel| skip.iter().any(|s| s == rel))?;
        } else {
            copy_file_atomic(&src, &dst)?;
        }
        tracing::info!(kind = kind.label(), name, updated = existed, "Installed component");

        Ok(if existed {
            InstallOutcome::Updated
        } else {
            InstallOutcome::Installed
        })
    }

    /// Installs a dependency unless it is already present. Never fails.
    pub(crate) fn install_dependency(
        &self,
        kind: ComponentKind,
        name: &str,
        origin: DepOrigin,
    ) -> DepOutcome {
        let status = if self.is_installed(kind, name) {
            DepStatus::AlreadyPresent
        } else {
            match self.install(kind, name) {
                Ok(_) => DepStatus::Added,
                Err(e) if e.is_not_found() => {
                    if origin == DepOrigin::Frontmatter {
                        tracing::warn!(kind = kind.label(), name, "Declared dependency missing from catalog");
                    } else {
                        tracing::debug!(kind = kind.label(), name, "Optional dependency not in catalog");
                    }
                    DepStatus::Missing
                }
                Err(e) => {
                    tracing::warn!(kind = kind.label(), name, error = %e, "Dependency install failed");
                    DepStatus::Failed(e.to_string())
                }
            }
        };
        DepOutcome {
            kind,
            name: name.to_string(),
            origin,
            status,
        }
    }

    /// Installs an agent, then every skill, rule, and command it implies.
    ///
    /// Only the agent copy itself can fail this call; dependency problems are
    /// recorded in the report.
    pub fn install_agent(&self, name: &str) -> Result<AgentReport> {
        let outcome = self.install(ComponentKind::Agent, name)?;
        let declared = self.declared_skills(name);
        let deps = self.roles.expand(name, &declared);

        let mut report = AgentReport {
            agent: name.to_string(),
            outcome,
            deps: Vec::with_capacity(deps.skills.len() + deps.rules.len() + deps.commands.len()),
        };
        for skill in &deps.skills {
            let origin = if declared.contains(skill) {
                DepOrigin::Frontmatter
            } else {
                DepOrigin::Role
            };
            report
                .deps
                .push(self.install_dependency(ComponentKind::Skill, skill, origin));
        }
        for rule in &deps.rules {
            report
                .deps
                .push(self.install_dependency(ComponentKind::Rule, rule, DepOrigin::Role));
        }
        for command in &deps.commands {
            report
                .deps
                .push(self.install_dependency(ComponentKind::Command, command, DepOrigin::Role));
        }
        Ok(report)
    }

    /// Installs each named component, continuing past failures.
    pub fn install_all<S: AsRef<str>>(
        &self,
        kind: ComponentKind,
        names: &[S],
    ) -> BatchReport<InstallOutcome> {
        BatchReport {
            items: names
                .iter()
                .map(|n| (n.as_ref().to_string(), self.install(kind, n.as_ref())))
                .collect(),
        }
    }

    /// Installs each named agent with its dependencies, continuing past failures.
    pub fn install_agents<S: AsRef<str>>(&self, names: &[S]) -> BatchReport<AgentReport> {
        BatchReport {
            items: names
                .iter()
                .map(|n| (n.as_ref().to_string(), self.install_agent(n.as_ref())))
                .collect(),
        }
    }

    /// Removes an installed component.
    ///
    /// Removing a skill still referenced by installed agents goes ahead; the
    /// agents are returned so the caller can warn.
    pub fn remove(&self, kind: ComponentKind, name: &str) -> Result<RemoveOutcome> {
        validate_name(kind, name)?;
        if !self.is_installed(kind, name) {
            return Ok(RemoveOutcome::NotInstalled);
        }
        let referenced_by = if kind == ComponentKind::Skill {
            find_referencing_agents(&self.target, name)
        } else {
            Vec::new()
        };

        let path = component_path(&self.target, kind, name);
        let removed = if kind.is_directory() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| KitError::io(format!("removing {kind}/{name}"), e))?;
        tracing::info!(kind = kind.label(), name, "Removed component");

        Ok(RemoveOutcome::Removed { referenced_by })
    }

    /// Copies `CLAUDE.md` and `settings.json` from the catalog when present.
    /// Returns the names copied.
    pub fn copy_base_files(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.target)
            .map_err(|e| KitError::io(format!("creating {}", self.target.display()), e))?;
        let mut copied = Vec::new();
        for file in BASE_FILES {
            let src = self.catalog.join(file);
            if src.is_file() {
                copy_file_atomic(&src, &self.target.join(file))?;
                copied.push(file.to_string());
            }
        }
        Ok(copied)
    }

    /// Copies the base files only when the target has no `CLAUDE.md` yet.
    pub fn ensure_base_files(&self) -> Result<Vec<String>> {
        if self.target.join(CLAUDE_MD).exists() {
            return Ok(Vec::new());
        }
        self.copy_base_files()
    }

    fn is_current(&self, kind: ComponentKind, name: &str, skip: &[PathBuf]) -> bool {
        let skipped = |rel: &Path| skip.iter().any(|s| s == rel);
        let src = hash_tree(&component_path(&self.catalog, kind, name), skipped);
        let dst = hash_tree(&component_path(&self.target, kind, name), skipped);
        matches!((src, dst), (Ok(a), Ok(b)) if a == b)
    }

    /// Nested skills under the catalog copy of `group` that `installed` lacks,
    /// as paths relative to the group directory.
    fn untracked_nested_skills(
        &self,
        group: &str,
        installed: &BTreeSet<(ComponentKind, String)>,
    ) -> Vec<PathBuf> {
        let dir = component_path(&self.catalog, ComponentKind::Skill, group);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().join(SKILL_FILE).is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|child| {
                !installed.contains(&(ComponentKind::Skill, format!("{group}/{child}")))
            })
            .map(PathBuf::from)
            .collect()
    }

    /// Refreshes every installed component from the catalog.
    ///
    /// Base files are always re-copied, keeping a teammate mode the project
    /// had set. Components the catalog lacks are left alone, and nothing new
    /// is added: a grouping skill is refreshed without the nested skills the
    /// project does not have.
    pub fn sync(&self) -> Result<SyncReport> {
        if !self.target.is_dir() {
            return Err(KitError::not_found("target directory", &self.target));
        }
        let installed = scan_installed(&self.target)?;
        let snapshot: BTreeSet<(ComponentKind, String)> = installed
            .iter()
            .flat_map(|cat| cat.components.iter().map(|c| (c.kind, c.name.clone())))
            .collect();
        let mode = stored_teammate_mode(&self.target).ok().flatten();

        let mut report = SyncReport {
            base_files: self.copy_base_files()?,
            ..SyncReport::default()
        };
        if let Some(mode) = mode {
            if report.base_files.iter().any(|f| f == SETTINGS_FILE)
                && stored_teammate_mode(&self.target).ok().flatten() != Some(mode)
            {
                patch_teammate_mode(&self.target, mode)?;
            }
        }

        for category in installed {
            for component in category.components {
                let key = component.key();
                if !self.in_catalog(component.kind, &component.name) {
                    tracing::debug!(component = %key, "Not in catalog, leaving as is");
                    report.skipped.push(SkipReason::NotInCatalog { item: key });
                    continue;
                }
                let skip = if component.kind == ComponentKind::Skill
                    && !component.name.contains('/')
                {
                    self.untracked_nested_skills(&component.name, &snapshot)
                } else {
                    Vec::new()
                };
                if self.is_current(component.kind, &component.name, &skip) {
                    report.skipped.push(SkipReason::Unchanged { item: key });
                    continue;
                }
                match self.copy_component(component.kind, &component.name, &skip) {
                    Ok(_) => report.updated.push(key),
                    Err(e) => {
                        tracing::warn!(component = %key, error = %e, "Sync failed for component");
                        report.failed.push((key, e.to_string()));
                    }
                }
            }
        }
        Ok(report)
    }
}
