//! Role table: which extra skills, rules, and commands follow an agent.
//!
//! The built-in table is plain data and a catalog may override entries with a
//! `roles.yaml` at its root:
//!
//! ```yaml
//! roles:
//!   backend:
//!     rules: [code-style, testing, api]
//!     extra_skills: [git-commit-helper]
//!     commands: [review]
//!   default:
//!     rules: [code-style]
//! ```

use ckit_discovery::{KitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the catalog-level role override.
pub const ROLES_FILE: &str = "roles.yaml";

const DEFAULT_ROLE: &str = "default";
const DEV_COMMANDS: [&str; 5] = ["commit-msg", "review", "test-gen", "pr-review", "code-only"];
const MOBILE_ROLES: [&str; 4] = [
    "mobile-react-native",
    "mobile-flutter",
    "mobile-ios",
    "mobile-android",
];

/// What a role pulls in besides the agent's own frontmatter skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleProfile {
    /// Skills installed even though the agent does not declare them.
    pub extra_skills: Vec<String>,
    /// Rules installed with the agent.
    pub rules: Vec<String>,
    /// Commands installed with the agent, before `role-<agent>`.
    pub commands: Vec<String>,
}

impl RoleProfile {
    fn new(extra_skills: &[&str], rules: &[&str], commands: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            extra_skills: owned(extra_skills),
            rules: owned(rules),
            commands: owned(commands),
        }
    }
}

/// Expanded dependencies of one agent, ordered and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentDependencies {
    /// Frontmatter skills followed by the role's extra skills.
    pub skills: Vec<String>,
    /// Role rules.
    pub rules: Vec<String>,
    /// Role commands followed by `role-<agent>`.
    pub commands: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RolesDocument {
    #[serde(default)]
    roles: BTreeMap<String, RoleProfile>,
}

/// Role name to profile, with a fallback for unknown roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    roles: BTreeMap<String, RoleProfile>,
    fallback: RoleProfile,
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RoleTable {
    /// The stock table for the BMAD template catalog.
    pub fn builtin() -> Self {
        let git = ["git-commit-helper"];
        let mut dev_plus_security = DEV_COMMANDS.to_vec();
        dev_plus_security.push("security-check");

        let mut table = Self {
            roles: BTreeMap::new(),
            fallback: RoleProfile::new(&[], &["code-style", "security"], &[]),
        };
        table.insert(
            "backend",
            RoleProfile::new(&git, &["code-style", "testing", "security", "api"], &DEV_COMMANDS),
        );
        table.insert(
            "tech-lead",
            RoleProfile::new(
                &git,
                &["code-style", "testing", "security", "api"],
                &dev_plus_security,
            ),
        );
        table.insert(
            "frontend",
            RoleProfile::new(
                &git,
                &["code-style", "testing", "security", "frontend"],
                &DEV_COMMANDS,
            ),
        );
        for role in MOBILE_ROLES {
            table.insert(
                role,
                RoleProfile::new(&git, &["code-style", "testing", "security"], &DEV_COMMANDS),
            );
        }
        for role in ["ui-designer", "ux-designer"] {
            table.insert(role, RoleProfile::new(&[], &["frontend"], &[]));
        }
        table.insert(
            "architect",
            RoleProfile::new(
                &["terraform-review"],
                &["code-style", "security", "api", "infrastructure"],
                &["docs-gen"],
            ),
        );
        table.insert("product-owner", RoleProfile::new(&[], &["documentation"], &[]));
        table.insert(
            "devops",
            RoleProfile::new(
                &git,
                &["infrastructure", "security", "documentation"],
                &["commit-msg"],
            ),
        );
        table.insert(
            "security",
            RoleProfile::new(&["security"], &["security"], &["security-check"]),
        );
        table.insert("pentester", RoleProfile::new(&[], &["security"], &["pentest"]));
        table.insert(
            "finops",
            RoleProfile::new(&["finops"], &["finops", "infrastructure"], &["cost-review"]),
        );
        table
    }

    /// Built-in table with `<catalog>/roles.yaml` applied, when present.
    pub fn load(catalog: &Path) -> Result<Self> {
        let mut table = Self::builtin();
        let path = catalog.join(ROLES_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => {
                table.apply_yaml(&path, &text)?;
                tracing::debug!(path = %path.display(), "Applied role overrides");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(KitError::io(format!("reading {}", path.display()), e)),
        }
        Ok(table)
    }

    /// Replaces entries with those in a `roles.yaml` document. `path` is only
    /// used for error reporting.
    pub fn apply_yaml(&mut self, path: &Path, text: &str) -> Result<()> {
        let doc: RolesDocument = serde_yaml::from_str(text).map_err(|e| KitError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        for (role, profile) in doc.roles {
            self.insert(&role, profile);
        }
        Ok(())
    }

    /// Sets the profile for `role`; `default` replaces the fallback.
    pub fn insert(&mut self, role: &str, profile: RoleProfile) {
        let key = role.to_ascii_lowercase();
        if key == DEFAULT_ROLE {
            self.fallback = profile;
        } else {
            self.roles.insert(key, profile);
        }
    }

    /// Profile for `role` (case-insensitive), or the fallback.
    pub fn profile(&self, role: &str) -> &RoleProfile {
        self.roles
            .get(&role.to_ascii_lowercase())
            .unwrap_or(&self.fallback)
    }

    /// Names with an explicit entry, sorted.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Combines an agent's frontmatter skills with its role profile.
    ///
    /// ```
    /// use ckit_sync::RoleTable;
    ///
    /// let deps = RoleTable::builtin().expand("backend", &["api-design".to_string()]);
    /// assert_eq!(deps.skills, vec!["api-design", "git-commit-helper"]);
    /// assert_eq!(deps.commands.last().unwrap(), "role-backend");
    /// ```
    pub fn expand(&self, agent: &str, frontmatter_skills: &[String]) -> AgentDependencies {
        let profile = self.profile(agent);
        let role_command = format!("role-{agent}");
        AgentDependencies {
            skills: dedup(frontmatter_skills.iter().chain(&profile.extra_skills)),
            rules: dedup(profile.rules.iter()),
            commands: dedup(profile.commands.iter().chain(std::iter::once(&role_command))),
        }
    }
}

fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
