//! Multi-agent install plans and the BMAD bundle.

use crate::engine::Kit;
use crate::report::{ApplyReport, BundleReport, DepOrigin};
use ckit_discovery::{ComponentKind, Result};
use ckit_state::{patch_teammate_mode, TeammateMode};
use serde::Serialize;
use std::collections::BTreeSet;

/// Core BMAD agents.
pub const BMAD_AGENTS: [&str; 3] = ["product-owner", "architect", "tech-lead"];

/// Commands installed by the BMAD bundle.
pub const BMAD_COMMANDS: [&str; 27] = [
    "bmad-run",
    "bmad-break",
    "bmad-model",
    "bmad-act",
    "bmad-deliver",
    "principles",
    "clarify",
    "analyze",
    "checklist",
    "ralph",
    "ralph-loop",
    "ralph-cancel",
    "r",
    "p",
    "c",
    "g",
    "gsd-prep",
    "role-product-owner",
    "role-architect",
    "role-tech-lead",
    "review",
    "test-gen",
    "security-check",
    "commit-msg",
    "code-only",
    "docs-gen",
    "pr-review",
];

/// Workflow commands added to a plan when the bundle is accepted.
pub const BMAD_WORKFLOW_COMMANDS: [&str; 8] = [
    "bmad-run",
    "bmad-break",
    "bmad-model",
    "bmad-act",
    "bmad-deliver",
    "ralph",
    "ralph-loop",
    "ralph-cancel",
];

/// Rules every BMAD project gets.
pub const BASE_RULES: [&str; 4] = ["code-style", "testing", "security", "documentation"];

/// Command added to every plan.
pub const SYNC_COMMAND: &str = "ck-sync";

/// Rule added when more than one agent is planned.
pub const TEAMS_RULE: &str = "agent-teams";

/// Everything an `init` run will install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    /// Selected agents, in selection order.
    pub agents: Vec<String>,
    /// Union of agent skills, sorted.
    pub skills: Vec<String>,
    /// Union of agent commands plus bundle and sync commands, sorted.
    pub commands: Vec<String>,
    /// Union of agent rules plus bundle and team rules, sorted.
    pub rules: Vec<String>,
    /// Written into `settings.json`.
    pub teammate_mode: TeammateMode,
    /// Whether the BMAD bundle was folded in.
    pub bundle: bool,
}

impl InstallPlan {
    /// More than one agent.
    pub fn is_team(&self) -> bool {
        self.agents.len() > 1
    }

    /// Sets the teammate mode.
    pub fn with_teammate_mode(mut self, mode: TeammateMode) -> Self {
        self.teammate_mode = mode;
        self
    }

    fn entries(&self) -> impl Iterator<Item = (ComponentKind, &String)> {
        tagged(ComponentKind::Agent, &self.agents)
            .chain(tagged(ComponentKind::Skill, &self.skills))
            .chain(tagged(ComponentKind::Command, &self.commands))
            .chain(tagged(ComponentKind::Rule, &self.rules))
    }
}

fn tagged(kind: ComponentKind, names: &[String]) -> impl Iterator<Item = (ComponentKind, &String)> {
    names.iter().map(move |n| (kind, n))
}

impl Kit {
    /// Whether every core BMAD agent is installed.
    pub fn bmad_installed(&self) -> bool {
        BMAD_AGENTS
            .iter()
            .all(|a| self.is_installed(ComponentKind::Agent, a))
    }

    /// Computes the plan for `agents`, optionally with the BMAD bundle.
    pub fn plan<S: AsRef<str>>(&self, agents: &[S], bundle: bool) -> InstallPlan {
        let mut skills = BTreeSet::new();
        let mut commands = BTreeSet::new();
        let mut rules = BTreeSet::new();

        for agent in agents {
            let agent = agent.as_ref();
            let deps = self.roles().expand(agent, &self.declared_skills(agent));
            skills.extend(deps.skills);
            commands.extend(deps.commands);
            rules.extend(deps.rules);
        }
        if bundle {
            commands.extend(BMAD_WORKFLOW_COMMANDS.iter().map(|s| s.to_string()));
            rules.extend(BASE_RULES.iter().map(|s| s.to_string()));
        }
        commands.insert(SYNC_COMMAND.to_string());
        if agents.len() > 1 {
            rules.insert(TEAMS_RULE.to_string());
        }

        InstallPlan {
            agents: agents.iter().map(|a| a.as_ref().to_string()).collect(),
            skills: skills.into_iter().collect(),
            commands: commands.into_iter().collect(),
            rules: rules.into_iter().collect(),
            teammate_mode: TeammateMode::default(),
            bundle,
        }
    }

    /// Copies base files, sets the teammate mode, then installs the plan.
    ///
    /// Only base-file and settings failures abort; a catalog without
    /// `settings.json` just skips the mode. Component problems are recorded.
    pub fn apply_plan(&self, plan: &InstallPlan) -> Result<ApplyReport> {
        let mut report = ApplyReport {
            base_files: self.copy_base_files()?,
            ..ApplyReport::default()
        };
        match patch_teammate_mode(self.target(), plan.teammate_mode) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("No settings.json in target; teammate mode not set");
            }
            Err(e) => return Err(e),
        }

        for (kind, name) in plan.entries() {
            let key = format!("{kind}/{name}");
            match self.install(kind, name) {
                Ok(_) => report.installed.push(key),
                Err(e) if e.is_not_found() && kind != ComponentKind::Agent => {
                    tracing::debug!(component = %key, "Planned component not in catalog");
                    report.missing.push(key);
                }
                Err(e) => {
                    tracing::warn!(component = %key, error = %e, "Install failed");
                    report.failed.push((key, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Installs the core BMAD agents, workflow commands, and base rules.
    pub fn install_bmad(&self) -> Result<BundleReport> {
        self.ensure_base_files()?;
        Ok(BundleReport {
            agents: self.install_agents(&BMAD_AGENTS[..]),
            commands: BMAD_COMMANDS
                .iter()
                .map(|c| self.install_dependency(ComponentKind::Command, c, DepOrigin::Bundle))
                .collect(),
            rules: BASE_RULES
                .iter()
                .map(|r| self.install_dependency(ComponentKind::Rule, r, DepOrigin::Bundle))
                .collect(),
        })
    }
}
