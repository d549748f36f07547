use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::KitError;

/// The four kinds of installable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Agent definition (`agents/<name>.md`).
    Agent,
    /// Skill directory (`skills/<name>/SKILL.md`).
    Skill,
    /// Slash command (`commands/<name>.md`).
    Command,
    /// Rule document (`rules/<name>.md`).
    Rule,
}

impl ComponentKind {
    /// All kinds in scan order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Agent,
        ComponentKind::Skill,
        ComponentKind::Command,
        ComponentKind::Rule,
    ];

    /// Directory name under a catalog or target root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ComponentKind::Agent => "agents",
            ComponentKind::Skill => "skills",
            ComponentKind::Command => "commands",
            ComponentKind::Rule => "rules",
        }
    }

    /// Singular label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Agent => "agent",
            ComponentKind::Skill => "skill",
            ComponentKind::Command => "command",
            ComponentKind::Rule => "rule",
        }
    }

    /// Whether this kind is stored as a directory rather than a single markdown file.
    pub fn is_directory(self) -> bool {
        matches!(self, ComponentKind::Skill)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Parses singular or plural kind names, case-insensitively.
///
/// ```
/// use ckit_discovery::ComponentKind;
///
/// assert_eq!("skill".parse::<ComponentKind>().unwrap(), ComponentKind::Skill);
/// assert_eq!("Rules".parse::<ComponentKind>().unwrap(), ComponentKind::Rule);
/// assert!("widgets".parse::<ComponentKind>().is_err());
/// ```
impl FromStr for ComponentKind {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agent" | "agents" => Ok(ComponentKind::Agent),
            "skill" | "skills" => Ok(ComponentKind::Skill),
            "command" | "commands" => Ok(ComponentKind::Command),
            "rule" | "rules" => Ok(ComponentKind::Rule),
            _ => Err(KitError::UnknownKind(s.to_string())),
        }
    }
}

/// One addressable component found in a catalog or target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component kind.
    pub kind: ComponentKind,
    /// Name within its kind; nested skills use `group/name`.
    pub name: String,
    /// Frontmatter description, empty when absent.
    pub description: String,
    /// Source file (agents, commands, rules) or directory (skills).
    pub path: PathBuf,
}

impl Component {
    /// `kind/name` key, unique within a root.
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

/// All components of one kind, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Kind shared by every component in this category.
    pub kind: ComponentKind,
    /// Components sorted lexicographically by name.
    pub components: Vec<Component>,
}

impl Category {
    /// Looks up a component by exact name.
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}
