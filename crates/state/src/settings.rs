use crate::io::atomic_write;
use ckit_discovery::{KitError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Settings file name inside a catalog or target.
pub const SETTINGS_FILE: &str = "settings.json";

const TEAMMATE_MODE_KEY: &str = "teammateMode";

/// How teammate agents are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeammateMode {
    /// Split panes under tmux, otherwise in-process.
    #[default]
    Auto,
    /// All teammates in one terminal.
    InProcess,
    /// One pane per teammate.
    Tmux,
}

impl TeammateMode {
    /// Every mode, in prompt order.
    pub const ALL: [TeammateMode; 3] = [
        TeammateMode::Auto,
        TeammateMode::InProcess,
        TeammateMode::Tmux,
    ];

    /// Value stored in `settings.json`.
    pub fn as_str(self) -> &'static str {
        match self {
            TeammateMode::Auto => "auto",
            TeammateMode::InProcess => "in-process",
            TeammateMode::Tmux => "tmux",
        }
    }

    /// One-line explanation for prompts.
    pub fn summary(self) -> &'static str {
        match self {
            TeammateMode::Auto => "split panes in tmux, otherwise in-process",
            TeammateMode::InProcess => "all teammates in one terminal",
            TeammateMode::Tmux => "each teammate in its own pane (requires tmux/iTerm2)",
        }
    }
}

impl fmt::Display for TeammateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeammateMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TeammateMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown teammate mode '{s}' (expected auto, in-process, tmux)"))
    }
}

fn load_settings(target: &Path) -> Result<Map<String, Value>> {
    let path = target.join(SETTINGS_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KitError::not_found("settings file", path));
        }
        Err(e) => return Err(KitError::io(format!("reading {}", path.display()), e)),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(KitError::Malformed {
            path,
            reason: "expected a JSON object".into(),
        }),
        Err(e) => Err(KitError::Malformed {
            path,
            reason: e.to_string(),
        }),
    }
}

/// Reads `teammateMode` from `<target>/settings.json`.
///
/// A missing or empty key means `Auto`. An unrecognized value is logged and
/// treated as `Auto`.
pub fn read_teammate_mode(target: &Path) -> Result<TeammateMode> {
    Ok(stored_teammate_mode(target)?.unwrap_or_default())
}

/// The recognized `teammateMode` stored in `<target>/settings.json`, if any.
pub fn stored_teammate_mode(target: &Path) -> Result<Option<TeammateMode>> {
    let settings = load_settings(target)?;
    match settings.get(TEAMMATE_MODE_KEY).and_then(Value::as_str) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse() {
            Ok(mode) => Ok(Some(mode)),
            Err(e) => {
                tracing::warn!(value = raw, "{e}; treating as auto");
                Ok(None)
            }
        },
    }
}

/// Sets `teammateMode` in `<target>/settings.json`, keeping every other key.
///
/// The file is rewritten with 2-space indentation and a trailing newline.
pub fn patch_teammate_mode(target: &Path, mode: TeammateMode) -> Result<()> {
    let path = target.join(SETTINGS_FILE);
    let mut settings = load_settings(target)?;
    settings.insert(TEAMMATE_MODE_KEY.into(), Value::String(mode.as_str().into()));

    let mut out = serde_json::to_vec_pretty(&settings).map_err(|e| KitError::Malformed {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    out.push(b'\n');
    atomic_write(&path, &out)?;
    tracing::info!(mode = %mode, path = %path.display(), "Patched teammate mode");
    Ok(())
}
