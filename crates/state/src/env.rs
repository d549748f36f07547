use ckit_discovery::{KitError, Result};
use std::path::{Path, PathBuf};

/// Environment variable that points at the template catalog.
pub const TEMPLATE_DIR_ENV: &str = "CK_TEMPLATE_DIR";

/// Name of the per-project directory components are installed into.
pub const TARGET_DIR_NAME: &str = ".claude";

const BMAD_DIR: &str = ".bmad";
const TEMPLATES_DIR: &str = "templates";
const DEV_TEMPLATE_DIR: &str = "project-template";

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    dirs::home_dir().ok_or_else(|| KitError::not_found("home directory", "~"))
}

fn installed_templates() -> PathBuf {
    home_dir()
        .unwrap_or_else(|_| PathBuf::from("~"))
        .join(BMAD_DIR)
        .join(TEMPLATES_DIR)
}

fn dev_template_under(dir: &Path) -> PathBuf {
    dir.join(DEV_TEMPLATE_DIR).join(TARGET_DIR_NAME)
}

/// Resolves the template catalog directory.
///
/// Order: `explicit` (flag), `$CK_TEMPLATE_DIR`, `~/.bmad/templates`,
/// `project-template/.claude` next to the executable, the same under the
/// working directory, and finally `~/.bmad/templates` even when absent.
/// Only the first two are taken without checking that they exist.
pub fn template_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    let installed = installed_templates();
    if installed.is_dir() {
        return installed;
    }

    let exe_adjacent = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(dev_template_under));
    let cwd_adjacent = std::env::current_dir().ok().map(|cwd| dev_template_under(&cwd));
    for candidate in [exe_adjacent, cwd_adjacent].into_iter().flatten() {
        if candidate.is_dir() {
            tracing::debug!(dir = %candidate.display(), "Using development template directory");
            return candidate;
        }
    }

    installed
}

/// Resolves the project root: `explicit` made absolute, else the working directory.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| KitError::io("reading current directory", e))?;
    Ok(match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd,
    })
}

/// `<project>/.claude`.
pub fn target_dir(project: &Path) -> PathBuf {
    project.join(TARGET_DIR_NAME)
}
