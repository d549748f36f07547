//! Shared test utilities for claude-kit crates.
//!
//! Provides a catalog/project fixture and helpers for tests that touch
//! process-global state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = ckit_test_utils::set_env_var("CK_EXAMPLE_VAR", Some("value"));
/// assert_eq!(std::env::var("CK_EXAMPLE_VAR").unwrap(), "value");
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// A template catalog and an empty project side by side in one tempdir.
///
/// Layout:
/// - `<tmp>/catalog/` with `agents/`, `skills/`, `commands/`, `rules/` created on demand
/// - `<tmp>/project/` (exists), whose `.claude/` target does not exist until written
pub struct CatalogFixture {
    /// Owns the temporary tree; removed on drop.
    pub tempdir: tempfile::TempDir,
    /// Catalog root.
    pub catalog: PathBuf,
    /// Project root.
    pub project: PathBuf,
    /// `<project>/.claude`.
    pub target: PathBuf,
}

fn write_file(path: &Path, content: &str) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

fn frontmatter(description: &str, skills: &[&str]) -> String {
    let mut out = format!("---\ndescription: {description}\n");
    if !skills.is_empty() {
        out.push_str("skills:\n");
        for skill in skills {
            out.push_str(&format!("  - {skill}\n"));
        }
    }
    out.push_str("---\n");
    out
}

impl CatalogFixture {
    /// Creates the catalog and project directories.
    pub fn new() -> io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let catalog = tempdir.path().join("catalog");
        let project = tempdir.path().join("project");
        fs::create_dir_all(&catalog)?;
        fs::create_dir_all(&project)?;
        let target = project.join(".claude");
        Ok(Self {
            tempdir,
            catalog,
            project,
            target,
        })
    }

    /// Adds `agents/<name>.md` declaring `skills` in its frontmatter.
    pub fn add_agent(&self, name: &str, description: &str, skills: &[&str]) -> io::Result<PathBuf> {
        let body = format!("{}\nYou are the {name} agent.\n", frontmatter(description, skills));
        write_file(&self.catalog.join(format!("agents/{name}.md")), &body)
    }

    /// Adds `skills/<name>/SKILL.md`; `name` may be `group/skill`.
    pub fn add_skill(&self, name: &str, description: &str) -> io::Result<PathBuf> {
        let dir = self.catalog.join("skills").join(name);
        write_file(
            &dir.join("SKILL.md"),
            &format!("{}\n# {name}\n", frontmatter(description, &[])),
        )?;
        Ok(dir)
    }

    /// Adds `commands/<name>.md`.
    pub fn add_command(&self, name: &str, description: &str) -> io::Result<PathBuf> {
        write_file(
            &self.catalog.join(format!("commands/{name}.md")),
            &frontmatter(description, &[]),
        )
    }

    /// Adds `rules/<name>.md`.
    pub fn add_rule(&self, name: &str, description: &str) -> io::Result<PathBuf> {
        write_file(
            &self.catalog.join(format!("rules/{name}.md")),
            &frontmatter(description, &[]),
        )
    }

    /// Writes any file relative to the catalog root.
    pub fn write_catalog(&self, rel: &str, content: &str) -> io::Result<PathBuf> {
        write_file(&self.catalog.join(rel), content)
    }

    /// Writes any file relative to the target (`.claude`) directory.
    pub fn write_target(&self, rel: &str, content: &str) -> io::Result<PathBuf> {
        write_file(&self.target.join(rel), content)
    }

    /// Writes `CLAUDE.md` and `settings.json` into the catalog.
    pub fn add_base_files(&self, claude_md: &str, settings_json: &str) -> io::Result<()> {
        write_file(&self.catalog.join("CLAUDE.md"), claude_md)?;
        write_file(&self.catalog.join("settings.json"), settings_json)?;
        Ok(())
    }

    /// Reads a file relative to the target, if present.
    pub fn read_target(&self, rel: &str) -> Option<String> {
        fs::read_to_string(self.target.join(rel)).ok()
    }
}
