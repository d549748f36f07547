//! Recommended tools and plugins, and the `dep install` flow.

use crate::prompt::Prompter;
use crate::theme::Theme;
use anyhow::{anyhow, Result};
use std::io::Write;
use std::process::Command;

#[cfg(test)]
use mockall::automock;

/// How a dependency gets installed.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DepKind {
    /// Claude Code plugin; the user runs slash commands by hand.
    Plugin {
        marketplace: &'static str,
        install: &'static str,
    },
    Brew,
    Npm,
    Go,
    /// `sh -c <script>`.
    Shell(&'static str),
}

/// One entry of the recommended-dependency registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dependency {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    pub(crate) kind: DepKind,
    /// Package or repository identifier.
    pub(crate) source: &'static str,
}

pub(crate) const REGISTRY: &[Dependency] = &[Dependency {
    name: "claude-mem",
    description: "Persistent memory compression system for Claude Code",
    kind: DepKind::Plugin {
        marketplace: "/plugin marketplace add thedotmack/claude-mem",
        install: "/plugin install claude-mem",
    },
    source: "thedotmack/claude-mem",
}];

impl Dependency {
    /// Program and arguments for automatic installs; `None` for plugins.
    fn installer(&self) -> Option<(&'static str, Vec<String>)> {
        let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match self.kind {
            DepKind::Plugin { .. } => None,
            DepKind::Brew => Some(("brew", args(&["install", self.source]))),
            DepKind::Npm => Some(("npm", args(&["install", "-g", self.source]))),
            DepKind::Go => Some(("go", args(&["install", self.source]))),
            DepKind::Shell(script) => Some(("sh", args(&["-c", script]))),
        }
    }
}

/// Runs installer programs.
#[cfg_attr(test, automock)]
pub(crate) trait Installer {
    /// Runs `program args..` to completion; fails with its combined output.
    fn run(&self, program: &str, args: &[String]) -> Result<()>;
}

/// [`Installer`] backed by child processes.
#[derive(Debug, Default)]
pub(crate) struct ProcessInstaller;

impl Installer for ProcessInstaller {
    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        tracing::info!(program, ?args, "Running installer");
        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(anyhow!("{program} not found in PATH"));
            }
            Err(e) => return Err(e.into()),
        };
        if output.status.success() {
            return Ok(());
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(anyhow!("{}: {}", output.status, text.trim()))
    }
}

/// Handle the `dep install` command.
pub(crate) fn handle_dep_install_command(
    theme: &Theme,
    registry: &[Dependency],
    prompter: &dyn Prompter,
    installer: &dyn Installer,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "{}", theme.banner())?;
    writeln!(out, "  Install recommended dependencies")?;
    writeln!(out)?;

    let labels: Vec<String> = registry
        .iter()
        .map(|d| format!("{} -- {}", d.name, d.description))
        .collect();
    let picked = prompter.multi_select("Select dependencies to install", &labels, &[])?;
    if picked.is_empty() {
        writeln!(out, "No dependencies selected.")?;
        return Ok(());
    }
    let chosen: Vec<&Dependency> = picked.iter().filter_map(|&i| registry.get(i)).collect();

    let mut installed = 0;
    let mut manual = Vec::new();
    for dep in chosen {
        let Some((program, args)) = dep.installer() else {
            manual.push(dep);
            continue;
        };
        writeln!(out, "{}", theme.section(&format!("Installing {}", dep.name)))?;
        match installer.run(program, &args) {
            Ok(()) => {
                installed += 1;
                writeln!(out, "  {} {}", theme.check, dep.name)?;
            }
            Err(e) => writeln!(out, "  Failed to install {}: {e:#}", dep.name)?,
        }
    }

    if !manual.is_empty() {
        writeln!(
            out,
            "{}",
            theme.section("Plugin Setup (manual steps in Claude Code)")
        )?;
        writeln!(out, "  Run these slash commands inside a Claude Code session:")?;
        writeln!(out)?;
        let steps = manual.iter().flat_map(|d| match d.kind {
            DepKind::Plugin {
                marketplace,
                install,
            } => vec![marketplace, install],
            _ => Vec::new(),
        });
        for (n, step) in steps.enumerate() {
            writeln!(out, "  {}. {step}", n + 1)?;
        }
        writeln!(out)?;
    }

    let mut parts = Vec::new();
    if installed > 0 {
        parts.push(format!("{installed} installed"));
    }
    if !manual.is_empty() {
        parts.push(format!("{} require manual setup", manual.len()));
    }
    writeln!(out, "  {} Done! {}", theme.arrow, parts.join(", "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::MockPrompter;

    const TEST_REGISTRY: &[Dependency] = &[
        Dependency {
            name: "claude-mem",
            description: "Memory",
            kind: DepKind::Plugin {
                marketplace: "/plugin marketplace add x/claude-mem",
                install: "/plugin install claude-mem",
            },
            source: "x/claude-mem",
        },
        Dependency {
            name: "ripgrep",
            description: "Search",
            kind: DepKind::Brew,
            source: "ripgrep",
        },
        Dependency {
            name: "broken",
            description: "Always fails",
            kind: DepKind::Npm,
            source: "broken-pkg",
        },
    ];

    fn picks(indices: Vec<usize>) -> MockPrompter {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_multi_select()
            .returning(move |_, _, _| Ok(indices.clone()));
        prompter
    }

    fn run(prompter: &MockPrompter, installer: &MockInstaller) -> String {
        let mut buf = Vec::new();
        handle_dep_install_command(
            &Theme::ascii(),
            TEST_REGISTRY,
            prompter,
            installer,
            &mut buf,
        )
        .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plugins_print_numbered_manual_steps() {
        let mut installer = MockInstaller::new();
        installer.expect_run().never();
        let text = run(&picks(vec![0]), &installer);
        assert!(text.contains("1. /plugin marketplace add x/claude-mem"));
        assert!(text.contains("2. /plugin install claude-mem"));
        assert!(text.contains("Done! 1 require manual setup"));
    }

    #[test]
    fn auto_installs_run_installer_and_report_failures() {
        let mut installer = MockInstaller::new();
        installer
            .expect_run()
            .withf(|program, args| program == "brew" && args == ["install", "ripgrep"])
            .returning(|_, _| Ok(()));
        installer
            .expect_run()
            .withf(|program, args| program == "npm" && args == ["install", "-g", "broken-pkg"])
            .returning(|_, _| Err(anyhow!("npm not found in PATH")));

        let text = run(&picks(vec![1, 2]), &installer);
        assert!(text.contains("+ ripgrep"));
        assert!(text.contains("Failed to install broken: npm not found in PATH"));
        assert!(text.contains("Done! 1 installed"));
    }

    #[test]
    fn empty_selection_does_nothing() {
        let text = run(&picks(Vec::new()), &MockInstaller::new());
        assert!(text.contains("No dependencies selected."));
    }

    #[test]
    fn shell_entries_run_through_sh() {
        let dep = Dependency {
            name: "tool",
            description: "",
            kind: DepKind::Shell("curl -fsSL example.sh | sh"),
            source: "",
        };
        let (program, args) = dep.installer().unwrap();
        assert_eq!(program, "sh");
        assert_eq!(args, ["-c", "curl -fsSL example.sh | sh"]);
        assert!(REGISTRY[0].installer().is_none());
    }

    #[test]
    fn missing_program_is_reported_by_name() {
        let err = ProcessInstaller
            .run("ck-no-such-installer-program", &[])
            .unwrap_err();
        assert_eq!(err.to_string(), "ck-no-such-installer-program not found in PATH");
    }
}
