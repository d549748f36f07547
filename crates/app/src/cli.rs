use clap::{Parser, Subcommand};
use ckit_state::TeammateMode;
use std::path::PathBuf;

/// Command-line interface for the `ck` application.
#[derive(Debug, Parser)]
#[command(
    name = "ck",
    about = "Install and manage Claude Code agents, skills, commands, and rules",
    version
)]
pub struct Cli {
    /// Template catalog directory (overrides the default lookup).
    #[arg(long, global = true, env = "CK_TEMPLATE_DIR", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
    /// Project root; components go into `<DIR>/.claude`.
    #[arg(short = 'f', long = "project", global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
    /// Command to run; prints help when absent.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available `ck` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive project setup: BMAD bundle, agents, teammate mode.
    Init,
    /// Adds agents with their dependencies, the `bmad` bundle, or `<kind> <names..>`.
    ///
    /// With no arguments, lists uninstalled agents to pick from.
    Add {
        /// `bmad`, agent names, or a component kind followed by names.
        args: Vec<String>,
    },
    /// Removes installed components; `[<kind>] <names..>`, agents by default.
    #[command(alias = "rm")]
    Remove {
        /// Optional component kind followed by names.
        args: Vec<String>,
    },
    /// Lists catalog components with their installed state.
    #[command(alias = "ls")]
    List {
        /// Only components not yet installed.
        #[arg(long, conflicts_with = "installed")]
        available: bool,
        /// Only installed components.
        #[arg(long)]
        installed: bool,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Refreshes installed components from the catalog, then the docs index if stale.
    Sync,
    /// Generates `.claude/docs-index.md` from the detected stack.
    Docs {
        /// Regenerate even when the index is fresh.
        #[arg(long)]
        refresh: bool,
    },
    /// Shows or sets the agent-teams display mode in `settings.json`.
    TeammateMode {
        /// auto, in-process, or tmux. Prompts when omitted.
        #[arg(value_parser = parse_mode)]
        mode: Option<TeammateMode>,
    },
    /// Manages recommended tools and plugins.
    Dep {
        /// Dependency action.
        #[command(subcommand)]
        command: DepCommands,
    },
    /// Prints the version.
    Version,
}

/// `ck dep` subcommands.
#[derive(Debug, Subcommand)]
pub enum DepCommands {
    /// Picks recommended dependencies and installs them.
    Install,
}

fn parse_mode(s: &str) -> Result<TeammateMode, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["ck", "list", "--installed", "-f", "/tmp/p"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some(std::path::Path::new("/tmp/p")));
        assert!(matches!(
            cli.command,
            Some(Commands::List { installed: true, available: false, json: false })
        ));
    }

    #[test]
    fn available_and_installed_conflict() {
        assert!(Cli::try_parse_from(["ck", "list", "--available", "--installed"]).is_err());
    }

    #[test]
    fn teammate_mode_argument_is_validated() {
        let cli = Cli::try_parse_from(["ck", "teammate-mode", "in-process"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::TeammateMode { mode: Some(TeammateMode::InProcess) })
        ));
        assert!(Cli::try_parse_from(["ck", "teammate-mode", "split"]).is_err());
    }

    #[test]
    fn add_collects_positional_args() {
        let cli = Cli::try_parse_from(["ck", "add", "skill", "a", "b"]).unwrap();
        match cli.command {
            Some(Commands::Add { args }) => assert_eq!(args, ["skill", "a", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
