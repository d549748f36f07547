//! Implements the `ck` command-line application.
//!
//! Each subcommand resolves the template catalog and the project's `.claude`
//! target, then hands off to a handler in `commands`. Handlers write to an
//! explicit output stream and take their prompts through the [`Prompter`]
//! trait, so whole flows run under test without a terminal.
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG=debug` to see
//! skipped and missing components.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cli;
mod commands;
mod prompt;
mod theme;

pub use cli::{Cli, Commands, DepCommands};
pub use prompt::{InquirePrompter, Prompter};
pub use theme::Theme;

use crate::commands::{
    handle_add_command, handle_dep_install_command, handle_docs_command, handle_init_command,
    handle_list_command, handle_remove_command, handle_sync_command,
    handle_teammate_mode_command, ListFilter, Session,
};
use anyhow::Result;
use ckit_stack::MarkerTable;
use clap::{CommandFactory, Parser};
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Parses the command line and runs the selected command.
pub fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &InquirePrompter, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Runs an already-parsed command against `prompter` and `out`.
pub fn execute(cli: Cli, prompter: &dyn Prompter, out: &mut dyn Write) -> Result<()> {
    let theme = Theme::from_env();
    let Some(command) = cli.command else {
        writeln!(out, "{}", Cli::command().render_help())?;
        return Ok(());
    };

    match command {
        Commands::Version => {
            writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        Commands::Dep {
            command: DepCommands::Install,
        } => handle_dep_install_command(
            &theme,
            commands::REGISTRY,
            prompter,
            &commands::ProcessInstaller,
            out,
        ),
        command => {
            let session =
                Session::open(cli.template_dir.as_deref(), cli.project.as_deref(), theme)?;
            match command {
                Commands::Init => handle_init_command(&session, prompter, out),
                Commands::Add { args } => handle_add_command(&session, &args, prompter, out),
                Commands::Remove { args } => {
                    handle_remove_command(&session, &args, prompter, out)
                }
                Commands::List {
                    available,
                    installed,
                    json,
                } => handle_list_command(
                    &session,
                    ListFilter::from_flags(available, installed),
                    json,
                    out,
                ),
                Commands::Sync => handle_sync_command(&session, &MarkerTable, out),
                Commands::Docs { refresh } => {
                    handle_docs_command(&session, &MarkerTable, refresh, out)
                }
                Commands::TeammateMode { mode } => {
                    handle_teammate_mode_command(&session, mode, prompter, out)
                }
                Commands::Version | Commands::Dep { .. } => Ok(()),
            }
        }
    }
}
