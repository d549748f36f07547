use crate::commands::{split_kind_args, Session};
use crate::prompt::Prompter;
use anyhow::{bail, Context, Result};
use ckit_discovery::{scan_installed, ComponentKind};
use ckit_sync::RemoveOutcome;
use std::io::Write;

/// Handle the `remove` command.
pub(crate) fn handle_remove_command(
    session: &Session,
    args: &[String],
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "{}", session.theme.banner())?;
    if args.is_empty() {
        return remove_interactive(session, prompter, out);
    }
    let (kind, names) = split_kind_args(args);
    let kind = kind.unwrap_or(ComponentKind::Agent);
    for name in names {
        remove_one(session, kind, name, true, out)?;
    }
    writeln!(out)?;
    Ok(())
}

fn remove_interactive(
    session: &Session,
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let target = session.kit.target();
    let installed: Vec<_> = scan_installed(target)
        .context("reading installed components")?
        .into_iter()
        .flat_map(|cat| cat.components)
        .collect();
    if installed.is_empty() {
        bail!("no components installed in {}", target.display());
    }

    writeln!(out, "  Remove installed components")?;
    writeln!(out)?;
    let labels: Vec<String> = installed
        .iter()
        .map(|c| format!("[{}] {}", c.kind, c.name))
        .collect();
    let picked = prompter.multi_select("Select components to remove", &labels, &[])?;
    if picked.is_empty() {
        writeln!(out, "Nothing selected.")?;
        return Ok(());
    }
    if !prompter.confirm(&format!("Remove {} components?", picked.len()), false)? {
        writeln!(out, "Aborted.")?;
        return Ok(());
    }

    for idx in picked {
        if let Some(c) = installed.get(idx) {
            remove_one(session, c.kind, &c.name, false, out)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn remove_one(
    session: &Session,
    kind: ComponentKind,
    name: &str,
    warn_missing: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    match session.kit.remove(kind, name) {
        Ok(RemoveOutcome::NotInstalled) => {
            if warn_missing {
                writeln!(out, "  {kind}/{name} is not installed")?;
            }
        }
        Ok(RemoveOutcome::Removed { referenced_by }) => {
            if !referenced_by.is_empty() {
                writeln!(
                    out,
                    "    {name} is used by agents: {}",
                    referenced_by.join(", ")
                )?;
            }
            writeln!(out, "  {} Removed {kind}/{name}", theme.check)?;
        }
        Err(e) => {
            tracing::warn!(component = %format!("{kind}/{name}"), error = %e, "Remove failed");
            writeln!(out, "  Could not remove {kind}/{name}: {e}")?;
        }
    }
    Ok(())
}
