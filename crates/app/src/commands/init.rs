use crate::commands::teammate::mode_options;
use crate::commands::Session;
use crate::prompt::Prompter;
use anyhow::{anyhow, Context, Result};
use ckit_discovery::{scan_catalog, ComponentKind};
use ckit_state::TeammateMode;
use ckit_sync::{InstallPlan, BMAD_AGENTS};
use std::io::Write;

/// Handle the `init` command.
pub(crate) fn handle_init_command(
    session: &Session,
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    let kit = &session.kit;
    writeln!(out, "{}", theme.banner())?;

    let catalog = scan_catalog(kit.catalog()).context("scanning templates")?;
    let agents = catalog
        .iter()
        .find(|cat| cat.kind == ComponentKind::Agent)
        .map(|cat| cat.components.as_slice())
        .unwrap_or_default();
    if agents.is_empty() {
        return Err(anyhow!(
            "no agents found in template directory: {}",
            kit.catalog().display()
        ));
    }

    let existing = kit.target().is_dir();
    if existing {
        writeln!(out, "  Project Setup (existing .claude/ detected)")?;
        let count = agents
            .iter()
            .filter(|c| kit.is_installed(ComponentKind::Agent, &c.name))
            .count();
        if count > 0 {
            writeln!(out, "  {count} agents already installed")?;
        }
    } else {
        writeln!(out, "  Project Setup")?;
    }
    writeln!(out, "  Template: {}", kit.catalog().display())?;
    writeln!(out, "  Target:   {}", kit.target().display())?;
    writeln!(out)?;

    let bundle = !kit.bmad_installed()
        && prompter.confirm(
            "Add BMAD methodology? (Break -> Model -> Act -> Deliver)",
            false,
        )?;

    let candidates: Vec<_> = agents
        .iter()
        .filter(|c| !kit.is_installed(ComponentKind::Agent, &c.name))
        .collect();
    if candidates.is_empty() {
        writeln!(out, "  {} All agents already installed!", theme.arrow)?;
        writeln!(out, "  Use 'ck remove' to remove agents.")?;
        return Ok(());
    }
    let labels: Vec<String> = candidates
        .iter()
        .map(|c| theme.option_label(&c.name, &c.description))
        .collect();
    let preselected: Vec<usize> = if bundle {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| BMAD_AGENTS.contains(&c.name.as_str()))
            .map(|(i, _)| i)
            .collect()
    } else {
        Vec::new()
    };
    let picked = prompter.multi_select(
        "Select agents to add (skills, commands & rules are automatic)",
        &labels,
        &preselected,
    )?;
    let selected: Vec<&str> = picked
        .iter()
        .filter_map(|&i| candidates.get(i).map(|c| c.name.as_str()))
        .collect();
    if selected.is_empty() {
        writeln!(out, "No agents selected.")?;
        return Ok(());
    }

    let mut mode = TeammateMode::default();
    if selected.len() >= 2 {
        let idx = prompter.select("Teammate display mode", &mode_options(), 0)?;
        mode = TeammateMode::ALL.get(idx).copied().unwrap_or_default();
    }

    let plan = kit.plan(&selected, bundle).with_teammate_mode(mode);
    write_plan_summary(session, &plan, out)?;

    if !prompter.confirm("Apply changes?", true)? {
        writeln!(out, "Aborted.")?;
        return Ok(());
    }

    let report = kit.apply_plan(&plan).context("applying setup")?;
    if !report.base_files.is_empty() && !existing {
        writeln!(
            out,
            "  {} Installed {}",
            theme.check,
            report.base_files.join(" + ")
        )?;
    }
    writeln!(out, "{}", theme.section("Components"))?;
    for key in &report.installed {
        writeln!(out, "  {} {key}", theme.check)?;
    }
    for key in &report.missing {
        writeln!(out, "  {} {key} (not in templates)", theme.dot)?;
    }
    for (key, err) in &report.failed {
        writeln!(out, "  {key}: {err}")?;
    }
    writeln!(out)?;
    writeln!(out, "  {} Setup complete!", theme.arrow)?;
    Ok(())
}

fn write_plan_summary(session: &Session, plan: &InstallPlan, out: &mut dyn Write) -> Result<()> {
    let bullet = session.theme.bullet;
    writeln!(out)?;
    writeln!(out, "  Will install:")?;
    for (label, items) in [
        ("agents", &plan.agents),
        ("skills", &plan.skills),
        ("commands", &plan.commands),
        ("rules", &plan.rules),
    ] {
        writeln!(out, "    {bullet} {} {label}: {}", items.len(), items.join(", "))?;
    }
    if plan.is_team() {
        writeln!(out, "    {bullet} teammate mode: {}", plan.teammate_mode)?;
    }
    writeln!(out)?;
    Ok(())
}
