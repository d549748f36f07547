use crate::commands::{split_kind_args, Session};
use crate::prompt::Prompter;
use crate::theme::Theme;
use anyhow::{Context, Result};
use ckit_discovery::{scan_catalog, ComponentKind};
use ckit_sync::{AgentReport, DepOrigin, DepOutcome, DepStatus, InstallOutcome};
use std::io::Write;

/// Handle the `add` command.
pub(crate) fn handle_add_command(
    session: &Session,
    args: &[String],
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "{}", session.theme.banner())?;
    if args.is_empty() {
        return add_interactive(session, prompter, out);
    }
    if args.len() == 1 && args[0].eq_ignore_ascii_case("bmad") {
        return add_bmad(session, out);
    }

    session
        .kit
        .ensure_base_files()
        .context("copying base files")?;
    match split_kind_args(args) {
        (Some(kind), names) => add_components(session, kind, names, out)?,
        (None, names) => {
            for name in names {
                add_agent(session, name, out)?;
            }
        }
    }
    writeln!(out)?;
    Ok(())
}

fn add_interactive(session: &Session, prompter: &dyn Prompter, out: &mut dyn Write) -> Result<()> {
    let theme = &session.theme;
    writeln!(out, "  Add agents (skills & rules are installed automatically)")?;
    writeln!(out)?;

    let catalog = scan_catalog(session.kit.catalog()).context("scanning templates")?;
    let candidates: Vec<_> = catalog
        .iter()
        .filter(|cat| cat.kind == ComponentKind::Agent)
        .flat_map(|cat| cat.components.iter())
        .filter(|c| !session.kit.is_installed(ComponentKind::Agent, &c.name))
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
    let picked = prompter.multi_select("Select agents to add", &labels, &[])?;
    if picked.is_empty() {
        writeln!(out, "No agents selected.")?;
        return Ok(());
    }

    session
        .kit
        .ensure_base_files()
        .context("copying base files")?;
    for idx in picked {
        if let Some(agent) = candidates.get(idx) {
            add_agent(session, &agent.name, out)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "  {} Done!", theme.arrow)?;
    Ok(())
}

fn add_components(
    session: &Session,
    kind: ComponentKind,
    names: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    for name in names {
        if session.kit.is_installed(kind, name) {
            writeln!(out, "  {kind}/{name} already installed, updating")?;
        }
        if kind == ComponentKind::Agent {
            add_agent(session, name, out)?;
            continue;
        }
        match session.kit.install(kind, name) {
            Ok(_) => writeln!(out, "  {} Added {kind}/{name}", theme.check)?,
            Err(e) => {
                tracing::warn!(component = %format!("{kind}/{name}"), error = %e, "Add failed");
                writeln!(out, "  {kind}/{name}: {e}")?;
            }
        }
    }
    Ok(())
}

fn add_agent(session: &Session, name: &str, out: &mut dyn Write) -> Result<()> {
    match session.kit.install_agent(name) {
        Ok(report) => write_agent_report(&session.theme, &report, out)?,
        Err(e) => {
            tracing::warn!(agent = name, error = %e, "Add failed");
            writeln!(out, "  Agent {name}: {e}")?;
        }
    }
    Ok(())
}

/// Prints one agent and what happened to each of its dependencies.
pub(crate) fn write_agent_report(
    theme: &Theme,
    report: &AgentReport,
    out: &mut dyn Write,
) -> Result<()> {
    let verb = match report.outcome {
        InstallOutcome::Installed => "Added",
        InstallOutcome::Updated => "Updated",
    };
    writeln!(out, "  {} {verb} agent: {}", theme.check, report.agent)?;
    for dep in &report.deps {
        write_dep(theme, dep, "      ", out)?;
    }
    Ok(())
}

fn write_dep(theme: &Theme, dep: &DepOutcome, indent: &str, out: &mut dyn Write) -> Result<()> {
    let label = dep.kind.label();
    match &dep.status {
        DepStatus::Added => writeln!(out, "{indent}{} Added {label}: {}", theme.check, dep.name)?,
        DepStatus::AlreadyPresent => {
            writeln!(out, "{indent}{} {} (already installed)", theme.dot, dep.name)?
        }
        DepStatus::Missing if dep.origin == DepOrigin::Frontmatter => writeln!(
            out,
            "{indent}{} {label} {} not in templates",
            theme.bullet, dep.name
        )?,
        DepStatus::Missing => {}
        DepStatus::Failed(e) => writeln!(out, "{indent}{label} {}: {e}", dep.name)?,
    }
    Ok(())
}

fn add_bmad(session: &Session, out: &mut dyn Write) -> Result<()> {
    let theme = &session.theme;
    writeln!(out, "  BMAD -- Break, Model, Act, Deliver")?;
    writeln!(out, "  Core methodology + workflow commands")?;
    writeln!(
        out,
        "  Add project agents separately: ck add backend, ck add mobile-ios, etc."
    )?;

    let report = session.kit.install_bmad().context("installing BMAD bundle")?;

    writeln!(out, "{}", theme.section("Core Agents"))?;
    for (name, result) in &report.agents.items {
        match result {
            Ok(agent) => write_agent_report(theme, agent, out)?,
            Err(e) => {
                tracing::warn!(agent = %name, error = %e, "Bundle agent failed");
                writeln!(out, "  Agent {name}: {e}")?;
            }
        }
    }
    writeln!(out, "{}", theme.section("Commands"))?;
    for dep in &report.commands {
        write_dep(theme, dep, "  ", out)?;
    }
    writeln!(out, "{}", theme.section("Rules"))?;
    for dep in &report.rules {
        write_dep(theme, dep, "  ", out)?;
    }

    writeln!(out)?;
    writeln!(out, "  {} BMAD methodology installed!", theme.arrow)?;
    writeln!(
        out,
        "  Now add your project agents: ck add backend, ck add frontend, etc."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output, session};
    use crate::prompt::MockPrompter;
    use ckit_test_utils::CatalogFixture;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn run(fx: &CatalogFixture, args: &[&str], prompter: &MockPrompter) -> String {
        let mut buf = Vec::new();
        handle_add_command(&session(fx), &strings(args), prompter, &mut buf).unwrap();
        output(buf)
    }

    #[test]
    fn agent_names_install_with_dependencies_and_base_files() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_base_files("# Project\n", "{\"teammateMode\": \"auto\"}\n")
            .unwrap();
        fx.add_agent("backend", "Backend", &["api-design", "ghost"])
            .unwrap();
        fx.add_skill("api-design", "APIs").unwrap();
        fx.add_rule("code-style", "Style").unwrap();

        let text = run(&fx, &["backend"], &MockPrompter::new());

        assert!(fx.target.join("CLAUDE.md").is_file());
        assert!(fx.target.join("agents/backend.md").is_file());
        assert!(fx.target.join("skills/api-design/SKILL.md").is_file());
        assert!(fx.target.join("rules/code-style.md").is_file());
        assert!(text.contains("+ Added agent: backend"));
        assert!(text.contains("+ Added skill: api-design"));
        assert!(text.contains("* skill ghost not in templates"));
    }

    #[test]
    fn explicit_kind_reports_updates_and_failures() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_rule("testing", "Testing").unwrap();
        fx.write_target("rules/testing.md", "old").unwrap();

        let text = run(&fx, &["rule", "testing", "absent"], &MockPrompter::new());

        assert!(text.contains("rules/testing already installed, updating"));
        assert!(text.contains("+ Added rules/testing"));
        assert!(text.contains("rules/absent: rule absent not found"));
        assert_ne!(fx.read_target("rules/testing.md").as_deref(), Some("old"));
    }

    #[test]
    fn unknown_agent_is_reported_not_fatal() {
        let fx = CatalogFixture::new().unwrap();
        let text = run(&fx, &["nobody"], &MockPrompter::new());
        assert!(text.contains("Agent nobody:"));
    }

    #[test]
    fn interactive_installs_picked_agents() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_agent("backend", "Backend", &[]).unwrap();
        fx.add_agent("frontend", "Frontend", &[]).unwrap();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_multi_select()
            .withf(|_, options, defaults| {
                options == ["backend -- Backend", "frontend -- Frontend"] && defaults.is_empty()
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![1]));

        let text = run(&fx, &[], &prompter);
        assert!(fx.target.join("agents/frontend.md").is_file());
        assert!(!fx.target.join("agents/backend.md").exists());
        assert!(text.contains("-> Done!"));
    }

    #[test]
    fn interactive_with_nothing_left_does_not_prompt() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_agent("backend", "Backend", &[]).unwrap();
        fx.write_target("agents/backend.md", "x").unwrap();
        let text = run(&fx, &[], &MockPrompter::new());
        assert!(text.contains("All agents already installed!"));
    }

    #[test]
    fn interactive_empty_selection_installs_nothing() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_agent("backend", "Backend", &[]).unwrap();
        let mut prompter = MockPrompter::new();
        prompter
            .expect_multi_select()
            .returning(|_, _, _| Ok(Vec::new()));
        let text = run(&fx, &[], &prompter);
        assert!(text.contains("No agents selected."));
        assert!(!fx.target.exists());
    }

    #[test]
    fn bmad_keyword_installs_bundle() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_agent("architect", "Architect", &[]).unwrap();
        fx.add_command("bmad-run", "Run").unwrap();
        fx.add_rule("testing", "Testing").unwrap();

        let text = run(&fx, &["BMAD"], &MockPrompter::new());
        assert!(fx.target.join("agents/architect.md").is_file());
        assert!(fx.target.join("rules/testing.md").is_file());
        assert!(text.contains("> Core Agents"));
        assert!(text.contains("Agent product-owner:"));
        assert!(text.contains("BMAD methodology installed!"));
    }
}
