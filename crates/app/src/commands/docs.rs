use crate::commands::Session;
use anyhow::{Context, Result};
use ckit_stack::{generate, staleness, StackDetector, Staleness};
use std::io::Write;
use time::OffsetDateTime;

/// Handle the `docs` command.
pub(crate) fn handle_docs_command(
    session: &Session,
    detector: &dyn StackDetector,
    refresh: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    writeln!(out, "{}", theme.banner())?;

    if !refresh {
        match staleness(&session.project, detector, OffsetDateTime::now_utc()) {
            Staleness::Fresh => {
                writeln!(out, "  {} Docs-index is up to date.", theme.check)?;
                writeln!(out, "    Use --refresh to force regeneration.")?;
                writeln!(out)?;
                return Ok(());
            }
            Staleness::Stale(reason) => {
                writeln!(out, "  {} Regenerating: {reason}", theme.bullet)?;
            }
        }
    }

    let techs = generate(&session.project, detector).context("generating docs-index")?;
    writeln!(out, "  {} Generated .claude/docs-index.md", theme.check)?;
    if techs.is_empty() {
        writeln!(out, "    No stack detected. Add dependency files and re-run.")?;
    } else {
        let names: Vec<&str> = techs.iter().map(|t| t.name.as_str()).collect();
        writeln!(out, "    {} Detected stack: {}", theme.arrow, names.join(", "))?;
    }
    writeln!(out, "    Metadata: .claude/.docs-meta.json")?;
    writeln!(out)?;
    Ok(())
}
