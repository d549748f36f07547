use crate::commands::Session;
use anyhow::{bail, Context, Result};
use ckit_stack::{generate, staleness, StackDetector, Staleness};
use std::io::Write;
use time::OffsetDateTime;

/// Handle the `sync` command.
pub(crate) fn handle_sync_command(
    session: &Session,
    detector: &dyn StackDetector,
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    let target = session.kit.target();
    writeln!(out, "{}", theme.banner())?;
    if !target.is_dir() {
        bail!(
            "no .claude directory found at {}; run 'ck init' first",
            target.display()
        );
    }

    let report = session.kit.sync().context("syncing components")?;
    if !report.base_files.is_empty() {
        writeln!(
            out,
            "  {} Refreshed {}",
            theme.check,
            report.base_files.join(", ")
        )?;
    }
    for (key, err) in &report.failed {
        writeln!(out, "  {key}: {err}")?;
    }
    writeln!(out, "  {} {}", theme.check, report.format_summary())?;

    match staleness(&session.project, detector, OffsetDateTime::now_utc()) {
        Staleness::Stale(reason) => {
            writeln!(out, "  {} Docs-index needs refresh: {reason}", theme.bullet)?;
            match generate(&session.project, detector) {
                Ok(techs) => {
                    let names: Vec<&str> = techs.iter().map(|t| t.name.as_str()).collect();
                    writeln!(
                        out,
                        "  {} Docs-index refreshed (stack: {})",
                        theme.check,
                        names.join(", ")
                    )?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Docs refresh failed");
                    writeln!(out, "  Docs refresh failed: {e}")?;
                }
            }
        }
        Staleness::Fresh => writeln!(out, "  {} Docs-index is up to date", theme.check)?,
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output, session};
    use ckit_stack::{MarkerTable, DOCS_INDEX_FILE};
    use ckit_test_utils::CatalogFixture;

    fn run(fx: &CatalogFixture) -> Result<String> {
        let mut buf = Vec::new();
        handle_sync_command(&session(fx), &MarkerTable, &mut buf)?;
        Ok(output(buf))
    }

    #[test]
    fn missing_target_points_at_init() {
        let fx = CatalogFixture::new().unwrap();
        let err = run(&fx).unwrap_err();
        assert!(err.to_string().contains("run 'ck init' first"));
    }

    #[test]
    fn sync_refreshes_components_then_docs() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_rule("testing", "Testing v2").unwrap();
        fx.write_target("rules/testing.md", "v1").unwrap();
        std::fs::write(fx.project.join("go.mod"), "module example\n").unwrap();

        let text = run(&fx).unwrap();
        assert!(text.contains("Updated 1 components"));
        assert!(text.contains("Docs-index needs refresh: docs-index not yet generated"));
        assert!(text.contains("Docs-index refreshed (stack: go)"));
        assert!(fx.target.join(DOCS_INDEX_FILE).is_file());

        let again = run(&fx).unwrap();
        assert!(again.contains("Updated 0 components (1 unchanged)"));
        assert!(again.contains("Docs-index is up to date"));
    }
}
