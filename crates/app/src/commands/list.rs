use crate::commands::Session;
use crate::theme::truncate;
use anyhow::{Context, Result};
use ckit_discovery::{installed_set, scan_catalog, ComponentKind};
use serde::Serialize;
use std::io::Write;

/// Which catalog entries `list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ListFilter {
    #[default]
    All,
    Available,
    Installed,
}

impl ListFilter {
    pub(crate) fn from_flags(available: bool, installed: bool) -> Self {
        match (available, installed) {
            (true, _) => ListFilter::Available,
            (_, true) => ListFilter::Installed,
            _ => ListFilter::All,
        }
    }

    fn keeps(self, installed: bool) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Available => !installed,
            ListFilter::Installed => installed,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    kind: ComponentKind,
    name: &'a str,
    description: &'a str,
    installed: bool,
}

/// Handle the `list` command.
pub(crate) fn handle_list_command(
    session: &Session,
    filter: ListFilter,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let catalog = scan_catalog(session.kit.catalog()).context("scanning templates")?;
    let installed = installed_set(session.kit.target()).context("reading installed components")?;
    let is_installed = |kind: ComponentKind, name: &str| installed.contains(&(kind, name.to_string()));

    if json {
        let entries: Vec<ListEntry<'_>> = catalog
            .iter()
            .flat_map(|cat| cat.components.iter())
            .map(|c| ListEntry {
                kind: c.kind,
                name: &c.name,
                description: &c.description,
                installed: is_installed(c.kind, &c.name),
            })
            .filter(|e| filter.keeps(e.installed))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    let theme = &session.theme;
    let total: usize = catalog.iter().map(|c| c.components.len()).sum();
    let available = catalog
        .iter()
        .flat_map(|cat| cat.components.iter())
        .filter(|c| !is_installed(c.kind, &c.name))
        .count();
    writeln!(out, "{}", theme.banner())?;
    writeln!(
        out,
        "  {} {} installed  {} {} available",
        theme.bullet,
        installed.len(),
        theme.dot,
        available
    )?;
    tracing::debug!(total, installed = installed.len(), "Listing catalog");

    for cat in &catalog {
        if filter == ListFilter::Installed
            && !cat.components.iter().any(|c| is_installed(c.kind, &c.name))
        {
            continue;
        }
        writeln!(out, "{}", theme.section(&cat.kind.dir_name().to_uppercase()))?;

        let rows: Vec<_> = cat
            .components
            .iter()
            .map(|c| (c, is_installed(c.kind, &c.name)))
            .filter(|(_, inst)| filter.keeps(*inst))
            .collect();
        if rows.is_empty() {
            writeln!(out, "    (none)")?;
            continue;
        }
        for (c, inst) in rows {
            let status = if inst { theme.check } else { theme.dot };
            writeln!(
                out,
                "    {status} {:<30} {}",
                c.name,
                truncate(&c.description, 55)
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "  Run 'ck add' to install agents interactively")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output, session};
    use ckit_test_utils::CatalogFixture;

    fn fixture() -> CatalogFixture {
        let fx = CatalogFixture::new().unwrap();
        fx.add_agent("backend", "Backend engineer", &[]).unwrap();
        fx.add_agent("frontend", &"Builds user interfaces ".repeat(5), &[])
            .unwrap();
        fx.add_rule("testing", "Testing rules").unwrap();
        fx.write_target("agents/backend.md", "---\ndescription: x\n---\n")
            .unwrap();
        fx
    }

    fn list(fx: &CatalogFixture, filter: ListFilter, json: bool) -> String {
        let mut buf = Vec::new();
        handle_list_command(&session(fx), filter, json, &mut buf).unwrap();
        output(buf)
    }

    #[test]
    fn table_shows_counts_sections_and_markers() {
        let fx = fixture();
        let text = list(&fx, ListFilter::All, false);
        assert!(text.contains("* 1 installed  - 2 available"));
        assert!(text.contains("> AGENTS"));
        assert!(text.contains("> RULES"));
        assert!(text.contains("+ backend"));
        assert!(text.contains("- frontend"));
        assert!(text.contains("..."), "long description should be cut");
        assert!(text.contains("Run 'ck add'"));
    }

    #[test]
    fn installed_filter_skips_categories_without_installs() {
        let fx = fixture();
        let text = list(&fx, ListFilter::Installed, false);
        assert!(text.contains("> AGENTS"));
        assert!(!text.contains("> RULES"));
        assert!(!text.contains("frontend"));
    }

    #[test]
    fn available_filter_prints_none_for_exhausted_category() {
        let fx = CatalogFixture::new().unwrap();
        fx.add_rule("testing", "Testing rules").unwrap();
        fx.write_target("rules/testing.md", "x").unwrap();
        let text = list(&fx, ListFilter::Available, false);
        assert!(text.contains("> RULES"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn json_output_is_filtered_and_parseable() {
        let fx = fixture();
        let text = list(&fx, ListFilter::Available, true);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e["installed"] == false));
        assert_eq!(entries[0]["kind"], "agent");
        assert_eq!(entries[0]["name"], "frontend");
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let fx = CatalogFixture::new().unwrap();
        std::fs::remove_dir_all(&fx.catalog).unwrap();
        let mut buf = Vec::new();
        let err = handle_list_command(&session(&fx), ListFilter::All, false, &mut buf).unwrap_err();
        assert!(format!("{err:#}").contains("scanning templates"));
    }

    #[test]
    fn filter_flags_map_to_variants() {
        assert_eq!(ListFilter::from_flags(false, false), ListFilter::All);
        assert_eq!(ListFilter::from_flags(true, false), ListFilter::Available);
        assert_eq!(ListFilter::from_flags(false, true), ListFilter::Installed);
    }
}
