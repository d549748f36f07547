//! CLI command handlers for the `ck` application.

mod add;
mod dep;
mod docs;
mod init;
mod list;
mod remove;
mod sync;
mod teammate;

pub(crate) use add::handle_add_command;
pub(crate) use dep::{handle_dep_install_command, ProcessInstaller, REGISTRY};
pub(crate) use docs::handle_docs_command;
pub(crate) use init::handle_init_command;
pub(crate) use list::{handle_list_command, ListFilter};
pub(crate) use remove::handle_remove_command;
pub(crate) use sync::handle_sync_command;
pub(crate) use teammate::handle_teammate_mode_command;

use crate::theme::Theme;
use anyhow::{Context, Result};
use ckit_discovery::ComponentKind;
use ckit_state::{project_root, target_dir, template_dir};
use ckit_sync::Kit;
use std::path::{Path, PathBuf};

/// Resolved catalog, project, and presentation for one invocation.
pub(crate) struct Session {
    pub(crate) kit: Kit,
    pub(crate) project: PathBuf,
    pub(crate) theme: Theme,
}

impl Session {
    /// Resolves the catalog and project roots and loads the role table.
    pub(crate) fn open(
        template: Option<&Path>,
        project: Option<&Path>,
        theme: Theme,
    ) -> Result<Self> {
        let catalog = template_dir(template);
        let project = project_root(project).context("resolving project root")?;
        let target = target_dir(&project);
        tracing::debug!(catalog = %catalog.display(), target = %target.display(), "Resolved roots");
        let kit = Kit::open(catalog, target).context("loading role table")?;
        Ok(Self {
            kit,
            project,
            theme,
        })
    }
}

/// Splits `[<kind>] <names..>`. A leading kind only counts when names follow it.
pub(crate) fn split_kind_args(args: &[String]) -> (Option<ComponentKind>, &[String]) {
    if args.len() >= 2 {
        if let Ok(kind) = args[0].parse::<ComponentKind>() {
            return (Some(kind), &args[1..]);
        }
    }
    (None, args)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use ckit_sync::RoleTable;
    use ckit_test_utils::CatalogFixture;

    pub(crate) fn session(fx: &CatalogFixture) -> Session {
        Session {
            kit: Kit::new(&fx.catalog, &fx.target, RoleTable::builtin()),
            project: fx.project.clone(),
            theme: Theme::ascii(),
        }
    }

    pub(crate) fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn kind_prefix_needs_a_name_after_it() {
        let a = args(&["skill", "testing"]);
        let (kind, names) = split_kind_args(&a);
        assert_eq!(kind, Some(ComponentKind::Skill));
        assert_eq!(names, &a[1..]);

        let lone = args(&["rules"]);
        assert_eq!(split_kind_args(&lone), (None, &lone[..]));
    }

    #[test]
    fn plain_names_have_no_kind() {
        let a = args(&["backend", "frontend"]);
        assert_eq!(split_kind_args(&a), (None, &a[..]));
    }
}
