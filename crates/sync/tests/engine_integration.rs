//! End-to-end install/remove/sync behaviour against a fixture catalog.

use ckit_discovery::{installed_set, ComponentKind};
use ckit_sync::{
    DepOrigin, DepStatus, InstallOutcome, Kit, RemoveOutcome, RoleTable, SkipReason,
};
use ckit_test_utils::CatalogFixture;
use std::fs;

/// Catalog with a backend agent, its declared skill, and a few role deps.
fn backend_catalog() -> CatalogFixture {
    let fx = CatalogFixture::new().unwrap();
    fx.add_base_files("# Project", "{\"teammateMode\": \"auto\"}")
        .unwrap();
    fx.add_agent("backend", "Backend developer", &["api-design", "ghost-skill"])
        .unwrap();
    fx.add_skill("api-design", "API design").unwrap();
    fx.write_catalog("skills/api-design/reference/rest.md", "# REST")
        .unwrap();
    fx.add_skill("git-commit-helper", "Commits").unwrap();
    fx.add_rule("code-style", "Style").unwrap();
    fx.add_rule("testing", "Testing").unwrap();
    fx.add_command("review", "Review").unwrap();
    fx.add_command("role-backend", "Backend role").unwrap();
    fx
}

fn kit(fx: &CatalogFixture) -> Kit {
    Kit::new(&fx.catalog, &fx.target, RoleTable::builtin())
}

#[test]
fn installed_then_queried() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    assert!(!kit.is_installed(ComponentKind::Skill, "api-design"));
    kit.install(ComponentKind::Skill, "api-design").unwrap();
    assert!(kit.is_installed(ComponentKind::Skill, "api-design"));
    assert_eq!(
        fx.read_target("skills/api-design/reference/rest.md").unwrap(),
        "# REST"
    );
    assert!(!kit.is_installed(ComponentKind::Rule, "testing"));
}

#[test]
fn installing_twice_matches_installing_once() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    kit.install(ComponentKind::Skill, "api-design").unwrap();
    let first = fx.read_target("skills/api-design/SKILL.md").unwrap();
    assert_eq!(
        kit.install(ComponentKind::Skill, "api-design").unwrap(),
        InstallOutcome::Updated
    );
    assert_eq!(fx.read_target("skills/api-design/SKILL.md").unwrap(), first);
}

#[test]
fn agent_pulls_declared_and_role_dependencies() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    let report = kit.install_agent("backend").unwrap();

    assert_eq!(report.outcome, InstallOutcome::Installed);
    let added: Vec<String> = report.added().map(|d| d.key()).collect();
    assert_eq!(
        added,
        vec![
            "skills/api-design",
            "skills/git-commit-helper",
            "rules/code-style",
            "rules/testing",
            "commands/review",
            "commands/role-backend",
        ]
    );

    let ghost: Vec<_> = report.missing_declared_skills().collect();
    assert_eq!(ghost.len(), 1);
    assert_eq!(ghost[0].name, "ghost-skill");

    // Role-table entries the catalog lacks are missing, not failures.
    let security = report
        .deps
        .iter()
        .find(|d| d.kind == ComponentKind::Rule && d.name == "security")
        .unwrap();
    assert_eq!(security.origin, DepOrigin::Role);
    assert_eq!(security.status, DepStatus::Missing);
    assert_eq!(report.failed().count(), 0);
}

#[test]
fn already_present_dependencies_are_left_alone() {
    let fx = backend_catalog();
    fx.write_target("rules/testing.md", "local edits").unwrap();
    let report = kit(&fx).install_agent("backend").unwrap();
    let testing = report.deps.iter().find(|d| d.name == "testing").unwrap();
    assert_eq!(testing.status, DepStatus::AlreadyPresent);
    assert_eq!(fx.read_target("rules/testing.md").unwrap(), "local edits");
}

#[test]
fn batch_install_continues_past_failures() {
    let fx = backend_catalog();
    let report = kit(&fx).install_all(ComponentKind::Rule, &["nope", "testing"]);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.succeeded().map(|(n, _)| n).collect::<Vec<_>>(), vec!["testing"]);

    let agents = kit(&fx).install_agents(&["missing-agent", "backend"]);
    assert!(agents.failed().next().unwrap().1.is_not_found());
    assert_eq!(agents.succeeded().count(), 1);
}

#[test]
fn removing_never_installed_changes_nothing() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    kit.install(ComponentKind::Rule, "testing").unwrap();
    let before = installed_set(&fx.target).unwrap();
    assert_eq!(
        kit.remove(ComponentKind::Command, "review").unwrap(),
        RemoveOutcome::NotInstalled
    );
    assert_eq!(installed_set(&fx.target).unwrap(), before);
}

#[test]
fn removing_referenced_skill_warns_but_proceeds() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    kit.install_agent("backend").unwrap();
    let outcome = kit.remove(ComponentKind::Skill, "api-design").unwrap();
    assert_eq!(
        outcome,
        RemoveOutcome::Removed {
            referenced_by: vec!["backend".to_string()]
        }
    );
    assert!(!fx.target.join("skills/api-design").exists());
}

#[test]
fn sync_never_introduces_components() {
    let fx = backend_catalog();
    let kit = kit(&fx);
    kit.install(ComponentKind::Rule, "testing").unwrap();
    fx.write_target("commands/my-own.md", "mine").unwrap();
    fs::write(fx.catalog.join("rules/testing.md"), "updated upstream").unwrap();
    let before = installed_set(&fx.target).unwrap();

    let report = kit.sync().unwrap();

    assert_eq!(installed_set(&fx.target).unwrap(), before);
    assert_eq!(report.updated, vec!["rules/testing"]);
    assert_eq!(report.base_files, vec!["CLAUDE.md", "settings.json"]);
    assert!(report.skipped.contains(&SkipReason::NotInCatalog {
        item: "commands/my-own".into()
    }));
    assert_eq!(fx.read_target("rules/testing.md").unwrap(), "updated upstream");
    assert_eq!(fx.read_target("commands/my-own.md").unwrap(), "mine");

    let again = kit.sync().unwrap();
    assert!(again.updated.is_empty());
    assert!(again.skipped.contains(&SkipReason::Unchanged {
        item: "rules/testing".into()
    }));
}

#[test]
fn sync_refreshes_group_skill_without_restoring_removed_children() {
    let fx = backend_catalog();
    fx.add_skill("security", "Security").unwrap();
    fx.add_skill("security/pentest-web", "Web pentesting").unwrap();
    fx.add_skill("security/threat-model", "Threat modeling").unwrap();
    let kit = kit(&fx);
    kit.install(ComponentKind::Skill, "security").unwrap();
    kit.remove(ComponentKind::Skill, "security/pentest-web").unwrap();
    fx.write_catalog("skills/security/SKILL.md", "---\ndescription: Revised\n---\n")
        .unwrap();
    fx.add_skill("security/supply-chain", "Added upstream").unwrap();
    let before = installed_set(&fx.target).unwrap();

    let report = kit.sync().unwrap();

    assert_eq!(installed_set(&fx.target).unwrap(), before);
    assert!(!fx.target.join("skills/security/pentest-web").exists());
    assert!(!fx.target.join("skills/security/supply-chain").exists());
    assert!(fx
        .read_target("skills/security/SKILL.md")
        .unwrap()
        .contains("Revised"));
    assert!(report.updated.contains(&"skills/security".to_string()));

    let again = kit.sync().unwrap();
    assert!(again.updated.is_empty());
}

#[test]
fn sync_requires_target() {
    let fx = backend_catalog();
    assert!(kit(&fx).sync().unwrap_err().is_not_found());
}

#[test]
fn catalog_roles_file_changes_expansion() {
    let fx = backend_catalog();
    fx.write_catalog("roles.yaml", "roles:\n  backend:\n    rules: [testing]\n")
        .unwrap();
    let kit = Kit::open(&fx.catalog, &fx.target).unwrap();
    let report = kit.install_agent("backend").unwrap();
    assert!(report.deps.iter().all(|d| d.name != "code-style"));
    assert!(kit.is_installed(ComponentKind::Rule, "testing"));
}
