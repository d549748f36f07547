use crate::detect::{dependency_hash, StackDetector, Tech, TechCategory};
use ckit_discovery::{KitError, Result};
use ckit_state::{atomic_write, target_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Generated index, inside the project's `.claude` directory.
pub const DOCS_INDEX_FILE: &str = "docs-index.md";
/// Generation metadata, inside the project's `.claude` directory.
pub const DOCS_META_FILE: &str = ".docs-meta.json";
/// Age after which the index is regenerated regardless of dependencies.
pub const STALE_DAYS: i64 = 14;

/// Contents of `.docs-meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsMeta {
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    /// [`dependency_hash`] at generation time.
    pub dependency_hash: String,
    /// Detected technology names.
    pub detected_stack: Vec<String>,
}

/// Whether `docs-index.md` should be regenerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Up to date.
    Fresh,
    /// Needs regeneration, with the reason.
    Stale(String),
}

impl Staleness {
    /// True for `Stale`.
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

fn directive(tech: &str) -> Option<&'static str> {
    let text = match tech {
        "nextjs" => "## Next.js\n\
- Build routes under app/ with layout, loading, error and not-found files\n\
- Components render on the server unless marked \"use client\"\n\
- Fetch data inside server components; API endpoints live in app/**/route.ts\n\
- Prefer next/image, next/link and next/font over raw tags\n\
- Only NEXT_PUBLIC_ variables reach the browser",
        "react" => "## React\n\
- Function components and hooks only\n\
- Keep state local; lift it to the nearest shared parent when siblings need it\n\
- Every useEffect declares its dependencies and cleans up what it subscribes to\n\
- Reach for useMemo/useCallback after measuring, not by habit\n\
- Extract reusable stateful logic into use* hooks",
        "vue" => "## Vue\n\
- <script setup> with the Composition API for new components\n\
- ref for primitives, reactive for objects, computed for derived values\n\
- Type props and emits through defineProps/defineEmits generics\n\
- Shared state in Pinia stores, shared logic in composables",
        "angular" => "## Angular\n\
- Standalone components; no new NgModules\n\
- Signals for component state and OnPush change detection everywhere\n\
- Use inject() instead of constructor parameters\n\
- Let the async pipe own subscriptions in templates",
        "svelte" => "## Svelte\n\
- Svelte 5 runes: $state, $derived, $effect, $props\n\
- Snippets instead of slots\n\
- SvelteKit load functions for reads, form actions for writes",
        "express" => "## Express\n\
- Group routes with Router and scope middleware to them\n\
- Register the four-argument error handler last\n\
- Validate body, params and query at the top of each handler\n\
- Do not leak stack traces in production responses",
        "fastify" => "## Fastify\n\
- Declare JSON schemas for requests and responses\n\
- Encapsulate features as plugins registered with a prefix\n\
- Share utilities through decorators, not module globals",
        "nestjs" => "## NestJS\n\
- One module per feature; business logic in providers\n\
- Validate input with DTOs and class-validator\n\
- Guards for auth, pipes for validation, interceptors for cross-cutting work\n\
- Controllers never talk to the database directly",
        "django" => "## Django\n\
- Schema changes go through migrations\n\
- Validate input with forms or serializers\n\
- Avoid N+1 queries with select_related and prefetch_related\n\
- Split settings per environment and read secrets from the environment",
        "flask" => "## Flask\n\
- Application factory (create_app) and blueprints per feature\n\
- SQLAlchemy models with Alembic/Flask-Migrate migrations\n\
- Central error handlers for a consistent error shape",
        "fastapi" => "## FastAPI\n\
- Pydantic models for every request and response\n\
- Dependencies for sessions, auth and settings\n\
- async def for I/O-bound endpoints\n\
- Version APIs with router prefixes",
        "rails" => "## Rails\n\
- Follow Rails naming and directory conventions\n\
- Permit parameters explicitly in controllers\n\
- Move multi-model workflows into service objects\n\
- Preload associations to avoid N+1 queries",
        "typescript" => "## TypeScript\n\
- strict mode on\n\
- Model variants with discriminated unions instead of casts\n\
- unknown plus narrowing instead of any\n\
- Use satisfies to check object literals without widening",
        "go" => "## Go\n\
- Accept interfaces, return concrete types\n\
- Wrap errors with context using %w\n\
- context.Context is the first parameter and is never stored\n\
- Table-driven tests; every goroutine has a way to stop",
        "python" => "## Python\n\
- Type hints on public functions, checked by mypy or pyright\n\
- dataclasses or Pydantic models instead of loose dicts\n\
- pathlib for paths, context managers for resources\n\
- One virtual environment per project",
        "rust" => "## Rust\n\
- Propagate errors with ? and typed errors; no unwrap outside tests\n\
- Borrow by default, clone deliberately\n\
- Run clippy and rustfmt before committing",
        "terraform" => "## Terraform\n\
- Reusable modules with described, validated variables\n\
- Remote state with locking\n\
- prevent_destroy on stateful resources\n\
- Refactor with moved blocks, not manual state edits",
        "docker" => "## Docker\n\
- Multi-stage builds and a pinned base image tag\n\
- Run as a non-root USER\n\
- Copy only what the image needs; keep .dockerignore current\n\
- Add a HEALTHCHECK",
        "kubernetes" => "## Kubernetes\n\
- Set resource requests and limits on every container\n\
- Separate liveness and readiness probes\n\
- Configuration from ConfigMaps and Secrets, never baked into images\n\
- PodDisruptionBudgets for anything that must stay up",
        "prisma" => "## Prisma\n\
- schema.prisma is the source of truth; change it through migrations\n\
- Select only the fields you need\n\
- Wrap multi-step writes in $transaction",
        "tailwind" => "## Tailwind CSS\n\
- Utility classes in markup; @apply only for true repetition\n\
- Extend the theme for design tokens\n\
- Mobile-first breakpoints",
        "github-actions" => "## GitHub Actions\n\
- Pin third-party actions to a commit SHA\n\
- Prefer GITHUB_TOKEN with minimal permissions over personal tokens\n\
- Cache dependencies and cancel superseded runs with concurrency groups",
        _ => return None,
    };
    Some(text)
}

/// Renders `docs-index.md` for the given technologies.
pub fn render_index(techs: &[Tech]) -> String {
    let mut out = String::from("# Docs Index\n\n");
    out.push_str("<!-- Generated by ck docs. Do not edit by hand. -->\n");
    out.push_str("<!-- Regenerate with `ck docs --refresh`. -->\n\n");

    if techs.is_empty() {
        out.push_str(
            "No stack detected. Add dependency files (package.json, go.mod, etc.) and re-run.\n",
        );
        return out;
    }

    let names: Vec<&str> = techs.iter().map(|t| t.name.as_str()).collect();
    out.push_str(&format!("**Detected stack:** {}\n\n", names.join(", ")));

    out.push_str("| Category | Technologies |\n");
    out.push_str("|----------|-------------|\n");
    for category in TechCategory::ORDER {
        let in_category: Vec<&str> = techs
            .iter()
            .filter(|t| t.category == category)
            .map(|t| t.name.as_str())
            .collect();
        if !in_category.is_empty() {
            out.push_str(&format!(
                "| {} | {} |\n",
                category.as_str(),
                in_category.join(", ")
            ));
        }
    }
    out.push_str("\n---\n\n");

    for text in techs.iter().filter_map(|t| directive(&t.name)) {
        out.push_str(text);
        out.push_str("\n\n");
    }
    out
}

/// [`generate_at`] with the current time.
pub fn generate(project: &Path, detector: &dyn StackDetector) -> Result<Vec<Tech>> {
    generate_at(project, detector, OffsetDateTime::now_utc())
}

/// Writes `docs-index.md` and `.docs-meta.json` into `<project>/.claude`.
/// Returns the detected technologies.
pub fn generate_at(
    project: &Path,
    detector: &dyn StackDetector,
    now: OffsetDateTime,
) -> Result<Vec<Tech>> {
    let techs = detector.detect(project);
    let hash = dependency_hash(project, &detector.dependency_files(project));
    let dir = target_dir(project);

    atomic_write(&dir.join(DOCS_INDEX_FILE), render_index(&techs).as_bytes())?;

    let meta_path = dir.join(DOCS_META_FILE);
    let generated_at = now
        .replace_nanosecond(0)
        .unwrap_or(now)
        .format(&Rfc3339)
        .map_err(|e| KitError::Malformed {
            path: meta_path.clone(),
            reason: e.to_string(),
        })?;
    let meta = DocsMeta {
        generated_at,
        dependency_hash: hash,
        detected_stack: techs.iter().map(|t| t.name.clone()).collect(),
    };
    let json = serde_json::to_vec_pretty(&meta).map_err(|e| KitError::Malformed {
        path: meta_path.clone(),
        reason: e.to_string(),
    })?;
    atomic_write(&meta_path, &json)?;

    tracing::info!(project = %project.display(), techs = techs.len(), "Generated docs index");
    Ok(techs)
}

/// Decides whether the docs index for `project` needs regenerating at `now`.
pub fn staleness(project: &Path, detector: &dyn StackDetector, now: OffsetDateTime) -> Staleness {
    let meta_path = target_dir(project).join(DOCS_META_FILE);
    let Ok(text) = fs::read_to_string(&meta_path) else {
        return Staleness::Stale("docs-index not yet generated".into());
    };
    let Ok(meta) = serde_json::from_str::<DocsMeta>(&text) else {
        return Staleness::Stale(format!("corrupted {DOCS_META_FILE}"));
    };

    if dependency_hash(project, &detector.dependency_files(project)) != meta.dependency_hash {
        return Staleness::Stale("dependency files have changed".into());
    }

    let Ok(generated) = OffsetDateTime::parse(&meta.generated_at, &Rfc3339) else {
        return Staleness::Stale(format!("invalid timestamp in {DOCS_META_FILE}"));
    };
    let age = now - generated;
    if age > Duration::days(STALE_DAYS) {
        return Staleness::Stale(format!(
            "docs-index is {} days old (threshold: {STALE_DAYS} days)",
            age.whole_days()
        ));
    }
    Staleness::Fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::MockStackDetector;
    use tempfile::tempdir;

    fn detector(techs: Vec<Tech>, files: Vec<String>) -> MockStackDetector {
        let mut mock = MockStackDetector::new();
        mock.expect_detect().returning(move |_| techs.clone());
        mock.expect_dependency_files()
            .returning(move |_| files.clone());
        mock
    }

    fn at(day: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(day)
    }

    #[test]
    fn empty_stack_renders_hint() {
        let index = render_index(&[]);
        assert!(index.starts_with("# Docs Index\n"));
        assert!(index.contains("No stack detected"));
    }

    #[test]
    fn table_follows_category_order() {
        let index = render_index(&[
            Tech::new("docker", TechCategory::Tool),
            Tech::new("go", TechCategory::Language),
            Tech::new("node", TechCategory::Runtime),
        ]);
        let lang = index.find("| language | go |").unwrap();
        let runtime = index.find("| runtime | node |").unwrap();
        let tool = index.find("| tool | docker |").unwrap();
        assert!(lang < runtime && runtime < tool);
        assert!(index.contains("## Go\n"));
        assert!(index.contains("## Docker\n"));
    }

    #[test]
    fn missing_meta_is_stale() {
        let tmp = tempdir().unwrap();
        let mock = detector(vec![], vec![]);
        assert_eq!(
            staleness(tmp.path(), &mock, at(0)),
            Staleness::Stale("docs-index not yet generated".into())
        );
    }

    #[test]
    fn fresh_until_threshold() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("go.mod"), "module x").unwrap();
        let mock = detector(
            vec![Tech::new("go", TechCategory::Language)],
            vec!["go.mod".into()],
        );
        let techs = generate_at(tmp.path(), &mock, at(100)).unwrap();
        assert_eq!(techs.len(), 1);

        let meta: DocsMeta = serde_json::from_str(
            &fs::read_to_string(tmp.path().join(".claude").join(DOCS_META_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(meta.detected_stack, vec!["go"]);
        assert_eq!(meta.dependency_hash.len(), 16);
        assert!(!meta.generated_at.contains('.'));

        assert_eq!(staleness(tmp.path(), &mock, at(114)), Staleness::Fresh);
        let old = staleness(tmp.path(), &mock, at(115));
        assert_eq!(
            old,
            Staleness::Stale("docs-index is 15 days old (threshold: 14 days)".into())
        );
    }

    #[test]
    fn dependency_change_is_stale() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("go.mod"), "module x").unwrap();
        let mock = detector(vec![], vec!["go.mod".into()]);
        generate_at(tmp.path(), &mock, at(0)).unwrap();
        fs::write(tmp.path().join("go.mod"), "module y").unwrap();
        assert_eq!(
            staleness(tmp.path(), &mock, at(0)),
            Staleness::Stale("dependency files have changed".into())
        );
    }

    #[test]
    fn corrupted_and_bad_timestamp_are_stale() {
        let tmp = tempdir().unwrap();
        let meta_path = tmp.path().join(".claude").join(DOCS_META_FILE);
        fs::create_dir_all(meta_path.parent().unwrap()).unwrap();
        let mock = detector(vec![], vec![]);

        fs::write(&meta_path, "{").unwrap();
        assert_eq!(
            staleness(tmp.path(), &mock, at(0)),
            Staleness::Stale("corrupted .docs-meta.json".into())
        );

        fs::write(
            &meta_path,
            r#"{"generated_at": "yesterday", "dependency_hash": "", "detected_stack": []}"#,
        )
        .unwrap();
        assert_eq!(
            staleness(tmp.path(), &mock, at(0)),
            Staleness::Stale("invalid timestamp in .docs-meta.json".into())
        );
    }
}
