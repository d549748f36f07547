use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Broad grouping used in the docs index summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    /// Programming language.
    Language,
    /// Runtime environment.
    Runtime,
    /// Application or UI framework.
    Framework,
    /// Build, infra, or data tooling.
    Tool,
}

impl TechCategory {
    /// Summary table order.
    pub const ORDER: [TechCategory; 4] = [
        TechCategory::Language,
        TechCategory::Runtime,
        TechCategory::Framework,
        TechCategory::Tool,
    ];

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            TechCategory::Language => "language",
            TechCategory::Runtime => "runtime",
            TechCategory::Framework => "framework",
            TechCategory::Tool => "tool",
        }
    }
}

/// A detected technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tech {
    /// Lowercase identifier, e.g. `nextjs`.
    pub name: String,
    /// Grouping.
    pub category: TechCategory,
}

impl Tech {
    /// Builds a tech entry.
    pub fn new(name: impl Into<String>, category: TechCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// Figures out what a project is built with.
#[cfg_attr(test, automock)]
pub trait StackDetector {
    /// Technologies in the project, unique by name and sorted by name.
    fn detect(&self, project: &Path) -> Vec<Tech>;

    /// Dependency files present at the project root, sorted.
    fn dependency_files(&self, project: &Path) -> Vec<String>;
}

use TechCategory::{Framework, Language, Runtime, Tool};

const DEPENDENCY_FILES: &[(&str, &[(&str, TechCategory)])] = &[
    ("package.json", &[("node", Runtime), ("javascript", Language)]),
    ("tsconfig.json", &[("typescript", Language)]),
    ("go.mod", &[("go", Language)]),
    ("requirements.txt", &[("python", Language)]),
    ("pyproject.toml", &[("python", Language)]),
    ("Pipfile", &[("python", Language)]),
    ("Gemfile", &[("ruby", Language)]),
    ("Cargo.toml", &[("rust", Language)]),
    ("pom.xml", &[("java", Language)]),
    ("build.gradle", &[("java", Language)]),
    ("build.gradle.kts", &[("kotlin", Language)]),
    ("composer.json", &[("php", Language)]),
    ("Dockerfile", &[("docker", Tool)]),
    ("docker-compose.yml", &[("docker-compose", Tool)]),
    ("docker-compose.yaml", &[("docker-compose", Tool)]),
    (".terraform.lock.hcl", &[("terraform", Tool)]),
    ("Makefile", &[("make", Tool)]),
];

/// `(file, substring, tech, category)`: the file mentions the substring.
const CONTENT_MARKERS: &[(&str, &str, &str, TechCategory)] = &[
    ("package.json", "\"next\"", "nextjs", Framework),
    ("package.json", "\"react\"", "react", Framework),
    ("package.json", "\"vue\"", "vue", Framework),
    ("package.json", "\"nuxt\"", "nuxt", Framework),
    ("package.json", "\"svelte\"", "svelte", Framework),
    ("package.json", "\"@angular/core\"", "angular", Framework),
    ("package.json", "\"express\"", "express", Framework),
    ("package.json", "\"fastify\"", "fastify", Framework),
    ("package.json", "\"hono\"", "hono", Framework),
    ("package.json", "\"nest\"", "nestjs", Framework),
    ("package.json", "\"@nestjs/core\"", "nestjs", Framework),
    ("package.json", "\"tailwindcss\"", "tailwind", Framework),
    ("package.json", "\"prisma\"", "prisma", Tool),
    ("package.json", "\"drizzle-orm\"", "drizzle", Tool),
    ("requirements.txt", "django", "django", Framework),
    ("requirements.txt", "flask", "flask", Framework),
    ("requirements.txt", "fastapi", "fastapi", Framework),
    ("pyproject.toml", "django", "django", Framework),
    ("pyproject.toml", "flask", "flask", Framework),
    ("pyproject.toml", "fastapi", "fastapi", Framework),
    ("Gemfile", "rails", "rails", Framework),
    ("Gemfile", "sinatra", "sinatra", Framework),
    ("composer.json", "laravel", "laravel", Framework),
    ("composer.json", "symfony", "symfony", Framework),
];

const DIRECTORY_MARKERS: &[(&str, &str)] = &[
    (".github", "github-actions"),
    (".github/workflows", "github-actions"),
    (".gitlab-ci", "gitlab-ci"),
    ("k8s", "kubernetes"),
    ("helm", "helm"),
    ("infra", "infrastructure"),
];

const TERRAFORM_DIRS: [&str; 2] = [".", "infra"];

/// Default detector backed by fixed marker tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerTable;

fn has_terraform_sources(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                let path = e.path();
                path.is_file() && path.extension().is_some_and(|ext| ext == "tf")
            })
        })
        .unwrap_or(false)
}

impl StackDetector for MarkerTable {
    fn detect(&self, project: &Path) -> Vec<Tech> {
        let mut found: BTreeMap<String, TechCategory> = BTreeMap::new();
        let mut add = |name: &str, category: TechCategory| {
            found.entry(name.to_string()).or_insert(category);
        };

        for (file, techs) in DEPENDENCY_FILES {
            if project.join(file).exists() {
                for (name, category) in *techs {
                    add(name, *category);
                }
            }
        }

        if TERRAFORM_DIRS
            .iter()
            .any(|d| has_terraform_sources(&project.join(d)))
        {
            add("terraform", Tool);
        }

        let mut contents: BTreeMap<&str, Option<String>> = BTreeMap::new();
        for (file, needle, name, category) in CONTENT_MARKERS {
            let text = contents
                .entry(file)
                .or_insert_with(|| fs::read_to_string(project.join(file)).ok());
            if text.as_deref().is_some_and(|t| t.contains(needle)) {
                add(name, *category);
            }
        }

        for (dir, name) in DIRECTORY_MARKERS {
            if project.join(dir).is_dir() {
                add(name, Tool);
            }
        }

        let techs: Vec<Tech> = found
            .into_iter()
            .map(|(name, category)| Tech { name, category })
            .collect();
        tracing::debug!(project = %project.display(), count = techs.len(), "Detected stack");
        techs
    }

    fn dependency_files(&self, project: &Path) -> Vec<String> {
        let mut files: Vec<String> = DEPENDENCY_FILES
            .iter()
            .map(|(file, _)| *file)
            .filter(|file| project.join(file).exists())
            .map(str::to_string)
            .collect();
        files.sort();
        files
    }
}

/// First 16 hex chars of SHA-256 over each file's name then content, in the
/// given order. Empty when `files` is empty; unreadable files are skipped.
pub fn dependency_hash(project: &Path, files: &[String]) -> String {
    if files.is_empty() {
        return String::new();
    }
    let mut hasher = Sha256::new();
    for file in files {
        match fs::read(project.join(file)) {
            Ok(data) => {
                hasher.update(file.as_bytes());
                hasher.update(&data);
            }
            Err(e) => tracing::debug!(file = %file, error = %e, "Skipping unreadable dependency file"),
        }
    }
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(16);
    hex
}
