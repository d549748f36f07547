use crate::frontmatter::{extract_description, extract_skill_deps};
use crate::types::{Category, Component, ComponentKind};
use crate::{KitError, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker file that makes a directory a skill.
pub const SKILL_FILE: &str = "SKILL.md";

const MARKDOWN_EXT: &str = "md";

/// Scans a catalog root and returns one category per kind that has components.
///
/// Kinds without a directory, or whose directory yields nothing, are omitted.
/// Fails with `NotFound` only when `root` itself is missing.
pub fn scan_catalog(root: &Path) -> Result<Vec<Category>> {
    if !root.exists() {
        return Err(KitError::not_found("template directory", root));
    }
    Ok(scan_root(root))
}

/// Scans a project target. A missing target means nothing is installed yet.
pub fn scan_installed(target: &Path) -> Result<Vec<Category>> {
    if !target.exists() {
        return Ok(Vec::new());
    }
    Ok(scan_root(target))
}

fn scan_root(root: &Path) -> Vec<Category> {
    let mut categories = Vec::new();
    for kind in ComponentKind::ALL {
        let dir = root.join(kind.dir_name());
        if !dir.is_dir() {
            continue;
        }
        let mut components = match kind {
            ComponentKind::Skill => scan_skills(&dir),
            _ => scan_markdown_dir(&dir, kind),
        };
        if components.is_empty() {
            continue;
        }
        components.sort_by(|a, b| a.name.cmp(&b.name));
        categories.push(Category { kind, components });
    }
    categories
}

/// Lists a directory's entries in file-name order; unreadable directories are empty.
fn sorted_entries(dir: &Path) -> Vec<fs::DirEntry> {
    let mut entries: Vec<_> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };
    entries.sort_by_key(|e| e.file_name());
    entries
}

fn is_dir_entry(entry: &fs::DirEntry) -> bool {
    entry.path().is_dir()
}

fn scan_markdown_dir(dir: &Path, kind: ComponentKind) -> Vec<Component> {
    sorted_entries(dir)
        .into_iter()
        .filter(|entry| !is_dir_entry(entry))
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MARKDOWN_EXT) {
                return None;
            }
            let name = path.file_stem()?.to_str()?.to_string();
            Some(Component {
                kind,
                name,
                description: extract_description(&path),
                path,
            })
        })
        .collect()
}

/// Skills come in two shapes: `skills/<name>/SKILL.md` and
/// `skills/<group>/<name>/SKILL.md`. A group directory may also be a skill itself,
/// in which case both the group and its children are reported.
fn scan_skills(dir: &Path) -> Vec<Component> {
    let mut components = Vec::new();
    for entry in sorted_entries(dir) {
        if !is_dir_entry(&entry) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let skill_dir = entry.path();
        let marker = skill_dir.join(SKILL_FILE);
        if marker.is_file() {
            components.push(Component {
                kind: ComponentKind::Skill,
                name: name.clone(),
                description: extract_description(&marker),
                path: skill_dir.clone(),
            });
        }

        for sub in sorted_entries(&skill_dir) {
            if !is_dir_entry(&sub) {
                continue;
            }
            let Some(sub_name) = sub.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let sub_marker = sub.path().join(SKILL_FILE);
            if sub_marker.is_file() {
                components.push(Component {
                    kind: ComponentKind::Skill,
                    name: format!("{name}/{sub_name}"),
                    description: extract_description(&sub_marker),
                    path: sub.path(),
                });
            }
        }
    }
    components
}

/// Rejects names that are empty, absolute, contain `.`/`..` segments or
/// backslashes, or nest deeper than their kind allows (one level for skills,
/// none otherwise).
pub fn validate_name(kind: ComponentKind, name: &str) -> Result<()> {
    let invalid = || KitError::InvalidName {
        kind: kind.label().to_string(),
        name: name.to_string(),
    };
    if name.is_empty() || name.starts_with('/') || name.contains('\\') {
        return Err(invalid());
    }
    let segments: Vec<&str> = name.split('/').collect();
    let max_segments = if kind.is_directory() { 2 } else { 1 };
    if segments.len() > max_segments {
        return Err(invalid());
    }
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(invalid());
    }
    Ok(())
}

/// Location of a component under `root`: the skill directory, or the markdown file.
pub fn component_path(root: &Path, kind: ComponentKind, name: &str) -> PathBuf {
    let dir = root.join(kind.dir_name());
    if kind.is_directory() {
        dir.join(name)
    } else {
        dir.join(format!("{name}.{MARKDOWN_EXT}"))
    }
}

/// Whether `root` holds the component: a `SKILL.md` marker for skills, the
/// markdown file otherwise. Works for catalogs and targets alike.
pub fn is_installed(root: &Path, kind: ComponentKind, name: &str) -> bool {
    let path = component_path(root, kind, name);
    if kind.is_directory() {
        path.join(SKILL_FILE).is_file()
    } else {
        path.is_file()
    }
}

/// Every `(kind, name)` present under `target`.
pub fn installed_set(target: &Path) -> Result<BTreeSet<(ComponentKind, String)>> {
    Ok(scan_installed(target)?
        .into_iter()
        .flat_map(|cat| cat.components.into_iter().map(|c| (c.kind, c.name)))
        .collect())
}

/// Names of installed agents whose frontmatter lists `skill`, sorted.
pub fn find_referencing_agents(target: &Path, skill: &str) -> Vec<String> {
    let agents_dir = target.join(ComponentKind::Agent.dir_name());
    scan_markdown_dir(&agents_dir, ComponentKind::Agent)
        .into_iter()
        .filter(|agent| extract_skill_deps(&agent.path).iter().any(|d| d == skill))
        .map(|agent| agent.name)
        .collect()
}

/// SHA-256 of a file, or of every file under a directory (relative path and
/// content, in path order). Used to tell whether a copy would change anything.
pub fn hash_file(path: &Path) -> Result<String> {
    hash_tree(path, |_| false)
}

/// [`hash_file`] that leaves out directory entries whose relative path
/// satisfies `skip`, with everything beneath them.
pub fn hash_tree(path: &Path, skip: impl Fn(&Path) -> bool) -> Result<String> {
    let mut hasher = Sha256::new();
    if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !skip(e.path().strip_prefix(path).unwrap_or(e.path())))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();
        for file in files {
            let rel = file.strip_prefix(path).unwrap_or(&file);
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update(
                fs::read(&file)
                    .map_err(|e| KitError::io(format!("hashing {}", file.display()), e))?,
            );
        }
    } else {
        hasher.update(
            fs::read(path).map_err(|e| KitError::io(format!("hashing {}", path.display()), e))?,
        );
    }
    Ok(format!("{:x}", hasher.finalize()))
}
