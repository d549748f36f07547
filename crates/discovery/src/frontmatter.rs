//! Minimal frontmatter recognizer for component markdown files.
//!
//! Only two fields are consumed: `description` (every component) and
//! `skills` (agents). The recognizer is line based and does not attempt to
//! be a YAML parser:
//!
//! ```yaml
//! ---
//! description: "One-line summary"
//! skills:
//!   - skill-one
//!   - skill-two
//! ---
//! ```
//!
//! or inline: `skills: skill-one, skill-two`.

use std::fs;
use std::path::Path;

const DELIMITER: &str = "---";
const DESCRIPTION_KEY: &str = "description:";
const SKILLS_KEY: &str = "skills:";

/// Yields the lines between the opening and closing `---`.
///
/// Lines before the opening delimiter are skipped; iteration stops at the
/// closing delimiter or end of input.
fn frontmatter_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut inside = false;
    content
        .lines()
        .map(move |line| {
            if line.trim() == DELIMITER {
                if inside {
                    return None;
                }
                inside = true;
                return Some(None);
            }
            Some(inside.then_some(line))
        })
        .take_while(Option::is_some)
        .flatten()
        .flatten()
}

fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Returns the frontmatter `description`, or an empty string.
///
/// ```
/// use ckit_discovery::parse_description;
///
/// let md = "---\nname: reviewer\ndescription: \"Reviews code\"\n---\n# Body\n";
/// assert_eq!(parse_description(md), "Reviews code");
/// assert_eq!(parse_description("# No frontmatter\n"), "");
/// ```
pub fn parse_description(content: &str) -> String {
    frontmatter_lines(content)
        .find_map(|line| line.strip_prefix(DESCRIPTION_KEY))
        .map(|rest| strip_matching_quotes(rest.trim()).to_string())
        .unwrap_or_default()
}

/// Returns the skills an agent declares in its frontmatter.
///
/// Accepts an inline comma list or a block sequence of `- name` lines.
/// Blank lines and `#` comments inside a block are skipped; any other line
/// ends it.
///
/// ```
/// use ckit_discovery::parse_skill_deps;
///
/// let inline = "---\nskills: api-design, testing\n---\n";
/// assert_eq!(parse_skill_deps(inline), vec!["api-design", "testing"]);
///
/// let block = "---\nskills:\n  - api-design\n  # optional\n  - testing\nmodel: opus\n---\n";
/// assert_eq!(parse_skill_deps(block), vec!["api-design", "testing"]);
/// ```
pub fn parse_skill_deps(content: &str) -> Vec<String> {
    let mut skills = Vec::new();
    let mut in_block = false;

    for line in frontmatter_lines(content) {
        if let Some(rest) = line.strip_prefix(SKILLS_KEY) {
            let rest = rest.trim();
            if !rest.is_empty() && rest != "|" {
                skills.extend(
                    rest.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
                in_block = false;
            } else {
                in_block = true;
            }
            continue;
        }

        if !in_block {
            continue;
        }
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix("- ") {
            let item = item.trim();
            if !item.is_empty() {
                skills.push(item.to_string());
            }
        } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
            in_block = false;
        }
    }

    skills
}

/// Reads `path` and extracts its description. Unreadable files yield `""`.
pub fn extract_description(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => parse_description(&content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No description: file unreadable");
            String::new()
        }
    }
}

/// Reads an agent file and extracts its skill dependencies. Unreadable files yield none.
pub fn extract_skill_deps(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => parse_skill_deps(&content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No skill deps: file unreadable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn description_single_quotes_are_stripped() {
        let md = "---\ndescription: 'Plans sprints'\n---\n";
        assert_eq!(parse_description(md), "Plans sprints");
    }

    #[test]
    fn description_mismatched_quotes_are_kept() {
        let md = "---\ndescription: \"Half quoted'\n---\n";
        assert_eq!(parse_description(md), "\"Half quoted'");
    }

    #[test]
    fn description_after_frontmatter_is_ignored() {
        let md = "---\nname: x\n---\ndescription: in the body\n";
        assert_eq!(parse_description(md), "");
    }

    #[test]
    fn description_first_match_wins() {
        let md = "---\ndescription: first\ndescription: second\n---\n";
        assert_eq!(parse_description(md), "first");
    }

    #[test]
    fn description_requires_key_at_line_start() {
        let md = "---\n  description: indented\n---\n";
        assert_eq!(parse_description(md), "");
    }

    #[test]
    fn delimiter_with_surrounding_whitespace_counts() {
        let md = "  ---  \ndescription: spaced\n---\n";
        assert_eq!(parse_description(md), "spaced");
    }

    #[test]
    fn skills_inline_drops_empty_entries() {
        let md = "---\nskills: a, , b,\n---\n";
        assert_eq!(parse_skill_deps(md), vec!["a", "b"]);
    }

    #[test]
    fn skills_pipe_marker_starts_block() {
        let md = "---\nskills: |\n  - a\n  - b\n---\n";
        assert_eq!(parse_skill_deps(md), vec!["a", "b"]);
    }

    #[test]
    fn skills_block_ends_at_next_key() {
        let md = "---\nskills:\n  - a\ntools: Read\n  - not-a-skill\n---\n";
        assert_eq!(parse_skill_deps(md), vec!["a"]);
    }

    #[test]
    fn skills_block_ends_at_frontmatter_close() {
        let md = "---\nskills:\n  - a\n---\n- b\n";
        assert_eq!(parse_skill_deps(md), vec!["a"]);
    }

    #[test]
    fn skills_nested_names_are_preserved() {
        let md = "---\nskills:\n  - security/pentest-web\n---\n";
        assert_eq!(parse_skill_deps(md), vec!["security/pentest-web"]);
    }

    #[test]
    fn no_frontmatter_means_no_skills() {
        assert!(parse_skill_deps("skills: a, b\n").is_empty());
    }

    #[test]
    fn missing_file_yields_empty_values() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("absent.md");
        assert_eq!(extract_description(&path), "");
        assert!(extract_skill_deps(&path).is_empty());
    }

    #[test]
    fn extract_reads_from_disk() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("backend.md");
        fs::write(
            &path,
            "---\ndescription: Backend engineer\nskills:\n  - api-design\n---\nBody\n",
        )
        .unwrap();
        assert_eq!(extract_description(&path), "Backend engineer");
        assert_eq!(extract_skill_deps(&path), vec!["api-design"]);
    }

    proptest! {
        #[test]
        fn parsers_never_panic(input in "\\PC*") {
            let _ = parse_description(&input);
            let _ = parse_skill_deps(&input);
        }

        #[test]
        fn quoted_descriptions_round_trip(desc in "[A-Za-z0-9 ,.]{0,40}") {
            let md = format!("---\ndescription: \"{desc}\"\n---\n");
            prop_assert_eq!(parse_description(&md), desc);
        }
    }
}
