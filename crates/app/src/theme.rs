//! Text presentation shared by every command.

/// Banner, headings, and status symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Success marker.
    pub check: &'static str,
    /// Notice marker.
    pub bullet: &'static str,
    /// Summary marker.
    pub arrow: &'static str,
    /// Marker for items left as they were.
    pub dot: &'static str,
    /// Section heading marker.
    pub heading: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            check: "✓",
            bullet: "●",
            arrow: "→",
            dot: "·",
            heading: "▸",
        }
    }
}

impl Theme {
    /// ASCII-only symbols, for terminals that cannot render the defaults.
    pub fn ascii() -> Self {
        Self {
            check: "+",
            bullet: "*",
            arrow: "->",
            dot: "-",
            heading: ">",
        }
    }

    /// Picks [`Theme::ascii`] when `CK_ASCII` is set.
    pub fn from_env() -> Self {
        if std::env::var_os("CK_ASCII").is_some() {
            Self::ascii()
        } else {
            Self::default()
        }
    }

    /// Two-line banner printed at the top of most commands.
    pub fn banner(&self) -> String {
        "\n  Claude Kit\n  Claude Code Project Templates\n".to_string()
    }

    /// Section heading with a blank line before it.
    pub fn section(&self, title: &str) -> String {
        format!("\n{} {title}", self.heading)
    }

    /// `name -- description` label for selection lists.
    pub fn option_label(&self, name: &str, description: &str) -> String {
        if description.is_empty() {
            name.to_string()
        } else {
            format!("{name} -- {}", truncate(description, 50))
        }
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn long_text_ends_with_ellipsis_at_max_len() {
        let out = truncate(&"x".repeat(80), 55);
        assert_eq!(out.chars().count(), 55);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let out = truncate("ééééééé", 5);
        assert_eq!(out, "éé...");
    }

    #[test]
    fn option_label_omits_empty_description() {
        let theme = Theme::default();
        assert_eq!(theme.option_label("backend", ""), "backend");
        assert_eq!(theme.option_label("backend", "APIs"), "backend -- APIs");
    }

    #[test]
    fn section_uses_heading_marker() {
        assert_eq!(Theme::ascii().section("Rules"), "\n> Rules");
        assert_eq!(Theme::default().section("Rules"), "\n▸ Rules");
    }
}
