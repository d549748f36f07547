use crate::commands::Session;
use crate::prompt::Prompter;
use anyhow::{Context, Result};
use ckit_state::{patch_teammate_mode, read_teammate_mode, TeammateMode};
use std::io::Write;

/// Labels for the mode picker, in [`TeammateMode::ALL`] order.
pub(crate) fn mode_options() -> Vec<String> {
    TeammateMode::ALL
        .iter()
        .map(|m| format!("{m} -- {}", m.summary()))
        .collect()
}

/// Handle the `teammate-mode` command.
pub(crate) fn handle_teammate_mode_command(
    session: &Session,
    mode: Option<TeammateMode>,
    prompter: &dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let theme = &session.theme;
    let target = session.kit.target();
    let current = read_teammate_mode(target).context("reading teammate mode")?;

    writeln!(out, "{}", theme.banner())?;
    writeln!(out, "  {} Current teammate mode: {current}", theme.bullet)?;
    writeln!(out)?;

    let wanted = match mode {
        Some(mode) => mode,
        None => {
            let start = TeammateMode::ALL
                .iter()
                .position(|m| *m == current)
                .unwrap_or_default();
            let idx = prompter.select("Teammate display mode", &mode_options(), start)?;
            TeammateMode::ALL.get(idx).copied().unwrap_or(current)
        }
    };

    if wanted == current {
        writeln!(out, "  No change.")?;
        return Ok(());
    }
    patch_teammate_mode(target, wanted).context("updating teammate mode")?;
    writeln!(out, "  {} Teammate mode set to {wanted}", theme.arrow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output, session};
    use crate::prompt::MockPrompter;
    use ckit_test_utils::CatalogFixture;

    fn fixture(settings: &str) -> CatalogFixture {
        let fx = CatalogFixture::new().unwrap();
        fx.write_target("settings.json", settings).unwrap();
        fx
    }

    #[test]
    fn argument_sets_mode_and_keeps_other_keys() {
        let fx = fixture("{\"teammateMode\": \"auto\", \"model\": \"opus\"}\n");
        let mut buf = Vec::new();
        handle_teammate_mode_command(
            &session(&fx),
            Some(TeammateMode::Tmux),
            &MockPrompter::new(),
            &mut buf,
        )
        .unwrap();

        assert!(output(buf).contains("Teammate mode set to tmux"));
        let json: serde_json::Value =
            serde_json::from_str(&fx.read_target("settings.json").unwrap()).unwrap();
        assert_eq!(json["teammateMode"], "tmux");
        assert_eq!(json["model"], "opus");
    }

    #[test]
    fn picker_starts_at_current_mode() {
        let fx = fixture("{\"teammateMode\": \"in-process\"}\n");
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select()
            .withf(|_, options, start| options.len() == 3 && *start == 1)
            .returning(|_, _, start| Ok(start));

        let mut buf = Vec::new();
        handle_teammate_mode_command(&session(&fx), None, &prompter, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.contains("Current teammate mode: in-process"));
        assert!(text.contains("No change."));
    }

    #[test]
    fn missing_settings_is_an_error() {
        let fx = CatalogFixture::new().unwrap();
        let mut buf = Vec::new();
        let err = handle_teammate_mode_command(
            &session(&fx),
            Some(TeammateMode::Auto),
            &MockPrompter::new(),
            &mut buf,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("settings file not found"));
    }

    #[test]
    fn options_describe_each_mode() {
        let options = mode_options();
        assert_eq!(options[0], "auto -- split panes in tmux, otherwise in-process");
        assert!(options[2].starts_with("tmux -- "));
    }
}
