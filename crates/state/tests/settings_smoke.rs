use ckit_state::{patch_teammate_mode, read_teammate_mode, TeammateMode};
use ckit_test_utils::CatalogFixture;

#[test]
fn patch_keeps_nested_keys() {
    let fx = CatalogFixture::new().unwrap();
    fx.write_target(
        "settings.json",
        r#"{"permissions": {"allow": ["Bash(git:*)"]}, "teammateMode": "auto"}"#,
    )
    .unwrap();

    patch_teammate_mode(&fx.target, TeammateMode::Tmux).unwrap();

    let text = fx.read_target("settings.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["permissions"]["allow"][0], "Bash(git:*)");
    assert_eq!(read_teammate_mode(&fx.target).unwrap(), TeammateMode::Tmux);
}
