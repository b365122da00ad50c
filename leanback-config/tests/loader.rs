use std::collections::HashMap;
use std::io::Write;

use leanback_config::loader::apply_overrides;
use leanback_config::{ConfigLoadError, ConfigLoader, PlaybackConfig};
use leanback_model::{BufferTarget, RepeatPolicy};

#[test]
fn empty_document_yields_defaults() {
    let config = ConfigLoader::from_toml_str("").expect("empty toml parses");
    assert_eq!(config, PlaybackConfig::default());
    assert_eq!(config.pagination.min_visible_items, 13);
    assert_eq!(config.state.music_max_length_ms, 360_000);
    assert_eq!(config.loader.buffering_watchdog_ms, 20_000);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let raw = r#"
        [loader]
        hls_forced = true
        repeat_policy = "reverse_list"

        [tweaks]
        buffer_target = "medium"
    "#;
    let config = ConfigLoader::from_toml_str(raw).expect("valid toml");

    assert!(config.loader.hls_forced);
    assert_eq!(config.loader.repeat_policy, RepeatPolicy::ReverseList);
    assert_eq!(config.loader.restart_cooldown_ms, 3_000);
    assert_eq!(config.tweaks.buffer_target, BufferTarget::Medium);
    assert!(config.tweaks.buffering_feature_enabled);
}

#[test]
fn load_reads_file_from_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[state]\nremember_short_items = true").expect("write");

    let config = ConfigLoader::from_path(file.path()).expect("load from path");
    assert!(config.state.remember_short_items);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = ConfigLoader::from_toml_str("[loader\nhls_forced = ")
        .expect_err("malformed toml");
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}

#[test]
fn env_overrides_apply_on_top_of_file() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("LEANBACK_LOOP_SHORTS", "yes"),
        ("LEANBACK_REPEAT_POLICY", "close"),
    ]);
    let mut config = PlaybackConfig::default();
    apply_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()))
        .expect("valid overrides");

    assert!(config.loader.loop_shorts);
    assert_eq!(config.loader.repeat_policy, RepeatPolicy::Close);
}

#[test]
fn invalid_override_is_reported() {
    let mut config = PlaybackConfig::default();
    let err = apply_overrides(&mut config, |key| {
        (key == "LEANBACK_HLS_FORCED").then(|| "sometimes".to_string())
    })
    .expect_err("invalid flag");
    assert!(matches!(
        err,
        ConfigLoadError::InvalidValue {
            key: "LEANBACK_HLS_FORCED",
            ..
        }
    ));
}
