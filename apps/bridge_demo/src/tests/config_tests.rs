use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn defaults_use_the_library_quiescence_window() {
    let settings = Settings::default();
    assert_eq!(settings.quiescence(), DEFAULT_QUIESCENCE);
    assert_eq!(settings.log_filter, "info");
    assert!(!settings.route_vertex_moves);
}

#[test]
fn file_values_may_be_strings_or_native_toml() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        "quiescence_ms = 25\nlog_filter = \"sync_core=debug\"\nroute_vertex_moves = true\n",
    )
    .expect("valid file");
    assert_eq!(settings.quiescence_ms, 25);
    assert_eq!(settings.log_filter, "sync_core=debug");
    assert!(settings.route_vertex_moves);

    apply_file_overrides(&mut settings, "quiescence_ms = \"40\"\n").expect("string value");
    assert_eq!(settings.quiescence_ms, 40);
}

#[test]
fn malformed_file_value_is_rejected() {
    let mut settings = Settings::default();
    let err = apply_file_overrides(&mut settings, "quiescence_ms = \"soon\"\n")
        .expect_err("non-numeric quiescence");
    assert!(err.to_string().contains("quiescence_ms"));
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let mut settings = Settings::default();
    let env: HashMap<&str, &str> = HashMap::from([
        ("BRIDGE_QUIESCENCE_MS", "15"),
        ("APP__QUIESCENCE_MS", "30"),
        ("APP__LOG_FILTER", "warn"),
        ("APP__ROUTE_VERTEX_MOVES", "on"),
    ]);
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.quiescence_ms, 30);
    assert_eq!(settings.log_filter, "warn");
    assert!(settings.route_vertex_moves);
}

#[test]
fn unparsable_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| match key {
        "APP__QUIESCENCE_MS" => Some("fast".to_string()),
        "APP__ROUTE_VERTEX_MOVES" => Some("maybe".to_string()),
        _ => None,
    });
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("bridge_demo_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("load");
    let mut expected = Settings::default();
    apply_env_overrides(&mut expected, |key| std::env::var(key).ok());
    assert_eq!(settings, expected);
}

#[test]
fn settings_file_is_read_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("bridge_demo_settings_{suffix}.toml"));
    fs::write(&path, "log_filter = \"trace\"\n").expect("write settings");

    let settings = load_settings(&path).expect("load");
    fs::remove_file(&path).expect("cleanup");

    if std::env::var("APP__LOG_FILTER").is_err() {
        assert_eq!(settings.log_filter, "trace");
    }
}
