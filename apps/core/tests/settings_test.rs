use std::time::{SystemTime, UNIX_EPOCH};

use lightdash_core::settings::{self, Settings, DEFAULT_HOTKEY};

fn temp_settings_path(tag: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be valid")
        .as_nanos();
    std::env::temp_dir().join(format!("lightdash-settings-{tag}-{unique}.toml"))
}

#[test]
fn missing_file_loads_defaults_and_marks_first_run() {
    let path = temp_settings_path("missing");

    let loaded = settings::load(&path).unwrap();

    assert!(loaded.first_run);
    assert_eq!(loaded.settings, Settings::default());
    assert_eq!(loaded.settings.hotkey_show_app, DEFAULT_HOTKEY);
    assert!(loaded.settings.show_indicator_icon);
}

#[test]
fn saved_settings_round_trip_and_end_first_run() {
    let path = temp_settings_path("roundtrip");
    let settings = Settings {
        hotkey_show_app: "Alt+F2".to_string(),
        show_indicator_icon: false,
        theme: "light".to_string(),
    };

    settings::save(&settings, &path).unwrap();
    let loaded = settings::load(&path).unwrap();

    assert!(!loaded.first_run);
    assert_eq!(loaded.settings, settings);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn partial_file_fills_in_defaults() {
    let path = temp_settings_path("partial");
    std::fs::write(&path, "show_indicator_icon = false\n").unwrap();

    let loaded = settings::load(&path).unwrap();

    assert!(!loaded.settings.show_indicator_icon);
    assert_eq!(loaded.settings.hotkey_show_app, DEFAULT_HOTKEY);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn malformed_file_is_an_error_but_never_fatal() {
    let path = temp_settings_path("malformed");
    std::fs::write(&path, "hotkey_show_app = [not toml").unwrap();

    assert!(settings::load(&path).is_err());

    let fallback = settings::load_or_default(&path);
    assert!(!fallback.first_run);
    assert_eq!(fallback.settings, Settings::default());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn validate_rejects_unbindable_hotkeys() {
    let mut settings = Settings::default();
    assert!(settings::validate(&settings).is_ok());

    settings.hotkey_show_app = "space".to_string();
    assert!(settings::validate(&settings).is_err());

    settings.hotkey_show_app = "Ctrl+Space".to_string();
    settings.theme = "  ".to_string();
    assert!(settings::validate(&settings).is_err());
}
