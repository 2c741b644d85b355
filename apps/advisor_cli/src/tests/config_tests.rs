use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_hosted_backend() {
    let settings = Settings::default();
    assert_eq!(settings.base_url, "https://samadhan-backend.onrender.com");
    assert_eq!(settings.typing_delay, Duration::from_millis(20));
    assert_eq!(settings.request_timeout, None);
    assert_eq!(settings.file_banner, Duration::from_secs(3));
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_then_env_then_cli() {
    let mut settings = Settings::default();
    settings
        .apply_file(
            r#"
base_url = "http://file.example"
typing_delay_ms = 0
request_timeout_secs = 30
"#,
        )
        .expect("file");
    assert_eq!(settings.base_url, "http://file.example");
    assert_eq!(settings.typing_delay, Duration::ZERO);
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));

    settings.apply_env(env(&[
        ("FINWISE_BASE_URL", "http://short.example"),
        ("APP__BASE_URL", "http://env.example"),
        ("APP__REQUEST_TIMEOUT_SECS", "0"),
    ]));
    assert_eq!(settings.base_url, "http://env.example");
    assert_eq!(settings.request_timeout, None);
    assert_eq!(settings.typing_delay, Duration::ZERO);

    settings.apply_cli(Some("http://127.0.0.1:9000"));
    assert_eq!(settings.base_url, "http://127.0.0.1:9000");

    settings.apply_cli(None);
    assert_eq!(settings.base_url, "http://127.0.0.1:9000");
}

#[test]
fn unparseable_env_numbers_are_ignored() {
    let mut settings = Settings::default();
    settings.apply_env(env(&[("APP__TYPING_DELAY_MS", "fast")]));
    assert_eq!(settings.typing_delay, DEFAULT_TYPING_DELAY);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(settings.apply_file("bind_addr = \"0.0.0.0\"").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn non_http_base_url_fails_validation() {
    let mut settings = Settings::default();
    settings.apply_cli(Some("ftp://files.example"));
    assert!(settings.validate().is_err());
}

#[test]
fn explicit_config_path_must_exist() {
    let missing = std::env::temp_dir().join("finwise-no-such-config.toml");
    let err = load_settings(Some(&missing), None).expect_err("missing file");
    assert!(err.to_string().contains("finwise-no-such-config.toml"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("finwise-config-{}.toml", std::process::id()));
    fs::write(&path, "file_banner_secs = 5\n").expect("write config");

    let settings = load_settings(Some(&path), Some("http://127.0.0.1:1")).expect("settings");
    assert_eq!(settings.file_banner, Duration::from_secs(5));
    assert_eq!(settings.base_url, "http://127.0.0.1:1");

    let _ = fs::remove_file(&path);
}
