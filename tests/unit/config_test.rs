//! Unit tests for settings loading

use image_relay::config::Settings;
use std::fs;
use tempfile::TempDir;

fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_defaults_without_file_or_env() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_with_env(dir.path().join("missing.toml"), vars(&[])).unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(
        settings.cors.allowed_origins,
        vec!["https://ttimage.vercel.app", "http://localhost:3000"]
    );
    assert_eq!(settings.providers.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(
        settings.providers.stable_diffusion.endpoint,
        "https://stablediffusionapi.com/api/v4/dreambooth"
    );
    assert!(settings.providers.openai.api_key.is_empty());
    assert!(settings.providers.stable_diffusion.lenient_envelope);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_plain_env_variables() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_with_env(
        dir.path().join("missing.toml"),
        vars(&[
            ("PORT", "9000"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("STABLEDIFFUSION_API_KEY", "sd-secret"),
        ]),
    )
    .unwrap();

    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.providers.openai.api_key, "sk-openai");
    assert_eq!(settings.providers.stable_diffusion.api_key, "sd-secret");
}

#[test]
fn test_empty_port_keeps_default() {
    let dir = TempDir::new().unwrap();
    let settings =
        Settings::load_with_env(dir.path().join("missing.toml"), vars(&[("PORT", "")])).unwrap();

    assert_eq!(settings.server.port, 8080);
}

#[test]
fn test_file_source_and_override_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("relay.toml");
    fs::write(
        &path,
        r#"
[server]
host = "127.0.0.1"
port = 9100

[providers.stable_diffusion]
api_key = "from-file"
lenient_envelope = false
"#,
    )
    .unwrap();

    let settings = Settings::load_with_env(
        &path,
        vars(&[("PORT", "9200"), ("STABLEDIFFUSION_API_KEY", "from-env")]),
    )
    .unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9200);
    assert_eq!(settings.providers.stable_diffusion.api_key, "from-env");
    assert!(!settings.providers.stable_diffusion.lenient_envelope);
    assert_eq!(settings.bind_address(), "127.0.0.1:9200");
}

#[test]
fn test_prefixed_env_variables() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_with_env(
        dir.path().join("missing.toml"),
        vars(&[
            ("IMAGE_RELAY__PROVIDERS__OPENAI__BASE_URL", "http://127.0.0.1:4010/v1"),
            (
                "IMAGE_RELAY__CORS__ALLOWED_ORIGINS",
                "https://a.example,https://b.example",
            ),
        ]),
    )
    .unwrap();

    assert_eq!(settings.providers.openai.base_url, "http://127.0.0.1:4010/v1");
    assert_eq!(
        settings.cors.allowed_origins,
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
fn test_validate_rejects_bad_endpoint() {
    let mut settings = Settings::default();
    settings.providers.stable_diffusion.endpoint = "not a url".to_string();

    assert!(settings.validate().is_err());
}
