//! Config load/save and accessor tests

use presage_config::{Config, ProviderConfig};

#[test]
fn defaults_are_sensible() {
    let config = Config::default();

    assert_eq!(config.assistant.model, "gpt-4o-mini");
    assert_eq!(config.assistant.max_steps, 8);
    assert_eq!(config.assistant.history_max_messages, 20);
    assert!(!config.assistant.require_version);
    assert_eq!(config.assistant.reply_language, "");
    assert_eq!(config.assistant.reply_max_words, 0);
    assert_eq!(config.docs.site_base, "https://docs.fortinet.com");
    assert_eq!(config.portal.search_limit, 3);
    assert!(!config.has_api_key());
}

#[test]
fn latest_firmware_lookup_is_case_insensitive() {
    let config = Config::default();
    assert_eq!(config.latest_firmware("FortiGate"), Some("7.2.4".to_string()));
    assert_eq!(config.latest_firmware("fortigate"), Some("7.2.4".to_string()));
    assert_eq!(config.latest_firmware("FortiSwitch"), None);
}

#[test]
fn api_key_prefers_openai_over_openrouter() {
    let mut config = Config::default();
    config.providers.openrouter = ProviderConfig {
        api_key: "sk-or-123".to_string(),
        api_base: None,
    };
    assert_eq!(config.api_key(), Some("sk-or-123".to_string()));
    assert_eq!(
        config.api_base(),
        Some("https://openrouter.ai/api/v1".to_string())
    );

    config.providers.openai = ProviderConfig {
        api_key: "sk-123".to_string(),
        api_base: None,
    };
    assert_eq!(config.api_key(), Some("sk-123".to_string()));
    assert_eq!(config.api_base(), None);
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");

    let mut config = Config::default();
    config.assistant.require_version = true;
    config.assistant.max_steps = 5;
    config.providers.openai.api_key = "sk-test".to_string();
    config
        .docs
        .latest_firmware
        .insert("fortiweb".to_string(), "7.0.1".to_string());
    config.save_to(&path).await.unwrap();

    let loaded = Config::load_from(&path).await.unwrap();
    assert!(loaded.assistant.require_version);
    assert_eq!(loaded.assistant.max_steps, 5);
    assert_eq!(loaded.api_key(), Some("sk-test".to_string()));
    assert_eq!(loaded.latest_firmware("FortiWeb"), Some("7.0.1".to_string()));
}

#[tokio::test]
async fn missing_file_loads_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::load_from(&tmp.path().join("nope.json")).await.unwrap();
    assert!(!config.has_api_key());
}

#[tokio::test]
async fn partial_file_fills_in_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    tokio::fs::write(&path, r#"{ "assistant": { "max_steps": 3 } }"#)
        .await
        .unwrap();

    let config = Config::load_from(&path).await.unwrap();
    assert_eq!(config.assistant.max_steps, 3);
    assert_eq!(config.assistant.model, "gpt-4o-mini");
    assert_eq!(config.portal.base_url, "https://app.rfpio.com");
}

#[tokio::test]
async fn invalid_json_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    tokio::fs::write(&path, "not json").await.unwrap();

    assert!(Config::load_from(&path).await.is_err());
}
