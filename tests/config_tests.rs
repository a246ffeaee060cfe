use courseweaver::config::{
    API_KEY_PLACEHOLDER, Config, ConfigError, DEFAULT_GEMINI_MODEL, DEFAULT_PORT, SetupOutcome,
    check_environment, write_env_template,
};
use courseweaver::server::ServeOptions;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults_when_environment_is_empty() {
    let config = config_from(&[]);
    assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database_name, "courseweaver");
    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
}

#[test]
fn test_environment_overrides() {
    let config = config_from(&[
        ("GEMINI_API_KEY", "  abc123  "),
        ("MONGODB_URI", "mongodb://db:27017"),
        ("DATABASE_NAME", "courses_test"),
        ("HOST", "127.0.0.1"),
        ("PORT", "9090"),
        ("DEBUG", "False"),
        ("GEMINI_API_BASE", "http://localhost:1234/v1beta/"),
    ]);

    assert_eq!(config.api_key().expect("key is set"), "abc123");
    assert_eq!(config.mongodb_uri, "mongodb://db:27017");
    assert_eq!(config.database_name, "courses_test");
    assert_eq!(config.bind_address(), "127.0.0.1:9090");
    assert!(!config.debug);
    assert_eq!(config.gemini_api_base, "http://localhost:1234/v1beta");
}

#[test]
fn test_serve_flags_override_bind_address() {
    let mut config = config_from(&[("HOST", "127.0.0.1"), ("PORT", "9090")]);
    ServeOptions {
        host: Some("0.0.0.0".to_string()),
        port: None,
        memory_store: true,
    }
    .apply(&mut config);
    assert_eq!(config.bind_address(), "0.0.0.0:9090");

    ServeOptions {
        port: Some(7001),
        ..ServeOptions::default()
    }
    .apply(&mut config);
    assert_eq!(config.bind_address(), "0.0.0.0:7001");
}

#[test]
fn test_bad_values_fall_back() {
    let config = config_from(&[("PORT", "eighty"), ("DEBUG", "maybe"), ("GEMINI_MODEL", "")]);
    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.debug);
    assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
}

#[test]
fn test_placeholder_key_is_missing() {
    let config = config_from(&[("GEMINI_API_KEY", API_KEY_PLACEHOLDER)]);
    assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
}

#[test]
fn test_setup_writes_template_once() {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let env_path = dir.path().join(".env");

    assert!(matches!(
        check_environment(&env_path, &config_from(&[])),
        Err(ConfigError::MissingEnvFile(_))
    ));

    assert_eq!(
        write_env_template(&env_path).expect("write template"),
        SetupOutcome::Created
    );
    let contents = fs::read_to_string(&env_path).expect("read template");
    assert!(contents.contains(&format!("GEMINI_API_KEY={API_KEY_PLACEHOLDER}")));
    assert!(contents.contains("PORT=8000"));

    fs::write(&env_path, "GEMINI_API_KEY=real-key\n").expect("edit template");
    assert_eq!(
        write_env_template(&env_path).expect("second call"),
        SetupOutcome::AlreadyExists
    );
    assert_eq!(
        fs::read_to_string(&env_path).expect("read back"),
        "GEMINI_API_KEY=real-key\n"
    );
}

#[test]
fn test_check_environment_requires_usable_key() {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let env_path = dir.path().join(".env");
    write_env_template(&env_path).expect("write template");

    let placeholder = config_from(&[("GEMINI_API_KEY", API_KEY_PLACEHOLDER)]);
    assert!(matches!(
        check_environment(&env_path, &placeholder),
        Err(ConfigError::MissingApiKey)
    ));

    let ready = config_from(&[("GEMINI_API_KEY", "real-key")]);
    assert!(check_environment(&env_path, &ready).is_ok());
}
