use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "HARMWATCH_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8765");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.store_path.to_str(), Some("./harmwatch-store.json"));
    assert_eq!(cfg.collector_url, "http://localhost:8000/api/feedback");
    assert_eq!(cfg.source_tag, "extension_v1");
    assert_eq!(cfg.dispatch_interval_secs, 30);
    assert_eq!(cfg.batch_size, 50);
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.extract_timeout_secs, 8);
    assert!(cfg.max_queue_len.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_ENV", "production");
    map.insert("HARMWATCH_COLLECTOR_URL", "https://collect.example.org/api/feedback");
    map.insert("HARMWATCH_SOURCE_TAG", "agent_v2");
    map.insert("HARMWATCH_BATCH_SIZE", "10");
    map.insert("HARMWATCH_MAX_QUEUE_LEN", "5000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.collector_url, "https://collect.example.org/api/feedback");
    assert_eq!(cfg.source_tag, "agent_v2");
    assert_eq!(cfg.batch_size, 10);
    assert_eq!(cfg.max_queue_len, Some(5000));
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARMWATCH_BIND_ADDR"),
        "expected InvalidEnvVar(HARMWATCH_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_batch_size() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARMWATCH_BATCH_SIZE"),
        "expected InvalidEnvVar(HARMWATCH_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_dispatch_interval() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_DISPATCH_INTERVAL_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARMWATCH_DISPATCH_INTERVAL_SECS"),
        "expected InvalidEnvVar(HARMWATCH_DISPATCH_INTERVAL_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_http_collector_url() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_COLLECTOR_URL", "ftp://collect.example.org");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARMWATCH_COLLECTOR_URL"),
        "expected InvalidEnvVar(HARMWATCH_COLLECTOR_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("HARMWATCH_EXTRACT_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "HARMWATCH_EXTRACT_TIMEOUT_SECS"),
        "expected InvalidEnvVar(HARMWATCH_EXTRACT_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeouts() {
    for var in [
        "HARMWATCH_REQUEST_TIMEOUT_SECS",
        "HARMWATCH_EXTRACT_TIMEOUT_SECS",
    ] {
        let mut map = HashMap::new();
        map.insert(var, "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { var: ref got, .. }) if got == var),
            "expected InvalidEnvVar({var}), got: {result:?}"
        );
    }
}
