use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();

    assert_eq!(cfg.api_base_url.as_str(), DEFAULT_API_BASE_URL);
    assert_eq!(cfg.state_file, PathBuf::from(DEFAULT_STATE_FILE));
    assert_eq!(cfg.poll_interval, Duration::from_secs(30));
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn overrides_are_parsed() {
    let cfg = ClientConfig::from_lookup(lookup(&[
        ("REGISTRY_API_BASE_URL", "https://registry.example.test/api"),
        ("REGISTRY_STATE_FILE", "/tmp/registry.json"),
        ("REGISTRY_POLL_INTERVAL_SECS", "5"),
        ("REGISTRY_REQUEST_TIMEOUT_SECS", "42"),
        ("REGISTRY_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();

    assert_eq!(cfg.api_base_url.as_str(), "https://registry.example.test/api/");
    assert_eq!(cfg.state_file, PathBuf::from("/tmp/registry.json"));
    assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn unparseable_numbers_fall_back_to_defaults() {
    let cfg = ClientConfig::from_lookup(lookup(&[("REGISTRY_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn zero_poll_interval_is_rejected() {
    let err = ClientConfig::from_lookup(lookup(&[("REGISTRY_POLL_INTERVAL_SECS", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroDuration { key: "REGISTRY_POLL_INTERVAL_SECS" });
}

#[test]
fn zero_timeouts_are_rejected() {
    let err = ClientConfig::from_lookup(lookup(&[("REGISTRY_REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroDuration { key: "REGISTRY_REQUEST_TIMEOUT_SECS" });

    let err = ClientConfig::from_lookup(lookup(&[("REGISTRY_CONNECT_TIMEOUT_SECS", " 0 ")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroDuration { key: "REGISTRY_CONNECT_TIMEOUT_SECS" });
}

#[test]
fn relative_base_url_is_rejected() {
    let err = ClientConfig::from_lookup(lookup(&[("REGISTRY_API_BASE_URL", "api/")])).unwrap_err();
    assert!(matches!(err, ConfigError::BaseUrl { .. }));
}

#[test]
fn base_url_joins_relative_paths_beneath_api_root() {
    let url = parse_base_url("http://localhost:8000/api///").unwrap();
    assert_eq!(url.join("applications/42/").unwrap().as_str(), "http://localhost:8000/api/applications/42/");
}
