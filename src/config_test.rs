use super::*;

// =============================================================================
// env helpers (unique env var names, tests run in parallel)
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u16 = env_parse("__TEST_PV_EP_MISSING_5521__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_PV_EP_VALID__", " 8080 ") };
    let val: u16 = env_parse("__TEST_PV_EP_VALID__", 0);
    assert_eq!(val, 8080);
    unsafe { std::env::remove_var("__TEST_PV_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_PV_EP_INVALID__", "port") };
    let val: u16 = env_parse("__TEST_PV_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_PV_EP_INVALID__") };
}

#[test]
fn env_bool_variants() {
    for (i, (val, expected)) in [("1", Some(true)), ("On", Some(true)), ("no", Some(false)), ("maybe", None)]
        .iter()
        .enumerate()
    {
        let key = format!("__TEST_PV_EB_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), *expected, "value {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
    assert_eq!(env_bool("__TEST_PV_EB_UNSET_9931__"), None);
}

#[test]
fn url_prefix_gains_trailing_slash() {
    unsafe { std::env::set_var("__TEST_PV_URL_A__", "/assets") };
    unsafe { std::env::set_var("__TEST_PV_URL_B__", "https://cdn.example.com/s/") };
    unsafe { std::env::set_var("__TEST_PV_URL_C__", "  ") };
    assert_eq!(env_url_prefix("__TEST_PV_URL_A__").as_deref(), Some("/assets/"));
    assert_eq!(env_url_prefix("__TEST_PV_URL_B__").as_deref(), Some("https://cdn.example.com/s/"));
    assert_eq!(env_url_prefix("__TEST_PV_URL_C__"), None);
    for key in ["__TEST_PV_URL_A__", "__TEST_PV_URL_B__", "__TEST_PV_URL_C__"] {
        unsafe { std::env::remove_var(key) };
    }
}

// =============================================================================
// ServerConfig
// =============================================================================

#[test]
fn defaults_match_constants() {
    let config = ServerConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.pages_file, PathBuf::from(DEFAULT_PAGES_FILE));
    assert_eq!(config.template_dir, PathBuf::from(DEFAULT_TEMPLATE_DIR));
    assert_eq!(config.static_url, DEFAULT_STATIC_URL);
    assert_eq!(config.media_url, DEFAULT_MEDIA_URL);
    assert!(config.accept_hx);
}

#[test]
fn static_mount_strips_trailing_slash() {
    let mut config = ServerConfig::default();
    assert_eq!(config.static_mount(), "/static");
    config.static_url = "/".into();
    assert_eq!(config.static_mount(), "/");
}
