use super::*;

#[test]
fn merge_collapses_duplicates_and_keeps_first_order() {
    let mut a = Assets::new().with_js("a.js").with_css("a.css");
    let b = Assets::new().with_js("b.js").with_js("a.js").with_css("a.css");
    a.merge(&b);
    assert_eq!(a.js.iter().collect::<Vec<_>>(), vec!["a.js", "b.js"]);
    assert_eq!(a.css.len(), 1);
}

#[test]
fn empty_by_default() {
    assert!(Assets::default().is_empty());
    assert!(!Assets::new().with_css("x.css").is_empty());
}

#[test]
fn absolute_path_prefixes_relative_paths() {
    assert_eq!(absolute_path("/static/", "panelviews/js/test.js"), "/static/panelviews/js/test.js");
    assert_eq!(absolute_path("/static", "x.css"), "/static/x.css");
}

#[test]
fn absolute_path_keeps_absolute_paths_and_urls() {
    assert_eq!(absolute_path("/static/", "/vendor/x.js"), "/vendor/x.js");
    assert_eq!(absolute_path("/static/", "https://cdn.test/x.js"), "https://cdn.test/x.js");
}

#[test]
fn tags_render_with_static_prefix() {
    let assets = Assets::new().with_css("test.css").with_js("test.js");
    assert_eq!(
        assets.css_tags("/static/"),
        r#"<link href="/static/test.css" type="text/css" media="all" rel="stylesheet">"#
    );
    assert_eq!(assets.js_tags("/static/"), r#"<script src="/static/test.js"></script>"#);
}

#[test]
fn context_exposes_paths_and_tags() {
    let ctx = Assets::new().with_js("test.js").to_context("/static/");
    assert_eq!(ctx["js"][0], "test.js");
    assert_eq!(ctx["tags"], r#"<script src="/static/test.js"></script>"#);
    assert_eq!(ctx["css_tags"], "");
}

#[test]
fn deserializes_from_yaml() {
    let assets: Assets = serde_yaml::from_str("js: [a.js, a.js]\ncss: [b.css]\n").unwrap();
    assert_eq!(assets.js.len(), 1);
    assert!(assets.css.contains("b.css"));
}

#[test]
fn rejects_unknown_yaml_keys() {
    assert!(serde_yaml::from_str::<Assets>("scripts: [a.js]\n").is_err());
}
