use super::*;
use axum::http::HeaderValue;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_static(value));
    }
    map
}

#[test]
fn xhr_header_marks_fragment() {
    assert!(is_fragment(&headers(&[("x-requested-with", "XMLHttpRequest")]), false));
    assert!(is_fragment(&headers(&[("x-requested-with", "xmlhttprequest")]), false));
    assert!(!is_fragment(&headers(&[("x-requested-with", "fetch")]), true));
    assert!(!is_fragment(&HeaderMap::new(), true));
}

#[test]
fn hx_request_only_counts_when_enabled() {
    let map = headers(&[("hx-request", "true")]);
    assert!(is_fragment(&map, true));
    assert!(!is_fragment(&map, false));
}

#[test]
fn from_http_decodes_query_and_path() {
    let uri: Uri = "/test/?view=panel%201&x=a+b".parse().unwrap();
    let req = PageRequest::from_http(Method::GET, &uri, HeaderMap::new(), b"", true);
    assert_eq!(req.path, "/test/");
    assert_eq!(req.query_param("view"), Some("panel 1"));
    assert_eq!(req.query_param("x"), Some("a b"));
    assert!(!req.fragment);
    assert!(req.form.is_empty());
}

#[test]
fn from_http_parses_urlencoded_body() {
    let uri: Uri = "/test/?view=panel3".parse().unwrap();
    let map = headers(&[
        ("content-type", "application/x-www-form-urlencoded"),
        ("x-requested-with", "XMLHttpRequest"),
    ]);
    let req = PageRequest::from_http(Method::POST, &uri, map, b"email=a%40b.example", true);
    assert!(req.fragment);
    assert_eq!(req.form.get("email").map(String::as_str), Some("a@b.example"));
}

#[test]
fn from_http_parses_json_body_scalars() {
    let uri: Uri = "/test/".parse().unwrap();
    let map = headers(&[("content-type", "application/json")]);
    let req = PageRequest::from_http(Method::POST, &uri, map, br#"{"email":"x","age":3,"tags":[1]}"#, true);
    assert_eq!(req.form.get("email").map(String::as_str), Some("x"));
    assert_eq!(req.form.get("age").map(String::as_str), Some("3"));
    assert!(!req.form.contains_key("tags"));
}

#[test]
fn malformed_json_body_is_empty_payload() {
    let uri: Uri = "/test/".parse().unwrap();
    let map = headers(&[("content-type", "application/json")]);
    let req = PageRequest::from_http(Method::POST, &uri, map, b"{not json", true);
    assert!(req.form.is_empty());
}

#[test]
fn context_exposes_path_method_and_flag() {
    let ctx = PageRequest::test_get("/p/").with_query("a", "1").as_fragment().to_context();
    assert_eq!(ctx["path"], "/p/");
    assert_eq!(ctx["method"], "GET");
    assert_eq!(ctx["fragment"], true);
    assert_eq!(ctx["query"]["a"], "1");
}
