use std::fs;
use std::path::PathBuf;

use authgate::controller::ControllerRegistry;
use authgate::permission::PermissionTable;
use authgate::whitelist::Whitelist;
use authgate::{Gate, HttpVerb, Request};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("authgate_tests");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn build_gate(whitelist: Whitelist) -> Gate {
    let controllers = ControllerRegistry::new()
        .with("articles", ["getArticle", "getArticles", "putArticle"])
        .with("tags", ["getTags"]);
    let permissions = PermissionTable::new()
        .with("articles", "getArticle", 1)
        .with("articles", "getArticles", 1)
        .with("articles", "putArticle", 2)
        .with("tags", "getTags", 0);

    Gate::builder()
        .controllers(controllers)
        .permissions(permissions)
        .whitelist(whitelist)
        .build()
        .unwrap()
}

#[test]
fn test_whitelist_file() {
    let path = temp_file(
        "whitelist_file.json",
        r#"[
            {"controller": "tags"},
            {"controller": "articles", "methods": ["getArticles"]}
        ]"#,
    );
    let gate = build_gate(Whitelist::load(&path).unwrap());

    let outcome = gate.activate(&Request::new(HttpVerb::Get, "/tags"));
    assert!(outcome.is_pass());

    let outcome = gate.activate(&Request::new(HttpVerb::Get, "/articles"));
    assert!(outcome.is_pass());
    assert_eq!(outcome.route.method, "getArticles");

    let outcome = gate.activate(&Request::new(HttpVerb::Get, "/articles/3"));
    assert_eq!(outcome.response.status(), Some(401));
}

#[test]
fn test_reload_whitelist() {
    let gate = build_gate(Whitelist::default());
    let req = Request::new(HttpVerb::Put, "/articles/3");
    assert_eq!(gate.activate(&req).response.status(), Some(401));

    let path = temp_file(
        "reload_whitelist.json",
        r#"[{"controller": "articles", "methods": ["putArticle"]}]"#,
    );
    gate.reload_whitelist_from(&path).unwrap();
    assert!(gate.activate(&req).is_pass());

    // A broken file keeps the current rules.
    let broken = temp_file("reload_whitelist_broken.json", "[{");
    assert!(gate.reload_whitelist_from(&broken).is_err());
    assert!(gate.activate(&req).is_pass());

    assert!(gate.reload_whitelist_from("/not/exists/whitelist.json").is_err());
}

#[test]
fn test_options_never_authenticates() {
    let gate = build_gate(Whitelist::default());

    let req = Request::new(HttpVerb::Options, "/articles").with_authorization("Nope");
    let outcome = gate.activate(&req);
    assert_eq!(outcome.response.status(), Some(204));
    let pairs: Vec<_> = outcome.response.header_pairs().collect();
    assert_eq!(
        pairs,
        vec![("Allow", "GET"), ("Access-Control-Allow-Methods", "GET")]
    );
}
