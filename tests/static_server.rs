mod common;
use crate::common::{init_tracing, raw_request, with_timeout};

use std::fs;

use buildwatch::config::ServerConfig;
use buildwatch::errors::BuildError;
use buildwatch::server::{self, handler, StaticServer};

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs").join("index.html"), "<h1>docs</h1>").unwrap();
    fs::write(dir.path().join("logo.bin"), [0u8, 159, 146, 150, 255]).unwrap();
    fs::write(dir.path().join("my page.html"), "<h1>spaced</h1>").unwrap();
    fs::write(dir.path().join("café.css"), "p {}").unwrap();
    dir
}

#[tokio::test]
async fn serves_existing_file_with_exact_bytes() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "GET", "/app.js")).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"console.log(1);");
    assert_eq!(
        resp.header("content-type").as_deref(),
        Some("text/javascript; charset=utf-8")
    );
    handle.abort();
}

#[tokio::test]
async fn binary_files_are_served_untouched() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "GET", "/logo.bin")).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, vec![0u8, 159, 146, 150, 255]);
    assert_eq!(
        resp.header("content-type").as_deref(),
        Some("application/octet-stream")
    );
    handle.abort();
}

#[tokio::test]
async fn missing_file_is_404() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "GET", "/nope.css")).await;

    assert_eq!(resp.status, 404);
    handle.abort();
}

#[tokio::test]
async fn directories_serve_their_index() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let root = with_timeout(raw_request(handle.local_addr(), "GET", "/")).await;
    let docs = with_timeout(raw_request(handle.local_addr(), "GET", "/docs/")).await;

    assert_eq!(root.status, 200);
    assert_eq!(root.body, b"<h1>home</h1>");
    assert_eq!(
        root.header("content-type").as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(docs.status, 200);
    assert_eq!(docs.body, b"<h1>docs</h1>");
    handle.abort();
}

#[tokio::test]
async fn query_string_is_ignored() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "GET", "/app.js?v=3")).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"console.log(1);");
    handle.abort();
}

#[tokio::test]
async fn percent_encoded_names_are_decoded() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let spaced = with_timeout(raw_request(handle.local_addr(), "GET", "/my%20page.html")).await;
    let accented = with_timeout(raw_request(handle.local_addr(), "GET", "/caf%C3%A9.css")).await;

    assert_eq!(spaced.status, 200);
    assert_eq!(spaced.body, b"<h1>spaced</h1>");
    assert_eq!(accented.status, 200);
    assert_eq!(accented.body, b"p {}");
    handle.abort();
}

#[tokio::test]
async fn encoded_parent_segments_cannot_leave_the_root() {
    init_tracing();
    let outer = tempfile::tempdir().expect("tempdir");
    let root = outer.path().join("site");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(outer.path().join("secret"), "do not serve").unwrap();
    let handle = server::serve(&root, 0).await.expect("bind");

    for path in ["/%2e%2e/secret", "/%2E%2E/secret", "/..%2Fsecret", "/%2e%2e%2fsecret"] {
        let resp = with_timeout(raw_request(handle.local_addr(), "GET", path)).await;
        assert_eq!(resp.status, 404, "{path}");
        assert!(!resp.body.ends_with(b"do not serve"), "{path}");
    }
    handle.abort();
}

#[tokio::test]
async fn head_returns_headers_only() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "HEAD", "/app.js")).await;

    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    assert_eq!(resp.header("content-length").as_deref(), Some("15"));
    handle.abort();
}

#[tokio::test]
async fn other_methods_are_rejected() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let resp = with_timeout(raw_request(handle.local_addr(), "POST", "/app.js")).await;

    assert_eq!(resp.status, 405);
    assert_eq!(resp.header("allow").as_deref(), Some("GET, HEAD"));
    handle.abort();
}

#[tokio::test]
async fn changes_on_disk_are_visible_on_next_request() {
    init_tracing();
    let dir = site();
    let handle = server::serve(dir.path(), 0).await.expect("bind");

    let before = with_timeout(raw_request(handle.local_addr(), "GET", "/app.js")).await;
    fs::write(dir.path().join("app.js"), "console.log(2);").unwrap();
    let after = with_timeout(raw_request(handle.local_addr(), "GET", "/app.js")).await;

    assert_eq!(before.body, b"console.log(1);");
    assert_eq!(after.body, b"console.log(2);");
    handle.abort();
}

#[tokio::test]
async fn busy_port_is_port_unavailable() {
    init_tracing();
    let dir = site();
    let first = server::serve(dir.path(), 0).await.expect("bind");
    let taken = first.local_addr().port();

    let err = StaticServer::bind(&ServerConfig::new(dir.path(), taken))
        .await
        .unwrap_err();

    match err {
        BuildError::PortUnavailable { addr, .. } => assert_eq!(addr.port(), taken),
        other => panic!("expected PortUnavailable, got {other:?}"),
    }
    first.abort();
}

#[test]
fn parent_components_never_resolve() {
    let root = std::path::Path::new("/srv/site");

    assert_eq!(handler::resolve_path(root, "/../etc/passwd"), None);
    assert_eq!(handler::resolve_path(root, "/css/../../secret"), None);
    assert_eq!(
        handler::resolve_path(root, "/css/./site.css"),
        Some(root.join("css").join("site.css"))
    );
    assert_eq!(handler::resolve_path(root, "/"), Some(root.to_path_buf()));
}

#[test]
fn segments_are_decoded_before_resolving() {
    let root = std::path::Path::new("/srv/site");

    assert_eq!(
        handler::resolve_path(root, "/docs/my%20page.html"),
        Some(root.join("docs").join("my page.html"))
    );
    assert_eq!(handler::resolve_path(root, "/%2e%2e/secret"), None);
    assert_eq!(handler::resolve_path(root, "/a%2Fb"), None);
    assert_eq!(handler::resolve_path(root, "/%2Fetc/passwd"), None);
    // Invalid UTF-8 after decoding.
    assert_eq!(handler::resolve_path(root, "/%FF.css"), None);
}
