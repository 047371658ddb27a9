use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildwatch::config::PathConfig;
use buildwatch::dag::TaskAction;
use buildwatch::exec::{copy_matching, CopyAssets};
use buildwatch::fs::mock::MockFileSystem;
use buildwatch::fs::FileSystem;
use buildwatch::watch::{build_globset, collect_matching_files};

fn patterns(p: &[&str]) -> Vec<String> {
    p.iter().map(|s| s.to_string()).collect()
}

fn sample_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("src/index.html", "<html></html>");
    fs.add_file("src/style.css", "body {}");
    fs.add_file("src/Main.elm", "module Main exposing (main)");
    fs.add_file("src/vendor/reset.css", "* {}");
    fs.add_file("README.md", "# readme");
    fs
}

#[test]
fn collect_matches_relative_to_the_root() {
    let fs = sample_fs();
    let set = build_globset(&patterns(&["*.{html,css}"])).unwrap();

    let files = collect_matching_files(&fs, Path::new("src"), &set).unwrap();

    assert_eq!(
        files,
        vec![
            PathBuf::from("src/index.html"),
            PathBuf::from("src/style.css"),
        ]
    );
}

#[test]
fn double_star_recurses() {
    let fs = sample_fs();
    let set = build_globset(&patterns(&["**/*.css"])).unwrap();

    let files = collect_matching_files(&fs, Path::new("src"), &set).unwrap();

    assert_eq!(
        files,
        vec![
            PathBuf::from("src/style.css"),
            PathBuf::from("src/vendor/reset.css"),
        ]
    );
}

#[test]
fn missing_root_matches_nothing() {
    let fs = sample_fs();
    let set = build_globset(&patterns(&["*.css"])).unwrap();

    let files = collect_matching_files(&fs, Path::new("nowhere"), &set).unwrap();

    assert!(files.is_empty());
}

#[test]
fn copy_preserves_bytes_and_relative_layout() {
    let fs = sample_fs();
    let set = build_globset(&patterns(&["**/*.css"])).unwrap();

    let copied = copy_matching(&fs, Path::new("src"), Path::new("dist"), &set).unwrap();

    assert_eq!(
        copied,
        vec![
            PathBuf::from("dist/style.css"),
            PathBuf::from("dist/vendor/reset.css"),
        ]
    );
    assert_eq!(fs.read(Path::new("dist/style.css")).unwrap(), b"body {}");
    assert_eq!(fs.read(Path::new("dist/vendor/reset.css")).unwrap(), b"* {}");
    // Sources stay where they are.
    assert!(fs.is_file(Path::new("src/style.css")));
}

#[test]
fn copy_overwrites_stale_outputs() {
    let fs = sample_fs();
    fs.add_file("dist/style.css", "stale");
    let set = build_globset(&patterns(&["*.css"])).unwrap();

    copy_matching(&fs, Path::new("src"), Path::new("dist"), &set).unwrap();

    assert_eq!(fs.read(Path::new("dist/style.css")).unwrap(), b"body {}");
}

#[tokio::test]
async fn copy_assets_action_uses_configured_patterns() {
    let fs = sample_fs();
    let paths = PathConfig::default();
    let action = CopyAssets::new(Arc::new(fs.clone()), &paths).unwrap();

    action.invoke().await.expect("copy succeeds");

    let outputs: Vec<PathBuf> = fs
        .file_paths()
        .into_iter()
        .filter(|p| p.starts_with("dist"))
        .collect();
    assert_eq!(
        outputs,
        vec![PathBuf::from("dist/index.html"), PathBuf::from("dist/style.css")]
    );
}
