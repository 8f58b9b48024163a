use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn catalog_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("catalog");
    path
}

fn setup_test_env(backend: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let uploads = root.join("uploads");
    fs::create_dir_all(&uploads).unwrap();
    fs::write(uploads.join("widget.jpg"), b"\xff\xd8\xff widget").unwrap();
    fs::write(uploads.join("lamp.jpg"), b"\xff\xd8\xff lamp").unwrap();

    let config_content = format!(
        r#"[db]
backend = "{}"
path = "{}/data/catalog.db"

[images]
dir = "{}/images"

[server]
bind = "127.0.0.1:0"
"#,
        backend,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("catalog.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_catalog(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = catalog_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("FRONT_URL")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run catalog binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn upload(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("uploads")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn test_init_creates_storage() {
    for backend in ["sqlite", "json"] {
        let (tmp, config_path) = setup_test_env(backend);

        let (stdout, stderr, success) = run_catalog(&config_path, &["init"]);
        assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
        assert!(stdout.contains("initialized"));
        assert!(tmp.path().join("data/catalog.db").exists());
        assert!(tmp.path().join("images").is_dir());
    }
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env("sqlite");

    let (_, _, success1) = run_catalog(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_catalog(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

fn add_list_get_search(backend: &str) {
    let (_tmp, config_path) = setup_test_env(backend);
    run_catalog(&config_path, &["init"]);

    let widget = upload(&config_path, "widget.jpg");
    let (stdout, stderr, success) = run_catalog(
        &config_path,
        &["add", "--name", "Widget", "--category", "Toys", "--image", &widget],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("item received: Widget"));
    assert!(stdout.contains("id:       1"));

    let lamp = upload(&config_path, "lamp.jpg");
    let (_, _, success) = run_catalog(
        &config_path,
        &["add", "--name", "Lamp", "--category", "Home", "--image", &lamp],
    );
    assert!(success);

    let (stdout, _, success) = run_catalog(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("1. Widget [Toys]"), "got: {}", stdout);
    assert!(stdout.contains("2. Lamp [Home]"), "got: {}", stdout);

    let (stdout, _, success) = run_catalog(&config_path, &["get", "1"]);
    assert!(success);
    assert!(stdout.contains("name:       Widget"));
    assert!(stdout.contains("category:   Toys"));

    let (stdout, _, success) = run_catalog(&config_path, &["search", "WID"]);
    assert!(success);
    assert!(stdout.contains("1. Widget [Toys]"));
    assert!(!stdout.contains("Lamp"));

    let (stdout, _, success) = run_catalog(&config_path, &["search", "zzz"]);
    assert!(success);
    assert!(stdout.contains("No results."));

    let (stdout, _, success) = run_catalog(&config_path, &["categories"]);
    assert!(success);
    assert!(stdout.contains("1. Toys"));
    assert!(stdout.contains("2. Home"));
}

#[test]
fn test_add_list_get_search_sqlite() {
    add_list_get_search("sqlite");
}

#[test]
fn test_add_list_get_search_json() {
    add_list_get_search("json");
}

#[test]
fn test_get_unknown_id_fails() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_catalog(&config_path, &["init"]);

    let (_, stderr, success) = run_catalog(&config_path, &["get", "99"]);
    assert!(!success, "get of an unknown id should fail");
    assert!(stderr.contains("not found"), "got: {}", stderr);
}

#[test]
fn test_add_missing_image_file_fails() {
    let (_tmp, config_path) = setup_test_env("json");

    let (_, _, success) = run_catalog(
        &config_path,
        &["add", "--name", "Ghost", "--category", "None", "--image", "/nonexistent/ghost.jpg"],
    );
    assert!(!success);

    let (stdout, _, _) = run_catalog(&config_path, &["list"]);
    assert!(stdout.contains("No items."));
}
