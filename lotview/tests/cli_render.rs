//! CLI tests spawning the `lotview` binary.

use std::fs;
use std::process::Command;

use lotview::io::config::{AppConfig, CONFIG_FILE, load_config};

#[test]
fn render_prints_bundled_lots() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_lotview"))
        .current_dir(temp.path())
        .arg("render")
        .output()
        .expect("lotview render");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("<h1>Apple</h1>"));
    assert!(stdout.contains("<h1>Orange</h1>"));
    assert!(stdout.contains(r#"<article class="lot favorite" data-key="1">"#));
}

#[test]
fn render_reads_lots_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("lots.json"),
        r#"[{"id": 5, "name": "Plum", "description": "Purple", "price": 3, "favorite": false}]"#,
    )
    .expect("write lots");

    let output = Command::new(env!("CARGO_BIN_EXE_lotview"))
        .current_dir(temp.path())
        .args(["render", "--lots", "lots.json"])
        .output()
        .expect("lotview render");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("<h1>Plum</h1>"));
    assert!(!stdout.contains("Apple"));
}

#[test]
fn render_rejects_duplicate_ids() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("lots.json"),
        r#"[{"id": 5, "name": "A", "description": "", "price": 1, "favorite": false},
            {"id": 5, "name": "B", "description": "", "price": 2, "favorite": false}]"#,
    )
    .expect("write lots");

    let output = Command::new(env!("CARGO_BIN_EXE_lotview"))
        .current_dir(temp.path())
        .args(["render", "--lots", "lots.json"])
        .output()
        .expect("lotview render");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("duplicate lot id 5"));
}

#[test]
fn init_writes_default_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let status = Command::new(env!("CARGO_BIN_EXE_lotview"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("lotview init");

    assert!(status.success());
    let cfg = load_config(&temp.path().join(CONFIG_FILE)).expect("load");
    assert_eq!(cfg, AppConfig::default());
}
