//! E2E tests driving the compiled `ganttoml` binary.

use std::fs;
use std::path::Path;
use std::process::Command;

const SAMPLE: &str = r#"
[1]
task = "Design"
start = 2018-06-20
end = 2018-06-28
complete = 100

[2]
task = "Build"
start = 2018-06-25
end = 2018-07-02
complete = 70
"#;

fn write_source(dir: &Path) -> String {
    fs::write(dir.join("gantt.toml"), SAMPLE).unwrap();
    dir.join("gantt").to_str().unwrap().to_string()
}

/// Run the binary and return (exit_code, stdout, stderr)
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ganttoml"))
        .args(args)
        .output()
        .expect("failed to execute ganttoml");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn plot_writes_png() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(tmp.path());
    let images = tmp.path().join("Images");

    let (code, stdout, stderr) = run(&[
        "plot",
        &source,
        "--dir",
        images.to_str().unwrap(),
        "--name",
        "Gantt",
    ]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Wrote"), "stdout: {stdout}");
    assert!(images.join("Gantt.png").is_file());
}

#[test]
fn plot_without_name_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(tmp.path());

    let (code, stdout, _) = run(&["plot", &source]);

    assert_eq!(code, 0);
    assert!(stdout.contains("nothing written"), "stdout: {stdout}");
    let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1); // just gantt.toml
}

#[test]
fn plot_missing_source_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("absent").to_str().unwrap().to_string();

    let (code, _, stderr) = run(&["plot", &source, "--name", "x"]);

    assert_ne!(code, 0);
    assert!(stderr.contains("cannot read"), "stderr: {stderr}");
}

#[test]
fn check_reports_rows_and_span() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(tmp.path());

    let (code, stdout, _) = run(&["check", &source]);

    assert_eq!(code, 0);
    assert!(stdout.contains("2 task record(s)"), "stdout: {stdout}");
    assert!(stdout.contains("2018-06-20 to 2018-07-02"), "stdout: {stdout}");
    assert!(stdout.contains("Design"));
    assert!(stdout.contains("100%"));
}

#[test]
fn check_missing_source_fails() {
    let (code, _, stderr) = run(&["check", "definitely_absent"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("definitely_absent.toml"), "stderr: {stderr}");
}
