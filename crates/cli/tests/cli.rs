//! End-to-end checks of the `doctext` binary.

use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};
use zip::write::FileOptions;
use zip::ZipWriter;

fn doctext(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_doctext"))
        .args(["--office-program", "/nonexistent/doctext-soffice"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run doctext")
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", FileOptions::default()).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    std::fs::write(path, zip.finish().unwrap().into_inner()).unwrap();
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_wrong_argument_count_is_usage_error() {
    let output = doctext(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));

    let output = doctext(&["only-one.pdf"]);
    assert_eq!(output.status.code(), Some(1));

    let output = doctext(&["a.pdf", "b.txt", "c.txt"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_zero() {
    let output = doctext(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--delimiter"));
}

#[test]
fn test_missing_input_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.docx");
    let out = dir.path().join("missing.txt");

    let output = doctext(&[path_arg(&input), path_arg(&out)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!out.exists());
}

#[test]
fn test_unsupported_format_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.xyz");
    std::fs::write(&input, "plain notes").unwrap();
    let out = dir.path().join("notes.txt");

    let output = doctext(&[path_arg(&input), path_arg(&out)]);
    assert_eq!(output.status.code(), Some(3));
    assert!(!out.exists());
}

#[test]
fn test_extraction_failure_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, "%PDF-1.4\nnot a real document").unwrap();

    let output = doctext(&[path_arg(&input), ""]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    write_docx(&input, &["Dear reader,", "Thanks for visiting."]);
    let out = dir.path().join("letter.txt");

    let output = doctext(&[path_arg(&input), path_arg(&out)]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Done. Took"));
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines, vec!["Dear reader,", "Thanks for visiting."]);
}

#[test]
fn test_empty_output_prints_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    write_docx(&input, &["Printed instead"]);

    let output = doctext(&[path_arg(&input), ""]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "Printed instead");
}

#[test]
fn test_json_report_with_words() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    write_docx(&input, &["the quick brown fox"]);

    let output = doctext(&["--json", "--words", path_arg(&input), ""]);
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "ok");
    assert_eq!(report["format"], "docx");
    assert!(report["output"].is_null());
    assert_eq!(report["words"], serde_json::json!(["quick", "brown"]));
}

#[test]
fn test_json_report_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.pptx");

    let output = doctext(&["--json", path_arg(&input), "out.txt"]);
    assert_eq!(output.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "error");
    assert_eq!(report["error_kind"], "not_found");
}
