//! Integration tests for the nomen CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SCHEMA: &str = include_str!("../../nomen-core/sql/schema.sql");

const DOCUMENT: &str = r#"<ICD10CM.tabular version="2026">
  <chapter>
    <name>1</name>
    <desc>Test Chapter</desc>
    <section id="A00-A09">
      <diag>
        <name>A00</name>
        <desc>Cholera</desc>
        <diag>
          <name>A00.1</name>
          <desc>Cholera due to X</desc>
          <includes><note>classical cholera</note></includes>
        </diag>
      </diag>
    </section>
  </chapter>
</ICD10CM.tabular>
"#;

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("nomen").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("NOMEN_DATABASE");
    cmd
}

/// Temporary directory holding a document and an initialized database
fn create_test_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("tabular.xml"), DOCUMENT).unwrap();

    let conn = Connection::open(temp_dir.path().join("nomen.db")).unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    temp_dir
}

fn code_count(database: &Path) -> i64 {
    let conn = Connection::open(database).unwrap();
    conn.query_row("SELECT COUNT(*) FROM icd10_codes", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_import_with_yes_writes_rows() {
    let workspace = create_test_workspace();
    let database = workspace.path().join("nomen.db");

    cli()
        .current_dir(workspace.path())
        .args(["--no-color", "import", "tabular.xml", "--database", "nomen.db", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nomenclature Import Summary"))
        .stdout(predicate::str::contains("Codes:                2"))
        .stdout(predicate::str::contains("Parent links:         1"));

    assert_eq!(code_count(&database), 2);
}

#[test]
fn test_import_without_confirmation_writes_nothing() {
    let workspace = create_test_workspace();
    let database = workspace.path().join("nomen.db");

    cli()
        .current_dir(workspace.path())
        .args(["--no-color", "import", "tabular.xml", "-d", "nomen.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import cancelled"));

    assert_eq!(code_count(&database), 0);
}

#[test]
fn test_import_json_output() {
    let workspace = create_test_workspace();

    let output = cli()
        .current_dir(workspace.path())
        .args(["import", "tabular.xml", "-d", "nomen.db", "-y", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["stats"]["codes"], 2);
    assert_eq!(summary["stats"]["inclusionTerms"], 1);
    assert_eq!(summary["parentsResolved"], 1);
    assert_eq!(summary["documentVersion"], "2026");
}

#[test]
fn test_import_uses_config_file() {
    let workspace = create_test_workspace();
    fs::write(
        workspace.path().join("nomen.toml"),
        "document = \"tabular.xml\"\ndatabase = \"nomen.db\"\n",
    )
    .unwrap();

    cli()
        .current_dir(workspace.path())
        .args(["import", "--yes", "--quiet"])
        .assert()
        .success();

    assert_eq!(code_count(&workspace.path().join("nomen.db")), 2);
}

#[test]
fn test_import_into_database_without_schema_fails() {
    let workspace = create_test_workspace();
    Connection::open(workspace.path().join("empty.db"))
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (id INTEGER);")
        .unwrap();

    cli()
        .current_dir(workspace.path())
        .args(["import", "tabular.xml", "-d", "empty.db", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no nomenclature tables"));
}

#[test]
fn test_missing_document_fails() {
    let workspace = create_test_workspace();

    cli()
        .current_dir(workspace.path())
        .args(["import", "missing.xml", "-d", "nomen.db", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document not found"));

    assert_eq!(code_count(&workspace.path().join("nomen.db")), 0);
}

#[test]
fn test_failure_is_reported_once() {
    let workspace = create_test_workspace();
    fs::write(workspace.path().join("broken.xml"), "<root><chapter></root>").unwrap();

    cli()
        .current_dir(workspace.path())
        .args(["import", "broken.xml", "-d", "nomen.db", "-y"])
        .assert()
        .failure()
        .stderr(predicate::function(|stderr: &str| {
            stderr.matches("Malformed").count() == 1
        }));
}

#[test]
fn test_inspect_does_not_need_database() {
    let workspace = create_test_workspace();

    cli()
        .current_dir(workspace.path())
        .args(["inspect", "tabular.xml", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"codes\": 2"));

    assert_eq!(code_count(&workspace.path().join("nomen.db")), 0);
}

#[test]
fn test_inspect_without_document_fails() {
    let temp_dir = TempDir::new().unwrap();

    cli()
        .current_dir(temp_dir.path())
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No nomenclature document given"));
}
