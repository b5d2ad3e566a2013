// End-to-end tests for the agrid binary against a temporary database.
//
// Run with: cargo test -p auditgrid-cli --test cli_tests

use std::path::Path;
use std::process::{Command, Output};

use auditgrid_cli::exit_codes::{EXIT_NOT_FOUND, EXIT_PLAN_APPLY, EXIT_PLAN_INVALID};

const PAYLOAD: &str = r#"{
  "matrix": [
    ["PO Number", "Description", "Qty"],
    ["PO100", "A", 1],
    ["PO100", "B", 2],
    ["PO200", "C", 3],
    ["PO300", "D", 4],
    ["PO300", "E", 5]
  ],
  "fields": { "0": "po_number", "1": "description", "2": "quantity" }
}"#;

fn agrid(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agrid"));
    cmd.env("AGRID_DB", dir.join("audits.db"));
    // keep settings out of the real config dir
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    agrid(dir).args(args).output().expect("run agrid")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn assert_ok(out: &Output) {
    assert!(
        out.status.success(),
        "exit code: {:?}\nstderr: {}",
        out.status,
        String::from_utf8_lossy(&out.stderr)
    );
}

fn imported() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("audit.json");
    std::fs::write(&payload, PAYLOAD).unwrap();
    let out = run(dir.path(), &["import", "IMO9321483", "--json", payload.to_str().unwrap()]);
    assert_ok(&out);
    assert!(stdout(&out).contains("5 rows, 3 columns"));
    dir
}

#[test]
fn groups_json_lists_duplicates() {
    let dir = imported();
    let out = run(dir.path(), &["groups", "IMO9321483", "--json"]);
    assert_ok(&out);

    let val: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(
        val,
        serde_json::json!([
            { "key": "PO100", "members": [1, 2] },
            { "key": "PO300", "members": [4, 5] }
        ])
    );
}

#[test]
fn resolve_commits_and_records_registry() {
    let dir = imported();
    let plan = dir.path().join("plan.toml");
    std::fs::write(
        &plan,
        "[[group]]\nkey = \"PO100\"\naction = \"DI\"\n\n[[row]]\nindex = 5\naction = \"R\"\n",
    )
    .unwrap();

    let out = run(dir.path(), &["resolve", "IMO9321483", "--plan", plan.to_str().unwrap(), "--json"]);
    assert_ok(&out);
    let record: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(record["imoOrAuditId"], "IMO9321483");
    assert_eq!(record["totalItems"], 3);
    assert_eq!(record["totalPurchaseOrders"], 3);
    assert_eq!(record["duplicatePurchaseOrders"], 0);

    let out = run(dir.path(), &["groups", "IMO9321483"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("no duplicate groups"));

    let out = run(dir.path(), &["registry", "--json"]);
    assert_ok(&out);
    let records: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(1));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = imported();
    let plan = dir.path().join("plan.toml");
    std::fs::write(&plan, "[[group]]\nkey = \"PO300\"\naction = \"D\"\n").unwrap();

    let out = run(dir.path(), &["resolve", "IMO9321483", "--plan", plan.to_str().unwrap(), "--dry-run"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("dry run"));

    let out = run(dir.path(), &["registry", "IMO9321483"]);
    assert_eq!(out.status.code(), Some(EXIT_NOT_FOUND as i32));

    let out = run(dir.path(), &["groups", "IMO9321483", "--json"]);
    let val: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(val.as_array().map(Vec::len), Some(2));
}

#[test]
fn bad_plans_have_distinct_exit_codes() {
    let dir = imported();
    let invalid = dir.path().join("invalid.toml");
    std::fs::write(&invalid, "[[row]]\nindex = 1\naction = \"maybe\"\n").unwrap();
    let out = run(dir.path(), &["resolve", "IMO9321483", "--plan", invalid.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(EXIT_PLAN_INVALID as i32));

    let unknown = dir.path().join("unknown.toml");
    std::fs::write(&unknown, "[[group]]\nkey = \"PO999\"\naction = \"A\"\n").unwrap();
    let out = run(dir.path(), &["resolve", "IMO9321483", "--plan", unknown.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(EXIT_PLAN_APPLY as i32));
}

#[test]
fn unknown_audit_falls_back_to_sample() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["groups", "NOPE", "--json"]);
    assert_ok(&out);
    assert!(String::from_utf8_lossy(&out.stderr).contains("sample audit"));
    let val: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert!(!val.as_array().unwrap().is_empty());
}
