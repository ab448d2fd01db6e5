// End-to-end tests for the `tsukiai` binary: stdout contract and exit codes.
//
// Run with: cargo test -p tsukiai-cli --test cli_run -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};

fn tsukiai() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tsukiai"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    tsukiai().args(args).output().expect("spawn tsukiai")
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn p(path: &Path) -> &str {
    path.to_str().unwrap()
}

const ORDERS_CSV: &str = "\
業者ID,業者名,建物名,番号,支払金額
1,山田工務店,サンビル,101,50000
2,佐藤建設,ムーンハイツ,305,80000
";

fn invoices_all_match() -> String {
    json!([
        [
            {"発注番号": "PO-1", "工事業者名": "山田 工務店", "物件名": "サンビル", "部屋番号": "１０１", "金額": 50000},
            {"発注番号": "PO-2", "工事業者名": "佐藤建設", "物件名": "ムーンハイツ", "部屋番号": "305", "金額": "80000"}
        ]
    ])
    .to_string()
}

fn invoices_one_match() -> String {
    json!([
        {"発注番号": "PO-1", "工事業者名": "山田工務店", "物件名": "サンビル", "部屋番号": "101", "金額": 50000}
    ])
    .to_string()
}

/// Assert stdout is exactly one JSON value.
fn single_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}\nstderr:\n{}", stderr(output))
    })
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn all_matched_exits_zero_with_json_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", &invoices_all_match());

    let out = run(&["run", "--orders", p(&orders), "--invoices", p(&invoices)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let val = single_json(&out);
    assert_eq!(val["summary"]["total_orders"], json!(2));
    assert_eq!(val["summary"]["matched"], json!(2));
    assert_eq!(val["meta"]["max_distance"], json!(2));

    let rows = val["diff_rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["status"], json!("MATCHED"));
    assert_eq!(rows[0]["invoice_vendor_id"], json!("PO-1"));
    assert_eq!(rows[0]["invoice_vendor_name"], json!("山田 工務店"));
    assert_eq!(rows[1]["invoice_payment_amount"], json!("80000"));

    assert!(stderr(&out).contains("2 matched, 0 unmatched"));
}

#[test]
fn unmatched_orders_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", &invoices_one_match());

    let out = run(&["run", "--orders", p(&orders), "--invoices", p(&invoices)]);
    assert_eq!(code(&out), 1);

    let val = single_json(&out);
    assert_eq!(val["diff_rows"][1]["status"], json!("UNMATCHED"));
    assert_eq!(val["diff_rows"][1]["invoice_vendor_name"], json!(""));
    let err = stderr(&out);
    assert!(err.contains("1 matched, 1 unmatched"), "stderr: {err}");
    assert!(!err.contains("error:"), "unmatched orders are not an error: {err}");
}

#[test]
fn quiet_unmatched_run_leaves_stderr_empty() {
    let dir = tempfile::tempdir().unwrap();
    let event = json!({
        "orders": [{"業者名": "山田工務店", "建物名": "サンビル", "番号": "101", "支払金額": "50000"}],
        "invoices": []
    });
    let input = write(dir.path(), "event.json", &event.to_string());

    let out = run(&["run", "--input", p(&input), "-q"]);
    assert_eq!(code(&out), 1);
    assert_eq!(stderr(&out), "");
    assert_eq!(single_json(&out)["diff_rows"][0]["status"], json!("UNMATCHED"));
}

#[test]
fn csv_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", &invoices_all_match());
    let target = dir.path().join("diff.csv");

    let out = run(&[
        "run",
        "--orders", p(&orders),
        "--invoices", p(&invoices),
        "--format", "csv",
        "--labels", "source",
        "--output", p(&target),
    ]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(out.stdout.is_empty(), "stdout must stay empty with --output");

    let text = std::fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("order_業者ID,order_業者名,"));
    assert!(lines[0].ends_with(",status"));
    assert!(lines[1].ends_with(",MATCHED"));
}

#[test]
fn envelope_input_and_config_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let event = json!({
        "orders": [
            {"業者名": "山田工務店", "建物名": "サンビル", "番号": "101", "支払金額": "50000"}
        ],
        "invoices": [
            {"工事業者名": "山田工務店", "物件名": "サンビル", "部屋番号": "101", "金額": "50001"}
        ]
    });
    let input = write(dir.path(), "event.json", &event.to_string());
    let config = write(
        dir.path(),
        "strict.recon.toml",
        "name = \"strict\"\n[tolerance]\nmax_distance = 0\n",
    );

    // config says exact match only
    let out = run(&["run", "--input", p(&input), "--config", p(&config), "-q"]);
    assert_eq!(code(&out), 1);
    let val = single_json(&out);
    assert_eq!(val["meta"]["config_name"], json!("strict"));
    assert_eq!(val["meta"]["max_distance"], json!(0));

    // flag loosens it again
    let out = run(&[
        "run", "--input", p(&input), "--config", p(&config), "--max-distance", "1", "-q",
    ]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert_eq!(single_json(&out)["summary"]["matched"], json!(1));
}

#[test]
fn workers_flag_keeps_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", &invoices_all_match());

    let out = run(&[
        "run", "--orders", p(&orders), "--invoices", p(&invoices), "--workers", "3", "-q",
    ]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let val = single_json(&out);
    assert_eq!(val["meta"]["workers"], json!(3));
    assert_eq!(val["diff_rows"][0]["order_vendor_name"], json!("山田工務店"));
    assert_eq!(val["diff_rows"][1]["order_vendor_name"], json!("佐藤建設"));
}

// ===========================================================================
// Error exit codes
// ===========================================================================

#[test]
fn missing_input_is_usage_error() {
    let out = run(&["run"]);
    assert_eq!(code(&out), 2);
    assert!(stderr(&out).contains("hint:"));
}

#[test]
fn conflicting_inputs_rejected_by_parser() {
    let out = run(&["run", "--input", "a.json", "--orders", "b.csv", "--invoices", "c.json"]);
    assert_eq!(code(&out), 2);
}

#[test]
fn zero_workers_rejected_by_parser() {
    let out = run(&["run", "--input", "a.json", "--workers", "0"]);
    assert_eq!(code(&out), 2);
}

#[test]
fn missing_file_is_input_error() {
    let out = run(&["run", "--input", "/nonexistent/tsukiai/event.json"]);
    assert_eq!(code(&out), 3);
    assert!(stderr(&out).contains("cannot read"));
}

#[test]
fn malformed_json_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", "[{\"金額\": ");

    let out = run(&["run", "--orders", p(&orders), "--invoices", p(&invoices)]);
    assert_eq!(code(&out), 3);
    assert!(out.stdout.is_empty());
}

#[test]
fn wrong_shape_is_input_type_error() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.csv", ORDERS_CSV);
    let invoices = write(dir.path(), "invoices.json", "[1, 2, 3]");

    let out = run(&["run", "--orders", p(&orders), "--invoices", p(&invoices)]);
    assert_eq!(code(&out), 4);
    assert!(stderr(&out).contains("invoices"));
}

#[test]
fn oversized_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let big = format!("{{\"orders\": [], \"invoices\": [], \"pad\": \"{}\"}}", "x".repeat(1024 * 1024));
    let input = write(dir.path(), "event.json", &big);

    let out = run(&["run", "--input", p(&input)]);
    assert_eq!(code(&out), 6);
    assert!(stderr(&out).contains("byte limit"));
}

// ===========================================================================
// validate
// ===========================================================================

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "monthly.recon.toml",
        "name = \"monthly\"\n[engine]\nworkers = 2\n[output]\nlabels = \"source\"\nformat = \"csv\"\n",
    );

    let out = run(&["validate", p(&config)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("valid: recon 'monthly'"));
}

#[test]
fn validate_rejects_unknown_keys_and_zero_workers() {
    let dir = tempfile::tempdir().unwrap();

    let typo = write(dir.path(), "typo.recon.toml", "[tolerance]\nmax_distanse = 3\n");
    let out = run(&["validate", p(&typo)]);
    assert_eq!(code(&out), 5);

    let zero = write(dir.path(), "zero.recon.toml", "[engine]\nworkers = 0\n");
    let out = run(&["validate", p(&zero)]);
    assert_eq!(code(&out), 5);
    assert!(stderr(&out).contains("workers"));
}
