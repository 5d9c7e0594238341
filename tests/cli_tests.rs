use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn billing_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("billing"))
}

fn init(config_path: &Path) {
    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

fn write_records(config_path: &Path, records: &str) {
    fs::write(config_path.join("records.toml"), records).unwrap();
}

const LEDGER: &str = r#"[[customers]]
id = 1
name = "Acme"

[[customers]]
id = 2
name = "Globex"

[[invoices]]
id = 1
customer_id = 1
invoice_date = "2026-01-10"
total_amount = "100.00"
created_at = "2026-01-10T09:00:00Z"

[[invoices]]
id = 2
customer_id = 1
invoice_date = "2026-02-03"
total_amount = "50.00"
created_at = "2026-02-03T09:00:00Z"

[[invoices]]
id = 3
customer_id = 2
invoice_date = "2026-02-20"
total_amount = "30.00"
created_at = "2026-02-20T09:00:00Z"

[[payments]]
id = 1
invoice_id = 1
amount = "40.00"
payment_date = "2026-01-15"
method = "CARD"
status = "success"
created_at = "2026-01-15T10:00:00Z"

[[payments]]
id = 2
invoice_id = 2
amount = "50.00"
payment_date = "2026-02-10"
status = "success"
created_at = "2026-02-10T10:00:00Z"

[[payments]]
id = 3
invoice_id = 3
amount = "30.00"
payment_date = "2026-02-21"
status = "pending"
created_at = "2026-02-21T10:00:00Z"
"#;

fn ledger() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");
    init(&config_path);
    write_records(&config_path, LEDGER);
    (temp_dir, config_path)
}

#[test]
fn test_help() {
    billing_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Minimal CLI billing records and financial reports",
        ));
}

#[test]
fn test_version() {
    billing_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("billing"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized billing data"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("records.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");

    init(&config_path);

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_counts_records() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing Status"))
        .stdout(predicate::str::contains("Invoices:         3"))
        .stdout(predicate::str::contains("Payments:         3"));
}

#[test]
fn test_invoice_and_payment_flow() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");
    let dir = config_path.to_str().unwrap();
    init(&config_path);

    billing_cmd()
        .args(["-C", dir, "add-customer", "Acme Corp", "--email", "ap@acme.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added customer 1: Acme Corp"));

    billing_cmd()
        .args(["-C", dir, "add-product", "Widget", "--sku", "W-1", "--price", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added product 1: Widget (W-1)"));

    billing_cmd()
        .args([
            "-C",
            dir,
            "add-invoice",
            "--customer",
            "1",
            "--item",
            "1:4",
            "--date",
            "2026-01-10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created invoice 1"))
        .stdout(predicate::str::contains("Total:    $100.00"));

    billing_cmd()
        .args([
            "-C", dir, "add-payment", "--invoice", "1", "--amount", "40", "--date", "2026-01-15",
            "--method", "card",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("$40.00"))
        .stdout(predicate::str::contains("Partially Paid"));

    billing_cmd()
        .args(["-C", dir, "invoices"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Corp"))
        .stdout(predicate::str::contains("Partially Paid"));

    billing_cmd()
        .args(["-C", dir, "report", "invoices"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice-wise Report"))
        .stdout(predicate::str::contains("Paid Amount"))
        .stdout(predicate::str::contains("60.00"))
        .stdout(predicate::str::contains("Rows: 1"));

    let out = temp_dir.path().join("invoices.csv");
    billing_cmd()
        .args(["-C", dir, "export", "invoices", "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 rows"));

    let csv = fs::read_to_string(&out).unwrap();
    assert_eq!(
        csv,
        "Invoice ID,Customer,Date,Total Amount,Paid Amount,Balance\n\
         1,Acme Corp,2026-01-10,100.00,40.00,60.00\n"
    );
}

#[test]
fn test_outstanding_export_skips_settled_invoices() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "export",
            "outstanding",
            "-o",
            "-",
        ])
        .assert()
        .success()
        .stdout(
            "Customer,Total Invoice,Total Paid,Outstanding\n\
             Acme,100.00,40.00,60.00\n\
             Globex,30.00,0.00,30.00\n",
        );
}

#[test]
fn test_monthly_export_with_date_filter() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "export",
            "monthly",
            "--from",
            "2026-02-01",
            "-o",
            "-",
        ])
        .assert()
        .success()
        .stdout(
            "Year,Month,No. of Invoices,Total Invoice Amount,Total Paid,Total Balance\n\
             2026,2,2,80.00,50.00,30.00\n",
        );
}

#[test]
fn test_payments_export_filters_by_status() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "export",
            "payments",
            "--status",
            "pending",
            "-o",
            "-",
        ])
        .assert()
        .success()
        .stdout(
            "ID,Invoice,Customer,Method,Status,Amount,Payment Date\n\
             3,3,Globex,Cash,pending,30.00,2026-02-21\n",
        );
}

#[test]
fn test_export_writes_default_file_name() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "export", "customers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("customer_report.csv"));

    let csv = fs::read_to_string(config_path.join("exports/customer_report.csv")).unwrap();
    assert_eq!(
        csv,
        "Customer,No. of Payments,Total Amount\nAcme,2,90.00\nGlobex,1,30.00\n"
    );
}

#[test]
fn test_unknown_filters_yield_empty_report() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "payments",
            "--status",
            "refunded",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rows match the given filters."));

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "invoices",
            "--customer-id",
            "abc",
            "--from",
            "not-a-date",
        ])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rows match the given filters."))
        .stderr(predicate::str::contains("ignoring malformed date filter"))
        .stderr(predicate::str::contains("not-a-date"));
}

#[test]
fn test_malformed_date_filter_is_ignored() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "export",
            "invoices",
            "--to",
            "2026-02-31",
            "-o",
            "-",
        ])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("3,Globex,2026-02-20,30.00,0.00,30.00"))
        .stderr(predicate::str::contains("WARN"))
        .stderr(predicate::str::contains("ignoring malformed date filter"));
}

#[test]
fn test_amount_above_ten_digits_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");
    init(&config_path);

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-product",
            "Yacht",
            "--sku",
            "Y-1",
            "--price",
            "100000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount '100000000'"));
}

#[test]
fn test_report_json_output() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "products",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "customers",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"customer_name\": \"Acme\""))
        .stdout(predicate::str::contains("\"total_amount\": \"90.00\""));
}

#[test]
fn test_add_invoice_unknown_customer() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");
    init(&config_path);

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-invoice",
            "--customer",
            "9",
            "--item",
            "1:1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Customer 9 not found"));
}

#[test]
fn test_add_invoice_invalid_quantity() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "add-invoice",
            "--customer",
            "1",
            "--item",
            "1:abc",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));
}

#[test]
fn test_duplicate_sku_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("billing-data");
    let dir = config_path.to_str().unwrap();
    init(&config_path);

    billing_cmd()
        .args(["-C", dir, "add-product", "Widget", "--sku", "W-1", "--price", "5"])
        .assert()
        .success();

    billing_cmd()
        .args(["-C", dir, "add-product", "Gadget", "--sku", "W-1", "--price", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SKU 'W-1' is already in use"));
}

#[test]
fn test_remove_customer_with_invoices_fails() {
    let (_temp_dir, config_path) = ledger();

    billing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "remove-customer", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still has 1 invoice(s)"));
}

#[test]
fn test_edit_payment_changes_outstanding() {
    let (_temp_dir, config_path) = ledger();
    let dir = config_path.to_str().unwrap();

    billing_cmd()
        .args(["-C", dir, "edit-payment", "3", "--status", "success"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated payment 3"));

    billing_cmd()
        .args(["-C", dir, "export", "outstanding", "-o", "-"])
        .assert()
        .success()
        .stdout(
            "Customer,Total Invoice,Total Paid,Outstanding\n\
             Acme,100.00,40.00,60.00\n",
        );
}

#[test]
fn test_remove_invoice_cascades_payments() {
    let (_temp_dir, config_path) = ledger();
    let dir = config_path.to_str().unwrap();

    billing_cmd()
        .args(["-C", dir, "remove-invoice", "1"])
        .assert()
        .success();

    billing_cmd()
        .args(["-C", dir, "export", "payments", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,1,Acme").not())
        .stdout(predicate::str::contains("2,2,Acme,Cash,success,50.00,2026-02-10"));
}
