use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_format_phone() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.arg("format-phone").arg("712345678");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("display: 0712 345 678"))
        .stdout(predicate::str::contains("international: 254712345678"))
        .stdout(predicate::str::contains("valid: true"));
}

#[test]
fn test_format_phone_too_short() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.arg("format-phone").arg("12345");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("valid: false"));
}

#[test]
fn test_submit_rejects_invalid_phone_without_network() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.args([
        "submit",
        "--base-url",
        "http://127.0.0.1:1",
        "--transaction-id",
        "TX-1",
        "--method",
        "mpesa",
        "--phone",
        "12345",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("valid Kenyan phone number"));
}

#[test]
fn test_submit_prints_redirect_target() {
    let server = MockServer::start();
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/payments/form/")
            .header("X-CSRFToken", "csrf-1")
            .body_contains("transaction_id=TX-1")
            .body_contains("phone_number=254712345678");
        then.status(302).header("Location", "/payments/status/TX-1/");
    });

    let mut context = tempfile::NamedTempFile::new().unwrap();
    write!(
        context,
        r#"{{"base_url":"{}","transaction_id":"TX-1","csrf_token":"csrf-1"}}"#,
        server.base_url()
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.arg("submit")
        .arg("--context")
        .arg(context.path())
        .args(["--method", "mpesa", "--phone", "0712 345 678"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("/payments/status/TX-1/"));
    post.assert();
}

#[test]
fn test_poll_settled_payment_exits_immediately() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.args([
        "poll",
        "--base-url",
        "http://127.0.0.1:1",
        "--transaction-id",
        "TX-1",
        "--status",
        "completed",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("completed\n"));
}

#[test]
fn test_complete_prints_deep_link() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.args([
        "complete",
        "--base-url",
        "http://localhost",
        "--transaction-id",
        "TX-1",
        "--status",
        "completed",
    ]);

    cmd.assert().success().stdout(predicate::str::contains(
        "bematore://payment/complete?transaction_id=TX-1&status=completed",
    ));
}

#[test]
fn test_missing_context_is_reported() {
    let mut cmd = Command::new(cargo_bin!("bematore-checkout"));
    cmd.args(["poll", "--transaction-id", "TX-1"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--base-url or --context is required"));
}
