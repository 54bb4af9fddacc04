use bematore_checkout::domain::form::{CSRF_FIELD, FormData, PAYMENT_METHOD_FIELD, PHONE_FIELD};
use bematore_checkout::domain::ports::{PaymentGateway, SubmissionResponse};
use bematore_checkout::domain::status::TransactionStatus;
use bematore_checkout::error::CheckoutError;
use bematore_checkout::infrastructure::http::HttpGateway;
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;
use url::Url;

fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(Url::parse(&server.base_url()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_fetch_status_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/payments/api/status/TX-1/")
                .header("Authorization", "Bearer secret")
                .header("Content-Type", "application/json");
            then.status(200).json_body(json!({
                "transaction_id": "TX-1",
                "status": "completed",
                "amount": 12.5,
                "currency": "USD",
                "payment_method": "mpesa",
                "completed_at": "2024-05-01T10:00:00"
            }));
        })
        .await;

    let status = gateway(&server).fetch_status("TX-1", "secret").await.unwrap();

    mock.assert_async().await;
    assert_eq!(status.status, TransactionStatus::Completed);
    assert_eq!(status.amount, Some(dec!(12.5)));
    assert_eq!(status.payment_method.as_deref(), Some("mpesa"));
}

#[tokio::test]
async fn test_fetch_status_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/payments/api/status/missing/");
            then.status(404)
                .json_body(json!({"error": "Payment transaction not found"}));
        })
        .await;

    let err = gateway(&server)
        .fetch_status("missing", "secret")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::UnexpectedStatus { status: 404, ref body } if body.contains("not found")
    ));
}

#[tokio::test]
async fn test_submit_reports_redirect_target() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/payments/form/")
                .header("X-CSRFToken", "csrf-abc")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body_contains("phone_number=254712345678");
            then.status(302)
                .header("Location", "/payments/status/TX-1/");
        })
        .await;

    let form = FormData::new()
        .with(CSRF_FIELD, "csrf-abc")
        .with(PAYMENT_METHOD_FIELD, "mpesa")
        .with(PHONE_FIELD, "254712345678");
    let response = gateway(&server)
        .submit("/payments/form/", &form)
        .await
        .unwrap();

    post.assert_async().await;
    assert_eq!(
        response,
        SubmissionResponse::Redirected(Url::parse(&server.url("/payments/status/TX-1/")).unwrap())
    );
}

#[tokio::test]
async fn test_redirect_back_to_form_still_navigates() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST).path("/payments/form/");
            then.status(302).header("Location", "/payments/form/");
        })
        .await;
    let reload = server
        .mock_async(|when, then| {
            when.method(GET).path("/payments/form/");
            then.status(200).body("<html>form with error message</html>");
        })
        .await;

    let form = FormData::new().with(PAYMENT_METHOD_FIELD, "mpesa");
    let response = gateway(&server)
        .submit("/payments/form/", &form)
        .await
        .unwrap();

    post.assert_async().await;
    assert_eq!(reload.hits_async().await, 0);
    assert_eq!(
        response,
        SubmissionResponse::Redirected(Url::parse(&server.url("/payments/form/")).unwrap())
    );
}

#[tokio::test]
async fn test_submit_without_redirect_returns_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/payments/form/");
            then.status(400).body("Invalid payment method selected");
        })
        .await;

    let form = FormData::new().with(PAYMENT_METHOD_FIELD, "flutterwave");
    let response = gateway(&server)
        .submit("/payments/form/", &form)
        .await
        .unwrap();

    match response {
        SubmissionResponse::Body(body) => {
            assert_eq!(body.status, 400);
            assert_eq!(body.text, "Invalid payment method selected");
        }
        other => panic!("expected a body, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let gateway = HttpGateway::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
    let err = gateway
        .submit("/payments/form/", &FormData::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Network(_)));
}
