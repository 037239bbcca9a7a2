//! Retry-with-backoff behaviour on a paused clock.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use auditdesk_core::http::{ApiRequest, RetryPolicy, TransportError};
use auditdesk_domain::constants::messages;
use auditdesk_domain::ErrorKind;
use support::{
    dispatcher, dispatcher_with_retry, ok_json, status, GatedRefresher, MockSession,
    MockTransport,
};

fn fixture(transport: Arc<MockTransport>) -> (Arc<MockSession>, auditdesk_core::ApiDispatcher) {
    let session = MockSession::with_token("t");
    let refresher = GatedRefresher::failing(session.clone());
    let api = dispatcher(transport, session.clone(), refresher);
    (session, api)
}

fn assert_close(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let diff = actual.abs_diff(expected);
    assert!(diff <= Duration::from_millis(50), "expected ~{expected:?}, got {actual:?}");
}

#[tokio::test(start_paused = true)]
async fn connection_failures_back_off_exponentially() {
    let transport = MockTransport::new(|_| Err(TransportError::Connect("refused".into())));
    let (session, api) = fixture(transport.clone());

    let err = api.execute(&ApiRequest::get("/products")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, messages::NETWORK_FAILED);
    assert_eq!(transport.sent(), 4);

    let times = transport.send_times();
    assert_close(times[1] - times[0], 1000);
    assert_close(times[2] - times[1], 2000);
    assert_close(times[3] - times[2], 4000);

    // Only surfaced once retries are exhausted.
    assert_eq!(session.errors(), vec![messages::NETWORK_FAILED.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn exhausted_timeouts_surface_as_network() {
    let transport = MockTransport::new(|_| Err(TransportError::Timeout("30s".into())));
    let (_, api) = fixture(transport.clone());

    let err = api.execute(&ApiRequest::get("/audits")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(transport.sent(), 4);
}

#[tokio::test(start_paused = true)]
async fn recovers_when_server_comes_back() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let transport = MockTransport::new(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            status(503)
        } else {
            ok_json(serde_json::json!([1, 2, 3]))
        }
    });
    let (session, api) = fixture(transport.clone());

    let response = api.request::<Vec<i64>>(&ApiRequest::get("/rules")).await.unwrap();

    assert_eq!(response.data, Some(vec![1, 2, 3]));
    assert_eq!(transport.sent(), 3);
    assert!(session.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn exhausted_server_errors_keep_server_kind() {
    let transport = MockTransport::new(|_| status(502));
    let (session, api) = fixture(transport.clone());

    let err = api.execute(&ApiRequest::get("/products")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, messages::SERVICE_UNAVAILABLE);
    assert_eq!(transport.sent(), 4);
    assert_eq!(session.errors().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    for code in [400_u16, 403, 404, 409, 422] {
        let transport = MockTransport::new(move |_| status(code));
        let (_, api) = fixture(transport.clone());

        let err = api.execute(&ApiRequest::get("/documents/1")).await.unwrap_err();
        assert_ne!(err.kind, ErrorKind::Server);
        assert_eq!(transport.sent(), 1, "status {code} must not be retried");
    }
}

#[tokio::test(start_paused = true)]
async fn business_failures_are_not_retried() {
    let transport = MockTransport::new(|_| {
        Ok(auditdesk_core::TransportResponse::json(
            200,
            &serde_json::json!({"success": false, "code": 1001, "message": "产品不存在"}),
        ))
    });
    let (session, api) = fixture(transport.clone());

    let err = api.request::<serde_json::Value>(&ApiRequest::get("/products/9")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(transport.sent(), 1);
    assert_eq!(session.errors(), vec!["产品不存在".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn server_retries_can_be_disabled() {
    let transport = MockTransport::new(|_| status(500));
    let session = MockSession::with_token("t");
    let api = dispatcher_with_retry(
        transport.clone(),
        session.clone(),
        GatedRefresher::failing(session),
        RetryPolicy::default().retry_server_errors(false),
    );

    let err = api.execute(&ApiRequest::get("/rules")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(transport.sent(), 1);
}
