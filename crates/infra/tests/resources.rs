//! Integration tests for the product, rule, document and audit endpoints

mod support;

use std::sync::Arc;
use std::time::Duration;

use auditdesk_core::http::{ProgressCallback, UploadProgress};
use auditdesk_domain::constants::{LOADING_AUDIT, LOADING_DOCUMENT_UPLOAD};
use auditdesk_domain::{
    AuditRequest, AuditStatus, ErrorKind, ParseStatus, ProductQuery, ProductStatus,
};
use auditdesk_infra::DocumentUpload;
use parking_lot::Mutex;
use serde_json::json;
use support::{envelope, failure, TestBackend};
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn product_list_sends_only_set_filters() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "10"))
        .and(query_param("keyword", "寿险"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "list": [], "total": 11, "page": 2, "pageSize": 10
        }))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let query = ProductQuery {
        page: Some(2),
        page_size: Some(10),
        keyword: Some("寿险".into()),
        ..ProductQuery::default()
    };
    let page = backend.client.products().list(&query).await.unwrap().data.unwrap();

    assert_eq!(page.total, 11);
    assert!(page.list.is_empty());
}

#[tokio::test]
async fn product_get_decodes_model() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/products/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 9, "name": "安心医疗险", "code": "MED-9", "status": "DRAFT",
            "insurer": "平安"
        }))))
        .mount(&backend.server)
        .await;

    let product = backend.client.products().get(9).await.unwrap().data.unwrap();
    assert_eq!(product.status, ProductStatus::Draft);
    assert_eq!(product.insurer.as_deref(), Some("平安"));
}

#[tokio::test]
async fn missing_resource_is_business_error() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/rules/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&backend.server)
        .await;

    let err = backend.client.rules().get(404).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(err.message, "请求的资源不存在");
}

#[tokio::test]
async fn rule_toggle_patches_status() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("PATCH"))
        .and(path("/api/rules/5/status"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 5, "name": "等待期不超过180天", "expression": "waitingDays <= 180",
            "severity": "ERROR", "enabled": false
        }))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let rule = backend.client.rules().set_enabled(5, false).await.unwrap().data.unwrap();
    assert!(!rule.enabled);
}

#[tokio::test]
async fn document_upload_sends_multipart_and_reports_progress() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_string_contains("name=\"productId\""))
        .and(body_string_contains("filename=\"policy-terms.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 31, "fileName": "policy-terms.pdf", "fileSize": 200000, "productId": 9,
            "parseStatus": "PENDING"
        }))))
        .expect(1)
        .mount(&backend.server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::<UploadProgress>::new()));
    let sink = Arc::clone(&seen);
    let progress = ProgressCallback::new(move |p| sink.lock().push(p));

    let upload = DocumentUpload::new("policy-terms.pdf", vec![0u8; 200_000])
        .product(9)
        .mime_type("application/pdf");
    let document =
        backend.client.documents().upload(upload, Some(progress)).await.unwrap().data.unwrap();

    assert_eq!(document.id, 31);
    assert_eq!(document.parse_status, ParseStatus::Pending);
    let seen = seen.lock();
    assert!(!seen.is_empty());
    assert_eq!(seen.last().map(UploadProgress::percent), Some(100));
    assert!(!backend.loading.is_loading(LOADING_DOCUMENT_UPLOAD));
}

#[tokio::test]
async fn document_download_returns_bytes() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/documents/31/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 fake".to_vec()),
        )
        .mount(&backend.server)
        .await;

    let bytes = backend.client.documents().download(31).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7 fake");
}

#[tokio::test]
async fn download_rejects_json_failure_body() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/audits/3/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(failure(json!("REPORT_NOT_READY"), "报告尚未生成")),
        )
        .mount(&backend.server)
        .await;

    let err = backend.client.audits().export_report(3).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(err.message, "报告尚未生成");
    assert_eq!(backend.notifier.errors(), vec!["报告尚未生成".to_string()]);
}

#[tokio::test]
async fn audit_start_raises_loading_flag_while_in_flight() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("POST"))
        .and(path("/api/audits"))
        .and(body_json(json!({"productId": 9, "ruleIds": [1, 2]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({"id": 77, "productId": 9, "status": "QUEUED"})))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let client = backend.client.clone();
    let handle = tokio::spawn(async move {
        let request = AuditRequest { product_id: 9, rule_ids: vec![1, 2], document_ids: vec![] };
        client.audits().start(&request).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(backend.loading.is_loading(LOADING_AUDIT));

    let task = handle.await.unwrap().unwrap().data.unwrap();
    assert_eq!(task.status, AuditStatus::Queued);
    assert!(!task.status.is_finished());
    assert!(!backend.loading.is_loading(LOADING_AUDIT));
}

#[tokio::test]
async fn audit_results_decode_findings() {
    let backend = TestBackend::start().await.signed_in("access-1", "refresh-1");
    Mock::given(method("GET"))
        .and(path("/api/audits/77/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            {"ruleId": 1, "passed": true},
            {"ruleId": 2, "ruleName": "犹豫期", "passed": false, "severity": "CRITICAL",
             "message": "犹豫期少于15天"}
        ]))))
        .mount(&backend.server)
        .await;

    let findings = backend.client.audits().results(77).await.unwrap().data.unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings.iter().filter(|f| !f.passed).count(), 1);
}
