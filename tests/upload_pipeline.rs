use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use asset_upload_relay::function::{handle_event, FunctionEvent};
use asset_upload_relay::roblox::PollSettings;
use asset_upload_relay::types::{
    MSG_MISSING_CONTENT_TYPE, MSG_MISSING_FIELDS, MSG_POLL_INCOMPLETE, MSG_UPLOAD_REJECTED,
};
use asset_upload_relay::{create_router, AppState, Config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "relay-test-boundary";

fn state_for(base_url: &str, polling: PollSettings) -> AppState {
    let mut config = Config::default();
    config.upstream.base_url = base_url.to_string();
    AppState::new(config).unwrap().with_polling(polling)
}

fn fast_polling() -> PollSettings {
    PollSettings::new(Duration::from_secs(5), Duration::from_millis(30))
}

fn multipart_body(parts: &[String]) -> String {
    let mut out = String::new();
    for part in parts {
        out.push_str(&format!("--{}\r\n{}\r\n", BOUNDARY, part));
    }
    out.push_str(&format!("--{}--\r\n", BOUNDARY));
    out
}

fn text_part(name: &str, value: &str) -> String {
    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
}

fn file_part() -> String {
    "Content-Disposition: form-data; name=\"fileContent\"; filename=\"shirt.png\"\r\nContent-Type: image/png\r\n\r\nPNG-BYTES".to_string()
}

fn full_upload_body() -> String {
    multipart_body(&[
        text_part("apiKey", "test-key"),
        text_part("userId", "1234"),
        text_part("displayName", "Cool Shirt"),
        text_part("description", "A very cool shirt"),
        file_part(),
    ])
}

fn upload_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/.netlify/functions/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn non_post_method_is_405() {
    let state = state_for("http://127.0.0.1:9", fast_polling());

    for method in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(method)
            .uri("/api/upload")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(state.clone(), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn missing_content_type_is_400() {
    let state = state_for("http://127.0.0.1:9", fast_polling());
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .body(Body::from(full_upload_body()))
        .unwrap();

    let (status, body) = send(state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MSG_MISSING_CONTENT_TYPE);
}

#[tokio::test]
async fn missing_required_fields_make_no_outbound_calls() {
    let mut server = mockito::Server::new_async().await;
    let upload_mock = server
        .mock("POST", "/assets/v1/assets")
        .expect(0)
        .create_async()
        .await;
    let poll_mock = server
        .mock("GET", mockito::Matcher::Regex("^/assets/v1/operations/".to_string()))
        .expect(0)
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let cases = [
        multipart_body(&[text_part("userId", "1"), file_part()]),
        multipart_body(&[text_part("apiKey", "k"), file_part()]),
        multipart_body(&[text_part("apiKey", "k"), text_part("userId", "1")]),
    ];

    for body in cases {
        let (status, json) = send(state.clone(), upload_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], MSG_MISSING_FIELDS);
    }

    upload_mock.assert_async().await;
    poll_mock.assert_async().await;
}

#[tokio::test]
async fn upstream_rejection_returns_upstream_status_without_polling() {
    let mut server = mockito::Server::new_async().await;
    let upload_mock = server
        .mock("POST", "/assets/v1/assets")
        .match_header("x-api-key", "test-key")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":"PERMISSION_DENIED","message":"Insufficient scope"}"#)
        .create_async()
        .await;
    let poll_mock = server
        .mock("GET", mockito::Matcher::Regex("^/assets/v1/operations/".to_string()))
        .expect(0)
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let (status, body) = send(state, upload_request(full_upload_body())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], MSG_UPLOAD_REJECTED);
    assert_eq!(body["robloxResponse"]["code"], "PERMISSION_DENIED");
    upload_mock.assert_async().await;
    poll_mock.assert_async().await;
}

#[tokio::test]
async fn missing_operation_id_is_a_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/assets/v1/assets")
        .with_status(200)
        .with_body(r#"{"path":"operations/"}"#)
        .create_async()
        .await;
    let poll_mock = server
        .mock("GET", mockito::Matcher::Regex("^/assets/v1/operations/".to_string()))
        .expect(0)
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let (status, body) = send(state, upload_request(full_upload_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["robloxResponse"], json!({"path": "operations/"}));
    poll_mock.assert_async().await;
}

#[tokio::test]
async fn successful_upload_polls_until_done() {
    let mut server = mockito::Server::new_async().await;
    let upload_mock = server
        .mock("POST", "/assets/v1/assets")
        .match_header("x-api-key", "test-key")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::Regex(r#""userId":1234"#.to_string()),
            mockito::Matcher::Regex(r#""displayName":"Cool Shirt""#.to_string()),
            mockito::Matcher::Regex("PNG-BYTES".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"path":"operations/op-42","operationId":"op-42","done":false}"#)
        .create_async()
        .await;

    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();
    let _poll = server
        .mock("GET", "/assets/v1/operations/op-42")
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                br#"{"path":"operations/op-42","done":false}"#.to_vec()
            } else {
                br#"{"path":"operations/op-42","done":true,"response":{"assetId":"987654","displayName":"Cool Shirt"}}"#.to_vec()
            }
        })
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let (status, body) = send(state, upload_request(full_upload_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["assetId"], "987654");
    assert_eq!(body["operationId"], "op-42");
    assert_eq!(body["name"], "Cool Shirt");
    assert_eq!(body["description"], "A very cool shirt");
    assert_eq!(polls.load(Ordering::SeqCst), 3);
    upload_mock.assert_async().await;
}

#[tokio::test]
async fn poll_timeout_is_500_with_last_payload() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/assets/v1/assets")
        .with_status(200)
        .with_body(r#"{"operationId":"op-slow"}"#)
        .create_async()
        .await;
    let _poll = server
        .mock("GET", "/assets/v1/operations/op-slow")
        .with_status(200)
        .with_body(r#"{"path":"operations/op-slow","done":false}"#)
        .create_async()
        .await;
    let polling = PollSettings::new(Duration::from_millis(300), Duration::from_millis(50));
    let state = state_for(&server.url(), polling);

    let (status, body) = send(state, upload_request(full_upload_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], MSG_POLL_INCOMPLETE);
    assert_eq!(body["robloxPollingResponse"]["done"], false);
}

#[tokio::test]
async fn done_without_asset_id_is_500() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/assets/v1/assets")
        .with_status(200)
        .with_body(r#"{"operationId":"op-odd"}"#)
        .create_async()
        .await;
    let _poll = server
        .mock("GET", "/assets/v1/operations/op-odd")
        .with_status(200)
        .with_body(r#"{"done":true,"response":{}}"#)
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let (status, body) = send(state, upload_request(full_upload_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["robloxPollingResponse"], json!({"done": true, "response": {}}));
}

#[tokio::test]
async fn malformed_part_disposition_is_500_with_parse_error() {
    let state = state_for("http://127.0.0.1:9", fast_polling());
    let body = multipart_body(&[
        text_part("apiKey", "k"),
        "Content-Disposition: form-data; filename=\"shirt.png\"\r\nContent-Type: image/png\r\n\r\nPNG".to_string(),
    ]);

    let (status, json) = send(state, upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn non_integer_user_id_is_400() {
    let state = state_for("http://127.0.0.1:9", fast_polling());
    let body = multipart_body(&[
        text_part("apiKey", "k"),
        text_part("userId", "not-a-number"),
        file_part(),
    ]);

    let (status, _) = send(state, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn function_event_with_base64_body_completes_upload() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/assets/v1/assets")
        .with_status(200)
        .with_body(r#"{"operationId":"op-fn"}"#)
        .create_async()
        .await;
    let _poll = server
        .mock("GET", "/assets/v1/operations/op-fn")
        .with_status(200)
        .with_body(r#"{"done":true,"response":{"assetId":"42"}}"#)
        .create_async()
        .await;
    let state = state_for(&server.url(), fast_polling());

    let event: FunctionEvent = serde_json::from_value(json!({
        "httpMethod": "POST",
        "headers": {"content-type": format!("multipart/form-data; boundary={}", BOUNDARY)},
        "body": STANDARD.encode(full_upload_body()),
        "isBase64Encoded": true,
    }))
    .unwrap();

    let response = handle_event(&state, event).await;

    assert_eq!(response.status_code, 200);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["assetId"], "42");
    assert_eq!(body["operationId"], "op-fn");
    assert_eq!(body["name"], "Cool Shirt");
}

#[tokio::test]
async fn health_reports_upstream() {
    let state = state_for("http://upstream.test", fast_polling());
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(state, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], "http://upstream.test");
}
