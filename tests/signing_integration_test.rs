mod common;

use common::{signed_client, HMAC_SECRET, PROJECT_ID, PROJECT_KEY};
use reqwest::Method;
use serde_json::json;
use waygpt::signing::{sign, SignedRequestContext};
use waygpt::{ChatCompletionRequest, Message};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn header_str<'a>(request: &'a Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

/// Recompute the signature the way the server does.
fn verify(request: &Request, method: &Method, path: &str) {
    let timestamp: i64 = header_str(request, "x-mb-timestamp").parse().unwrap();
    let nonce = header_str(request, "x-mb-nonce");
    let signature = header_str(request, "x-mb-signature");

    assert_eq!(nonce.len(), 32);
    assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));

    let expected = sign(
        &SignedRequestContext {
            method,
            path,
            body: &request.body,
            timestamp,
            nonce,
        },
        PROJECT_ID,
        HMAC_SECRET,
    );
    assert_eq!(signature, expected);
}

#[tokio::test]
async fn test_signed_chat_completion_verifies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .and(header("x-project-key", PROJECT_KEY))
        .and(header_exists("x-mb-timestamp"))
        .and(header_exists("x-mb-nonce"))
        .and(header_exists("x-mb-signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "signed"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    signed_client(&mock_server)
        .chat_completion(
            ChatCompletionRequest::new(vec![Message::user("Привет")])
                .with_temperature(0.2)
                .with_extra("metadata", json!({"z": 1, "a": 2})),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    verify(&requests[0], &Method::POST, "/api/v1/waygpt/chat/completions");
}

#[tokio::test]
async fn test_signed_get_excludes_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/use-cases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    signed_client(&mock_server).use_cases(true).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("detailed=true"));
    assert!(requests[0].body.is_empty());
    verify(&requests[0], &Method::GET, "/api/v1/waygpt/use-cases");
}

#[tokio::test]
async fn test_retry_regenerates_nonce() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["auto"])))
        .mount(&mock_server)
        .await;

    signed_client(&mock_server).models().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_ne!(
        header_str(&requests[0], "x-mb-nonce"),
        header_str(&requests[1], "x-mb-nonce")
    );
    for request in &requests {
        verify(request, &Method::GET, "/api/v1/waygpt/models");
    }
}

#[tokio::test]
async fn test_unsigned_client_sends_no_signature_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    common::client(&mock_server).models().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-mb-signature").is_none());
    assert!(requests[0].headers.get("x-mb-nonce").is_none());
}
