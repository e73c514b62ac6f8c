mod common;

use common::{client, fast_retry, options, PROJECT_KEY};
use serde_json::json;
use std::time::{Duration, Instant};
use waygpt::{
    ChatCompletionRequest, ImageGenerationRequest, Message, VideoGenerationRequest,
    WayGptClient, WidgetTokenRequest,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_successful_chat_completion() {
    let mock_server = MockServer::start().await;

    let response_json = json!({
        "id": "chatcmpl-1",
        "choices": [{"message": {"role": "assistant", "content": "Hello! How can I help?"}}]
    });

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .and(header("x-project-key", PROJECT_KEY))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_json))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .chat_completion(ChatCompletionRequest::new(vec![Message::user("Hello!")]))
        .await
        .unwrap();

    assert_eq!(response["choices"][0]["message"]["content"], "Hello! How can I help?");
}

#[tokio::test]
async fn test_optional_fields_are_omitted_on_the_wire() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .and(body_json(json!({
            "model": "auto",
            "messages": [{"role": "user", "content": "Hi"}],
            "use_case": "support_chat"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .chat_completion(
            ChatCompletionRequest::new(vec![Message::user("Hi")]).with_use_case("support_chat"),
        )
        .await
        .unwrap();
    assert_eq!(response["ok"], true);

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("temperature").is_none());
    assert!(body.get("max_tokens").is_none());
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let mock_server = MockServer::start().await;

    // First two requests fail with 503
    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    // Third request succeeds
    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "after-retry"})))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .chat_completion(ChatCompletionRequest::new(vec![Message::user("retry")]))
        .await
        .unwrap();

    assert_eq!(response["id"], "after-retry");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_no_retry_on_400() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "messages must not be empty"})))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .chat_completion(ChatCompletionRequest::new(vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code, Some(400));
    assert_eq!(err.message, "messages must not be empty");
    assert!(err.is_client_error());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_return_last_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"detail": "rate limited"})))
        .mount(&mock_server)
        .await;

    let client = WayGptClient::new(options(&mock_server).with_max_retries(1)).unwrap();
    let err = client.models().await.unwrap_err();

    assert_eq!(err.status_code, Some(429));
    assert_eq!(err.message, "rate limited");
    assert!(err.is_rate_limited());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_retry_after_header_is_honoured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["auto"])))
        .mount(&mock_server)
        .await;

    // Without the header the first retry would wait 30 seconds
    let slow = fast_retry(1)
        .with_initial_interval(Duration::from_secs(30))
        .with_max_interval(Duration::from_secs(60));
    let client = WayGptClient::new(options(&mock_server).with_retry_policy(slow)).unwrap();

    let started = Instant::now();
    assert_eq!(client.models().await.unwrap(), vec!["auto".to_string()]);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_error_normalization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/media/jobs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/media/jobs/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let client = WayGptClient::new(options(&mock_server).with_max_retries(0)).unwrap();

    let err = client.get_media_job("missing").await.unwrap_err();
    assert_eq!(err.status_code, Some(404));
    assert_eq!(err.message, "not found");
    assert_eq!(err.payload, Some(json!({"detail": "not found"})));

    let err = client.get_media_job("broken").await.unwrap_err();
    assert_eq!(err.status_code, Some(500));
    assert_eq!(err.message, "upstream exploded");
    assert_eq!(err.payload, None);
}

#[tokio::test]
async fn test_unauthorized_project_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "invalid project key"})))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).models().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "invalid project key");
}

#[tokio::test]
async fn test_network_error_has_no_status() {
    let client = WayGptClient::new(
        waygpt::ClientOptions::new()
            .with_base_url("http://127.0.0.1:1")
            .with_project_key(PROJECT_KEY)
            .with_signing(false)
            .with_max_retries(0),
    )
    .unwrap();

    let err = client.models().await.unwrap_err();
    assert_eq!(err.status_code, None);
    assert!(err.is_network());
    assert!(err.message.starts_with("Network error"));
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/models/full"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).models_full().await.unwrap_err();
    assert_eq!(err.status_code, None);
    assert!(err.message.starts_with("Failed to decode response"));
    assert_eq!(err.payload, Some(json!("<html>oops</html>")));
}

#[tokio::test]
async fn test_image_generation_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/images/generations"))
        .and(body_json(json!({"prompt": "a red fox", "size": "1024x1024", "n": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"url": "https://img/1.png"}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .image_generation(ImageGenerationRequest::new("a red fox"))
        .await
        .unwrap();
    assert_eq!(response["data"][0]["url"], "https://img/1.png");
}

#[tokio::test]
async fn test_blank_prompt_sends_nothing() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);

    let err = client
        .image_generation(ImageGenerationRequest::new("   "))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, None);

    let err = client
        .video_generation(VideoGenerationRequest::new(""))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, None);

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_video_job_lifecycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/videos/generations"))
        .and(body_json(json!({"prompt": "ocean waves", "duration": 5})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-7", "status": "queued"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/waygpt/media/jobs/job-7/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "cancelled"})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let job = client
        .video_generation(VideoGenerationRequest::new("ocean waves").with_duration(5))
        .await
        .unwrap();
    assert_eq!(job["job_id"], "job-7");

    let cancelled = client.cancel_media_job("job-7").await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[1].body.is_empty());
}

#[tokio::test]
async fn test_use_cases_detailed_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/use-cases"))
        .and(query_param("detailed", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"key": "support_chat", "config": {}}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/waygpt/use-cases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"key": "support_chat"}])))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let detailed = client.use_cases(true).await.unwrap();
    assert!(detailed[0].get("config").is_some());

    let plain = client.use_cases(false).await.unwrap();
    assert!(plain[0].get("config").is_none());
}

#[tokio::test]
async fn test_widget_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/widget/token"))
        .and(body_json(json!({"ttl_seconds": 600, "site_domain": "shop.example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "wt_1", "expires_in": 600})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = client(&mock_server)
        .create_widget_token(WidgetTokenRequest::default().with_site_domain("shop.example.com"))
        .await
        .unwrap();
    assert_eq!(token["token"], "wt_1");
}
