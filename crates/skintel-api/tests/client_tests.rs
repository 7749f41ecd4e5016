use pretty_assertions::assert_eq;
use serde_json::json;
use skintel_api::{ApiError, SkintelClient};
use skintel_session::{run_turn, ConversationManager, MemoryStore, SessionConfig};
use skintel_types::{Exchange, ASSISTANT_UNAVAILABLE_MESSAGE};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_chat_success(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": reply,
            "timestamp": "2024-05-01T12:00:00"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_chat_sends_message_history_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .and(header("authorization", "Bearer t0k"))
        .and(body_json(json!({
            "message": "What about oily skin?",
            "conversation_history": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello!" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Use a gel cleanser.",
            "timestamp": "2024-05-01T12:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SkintelClient::new(server.uri()).with_token("t0k");
    let history = vec![Exchange::user("Hi"), Exchange::assistant("Hello!")];
    let reply = client.chat("What about oily skin?", &history).await.unwrap();

    assert!(reply.success);
    assert_eq!(reply.message, "Use a gel cleanser.");
}

#[tokio::test]
async fn test_first_message_has_no_history_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .and(body_json(json!({ "message": "Hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Hello!",
            "timestamp": "2024-05-01T12:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SkintelClient::new(server.uri());
    assert_eq!(client.chat("Hi", &[]).await.unwrap().message, "Hello!");
}

#[tokio::test]
async fn test_unauthorized_is_reported_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid token" })))
        .mount(&server)
        .await;

    let client = SkintelClient::new(server.uri()).with_token("expired");
    match client.chat("Hi", &[]).await {
        Err(ApiError::Unauthorized(detail)) => assert_eq!(detail, "Invalid token"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "quota exhausted" })))
        .mount(&server)
        .await;

    let err = SkintelClient::new(server.uri()).chat("Hi", &[]).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "backend returned 500: quota exhausted");
}

#[tokio::test]
async fn test_unsuccessful_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "",
            "timestamp": "2024-05-01T12:00:00",
            "error": "model unavailable"
        })))
        .mount(&server)
        .await;

    let err = SkintelClient::new(server.uri()).chat("Hi", &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Unsuccessful(ref e) if e == "model unavailable"));
}

#[tokio::test]
async fn test_status_decodes_quota() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chatbot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quota_status": {
                "requests_remaining": 0,
                "requests_made": 50,
                "daily_limit": 50,
                "retry_after": 0,
                "can_make_request": false
            },
            "service_available": false,
            "estimated_reset_time": "Daily reset at midnight UTC"
        })))
        .mount(&server)
        .await;

    let status = SkintelClient::new(server.uri()).status().await.unwrap();
    assert!(!status.service_available);
    assert_eq!(status.quota_status.daily_limit, 50);
    assert_eq!(
        status.estimated_reset_time.as_deref(),
        Some("Daily reset at midnight UTC")
    );
}

#[tokio::test]
async fn test_skin_advice_posts_concerns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skin-advice"))
        .and(body_partial_json(json!({ "concerns": ["acne", "dryness"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "advice": "Cleanse gently.",
            "concerns_analyzed": ["acne", "dryness"],
            "timestamp": "2024-05-01T12:00:00"
        })))
        .mount(&server)
        .await;

    let concerns = vec!["acne".to_string(), "dryness".to_string()];
    let advice = SkintelClient::new(server.uri())
        .skin_advice(&concerns, None)
        .await
        .unwrap();
    assert_eq!(advice.advice.as_deref(), Some("Cleanse gently."));
}

#[tokio::test]
async fn test_turns_through_client_keep_logs_consistent() {
    let server = MockServer::start().await;
    mock_chat_success(&server, "Hello!").await;

    let client = SkintelClient::new(server.uri());
    let mut manager = ConversationManager::new(MemoryStore::new(), SessionConfig::default());

    let outcome = run_turn(&mut manager, &client, "Hi").await.unwrap();
    assert!(outcome.is_answered());
    assert_eq!(
        manager.conversation_history(),
        &[Exchange::user("Hi"), Exchange::assistant("Hello!")]
    );

    // Backend goes away: the user message stays, the exchange log does not grow
    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = run_turn(&mut manager, &client, "Still there?").await.unwrap();
    assert!(!outcome.is_answered());
    assert_eq!(outcome.message().content(), ASSISTANT_UNAVAILABLE_MESSAGE);
    assert_eq!(manager.conversation_history().len(), 2);
    assert_eq!(manager.messages().len(), 5);
}
