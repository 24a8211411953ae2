//! End-to-end tests for the HTTP transport against an in-process chat server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use tutor_bridge::classifier::ReplyClassifier;
use tutor_bridge::config::TransportConfig;
use tutor_bridge::transport::{ChatTransport, TransportError, NOT_UNDERSTOOD_TEXT};
use tutor_bridge::{BridgeState, ChatBridge, ERROR_REPLY_TEXT, Exchange};

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn bridge_for(base_url: String, timeout_seconds: Option<u64>) -> ChatBridge {
    let transport = ChatTransport::build(&TransportConfig {
        kind: "http".into(),
        base_url,
        chat_path: "/api/chat".into(),
        reset_path: "/api/reset".into(),
        timeout_seconds,
    })
    .unwrap();
    ChatBridge::new(transport, ReplyClassifier::default())
}

/// Server whose `/api/chat` always answers with `status` and `body`.
async fn fixed_reply(status: StatusCode, body: Value) -> ChatBridge {
    let app = Router::new().route(
        "/api/chat",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    bridge_for(spawn_server(app).await, Some(5))
}

#[tokio::test]
async fn posts_message_with_stream_false_and_json_header() {
    let seen: Arc<Mutex<Vec<(Option<String>, Value)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let app = Router::new().route(
        "/api/chat",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push((content_type, body));
                Json(json!({ "response": "ok" }))
            }
        }),
    );
    let bridge = bridge_for(spawn_server(app).await, Some(5));

    assert_eq!(bridge.send_message("what is 1/2 + 1/4?").await, "ok");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "exactly one attempt per call");
    assert_eq!(seen[0].0.as_deref(), Some("application/json"));
    assert_eq!(seen[0].1, json!({ "message": "what is 1/2 + 1/4?", "stream": false }));
}

#[tokio::test]
async fn response_field_sets_next_button() {
    let text = "Great job! Let's move on to the next topic.";
    let bridge = fixed_reply(StatusCode::OK, json!({ "response": text })).await;
    assert_eq!(bridge.send_message("done").await, text);
    assert!(bridge.show_next_button().await);
}

#[tokio::test]
async fn message_field_used_without_response() {
    let bridge = fixed_reply(StatusCode::OK, json!({ "message": "Try again." })).await;
    assert_eq!(bridge.send_message("2").await, "Try again.");
}

#[tokio::test]
async fn empty_object_yields_not_understood() {
    let bridge = fixed_reply(StatusCode::OK, json!({})).await;
    let exchange = bridge.exchange("hm").await;
    assert!(!exchange.is_degraded());
    assert_eq!(exchange.text(), NOT_UNDERSTOOD_TEXT);
    assert!(!bridge.show_next_button().await);
}

#[tokio::test]
async fn quiz_reply_populates_question() {
    let text = "Which is correct? A) Paris B) London C) Rome";
    let bridge = fixed_reply(StatusCode::OK, json!({ "response": text, "state": "QUIZ" })).await;
    bridge.send_message("quiz me").await;

    let quiz = bridge.current_quiz_question().await.unwrap();
    assert_eq!(quiz.question, text);
    assert_eq!(quiz.options, vec!['A', 'B', 'C']);
    // The server's own stage label is not mirrored locally.
    assert_eq!(bridge.state().await.conversation_state, "WELCOME");
}

#[tokio::test]
async fn server_error_degrades_even_with_reply_body() {
    let bridge = fixed_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "response": "next please", "error": "boom" }),
    )
    .await;

    match bridge.exchange("hello").await {
        Exchange::Degraded { text, error: TransportError::Status { status, body } } => {
            assert_eq!(text, ERROR_REPLY_TEXT);
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected degraded status error, got {other:?}"),
    }
    assert_eq!(bridge.state().await, BridgeState::default());
}

#[tokio::test]
async fn non_json_body_degrades() {
    let app = Router::new().route("/api/chat", post(|| async { "<html>oops</html>" }));
    let bridge = bridge_for(spawn_server(app).await, Some(5));

    let exchange = bridge.exchange("hello").await;
    assert!(matches!(exchange, Exchange::Degraded { error: TransportError::Decode(_), .. }));
    assert_eq!(exchange.into_text(), ERROR_REPLY_TEXT);
}

#[tokio::test]
async fn missing_route_degrades() {
    let bridge = bridge_for(spawn_server(Router::new()).await, Some(5));
    assert_eq!(bridge.send_message("hello").await, ERROR_REPLY_TEXT);
}

#[tokio::test]
async fn configured_timeout_bounds_hung_server() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let bridge = bridge_for(spawn_server(app).await, Some(1));

    let exchange = bridge.exchange("hello").await;
    assert!(matches!(exchange, Exchange::Degraded { error: TransportError::Request(_), .. }));
}

#[tokio::test]
async fn reply_without_quiz_clears_previous_quiz() {
    let replies = Arc::new(Mutex::new(vec![
        json!({ "response": "Plain explanation." }),
        json!({ "response": "A) 1/2 B) 1/3" }),
    ]));
    let app = Router::new().route(
        "/api/chat",
        post(move || {
            let replies = replies.clone();
            async move { Json(replies.lock().unwrap().pop().unwrap_or_else(|| json!({}))) }
        }),
    );
    let bridge = bridge_for(spawn_server(app).await, Some(5));

    bridge.send_message("quiz").await;
    assert!(bridge.current_quiz_question().await.is_some());
    bridge.send_message("explain").await;
    assert!(bridge.current_quiz_question().await.is_none());
}

#[tokio::test]
async fn reset_posts_to_reset_endpoint() {
    let hits = Arc::new(Mutex::new(0u32));
    let counter = hits.clone();
    let app = Router::new()
        .route("/api/chat", post(|| async { Json(json!({ "response": "next: A) x B) y" })) }))
        .route(
            "/api/reset",
            post(move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Json(json!({ "status": "success", "message": "Conversation reset" }))
                }
            }),
        );
    let bridge = bridge_for(spawn_server(app).await, Some(5));

    bridge.send_message("go").await;
    assert!(bridge.show_next_button().await);

    bridge.reset().await.unwrap();
    assert_eq!(*hits.lock().unwrap(), 1);
    assert_eq!(bridge.state().await, BridgeState::default());
}

#[tokio::test]
async fn concurrent_sends_all_resolve() {
    let bridge = Arc::new(fixed_reply(StatusCode::OK, json!({ "response": "continue" })).await);
    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.send_message(&format!("msg {i}")).await })
        })
        .collect();
    for t in tasks {
        assert_eq!(t.await.unwrap(), "continue");
    }
    assert!(bridge.show_next_button().await);
}
