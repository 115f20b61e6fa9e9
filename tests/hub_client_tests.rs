use std::time::{Duration, Instant};

use agenthub::chat::{AgentSource, ChatConfig, ChatSession, PlainTextRenderer, SendOutcome};
use agenthub::{ChatRequest, Error, HistoryItem, HubClient, Turn};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HubClient {
    HubClient::with_options(Some(server.uri()), Some(Duration::from_secs(5)))
        .expect("client should build")
}

fn quiet_renderer() -> PlainTextRenderer<Vec<u8>> {
    PlainTextRenderer::with_writer(Vec::new(), false).with_timestamps(false)
}

#[tokio::test]
async fn list_agents_keeps_server_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agents": {
                "triage": "Routes requests",
                "research": "Finds sources",
                "business": "Plans and strategy"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agents = client_for(&server)
        .list_agents()
        .await
        .expect("agents should load");

    let names: Vec<_> = agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["triage", "research", "business"]);
    assert_eq!(agents[1].description, "Finds sources");
}

#[tokio::test]
async fn chat_posts_turn_and_decodes_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "agent_name": "triage",
            "message": "hello",
            "history": [],
            "session_id": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-1",
            "history": [
                {"role": "user", "content": "hello"},
                {"type": "handoff", "target": "research"},
                {"role": "assistant", "content": "hi there", "agent": "research"}
            ],
            "response": "hi there",
            "agent": "research"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        agent_name: "triage".to_string(),
        message: "hello".to_string(),
        history: vec![],
        session_id: None,
    };
    let reply = client_for(&server)
        .chat(&request)
        .await
        .expect("chat should succeed");

    assert_eq!(reply.session_id, "s-1");
    assert_eq!(reply.agent, "research");
    assert_eq!(reply.response, "hi there");
    assert_eq!(reply.history.len(), 3);
    assert!(matches!(reply.history[1], HistoryItem::Other(_)));
    assert_eq!(
        reply.history[2].as_turn().map(Turn::text).as_deref(),
        Some("hi there")
    );
}

#[tokio::test]
async fn server_errors_carry_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "agent crashed"})),
        )
        .mount(&server)
        .await;

    let request = ChatRequest {
        agent_name: "triage".to_string(),
        message: "hello".to_string(),
        history: vec![],
        session_id: None,
    };
    let err = client_for(&server)
        .chat(&request)
        .await
        .expect_err("500 should fail");

    assert!(err.is_server_error());
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("agent crashed"));
}

#[tokio::test]
async fn unexpected_status_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_agents()
        .await
        .expect_err("418 should fail");
    assert!(matches!(err, Error::Api { status_code: 418, .. }));
}

#[tokio::test]
async fn delete_session_targets_session_path() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Session not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .delete_session("s-42")
        .await
        .expect("delete should succeed");
    let err = client
        .delete_session("gone")
        .await
        .expect_err("unknown session should fail");
    assert!(err.is_not_found());
    assert!(matches!(
        &err,
        Error::NotFound { resource_type: Some(kind), resource_id: Some(id), .. }
            if kind == "session" && id == "gone"
    ));
    assert!(err.to_string().contains("[ID: gone]"));
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let client = HubClient::with_options(
        Some("http://127.0.0.1:1/".to_string()),
        Some(Duration::from_secs(2)),
    )
    .expect("client should build");

    let err = client.list_agents().await.expect_err("nothing listens there");
    assert!(err.is_connection() || err.is_timeout(), "got {err}");
}

#[tokio::test]
async fn session_round_trip_against_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agents": {"triage": "Routes requests", "research": "Finds sources"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"session_id": null, "history": []})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-7",
            "history": [
                {"role": "user", "content": "find papers"},
                {"role": "assistant", "content": "Here are 3 papers...", "agent": "research"}
            ],
            "response": "Here are 3 papers...",
            "agent": "research"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ChatConfig::new().without_color();
    let mut session = ChatSession::new(client_for(&server), quiet_renderer(), &config);

    assert_eq!(session.load_agents().await, AgentSource::Backend);
    assert_eq!(session.agents().len(), 2);

    assert_eq!(session.send_message("find papers").await, SendOutcome::Replied);
    assert_eq!(session.session_id(), Some("s-7"));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.stats().message_count, 1);

    let cleanup = session.clear_session();
    assert_eq!(cleanup.session_id(), Some("s-7"));
    cleanup.wait().await;

    assert_eq!(session.session_id(), None);
    assert!(session.history().is_empty());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn failed_registry_falls_back_and_failed_chat_shows_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let mut session =
        ChatSession::new(client_for(&server), quiet_renderer(), &ChatConfig::new());

    assert_eq!(session.load_agents().await, AgentSource::Fallback);
    assert_eq!(session.agents().len(), 6);

    assert_eq!(session.send_message("hello").await, SendOutcome::Failed);
    assert_eq!(session.session_id(), None);
    assert!(session.history().is_empty());
    assert_eq!(session.stats().message_count, 0);

    let last = session.transcript().last().expect("error turn shown");
    assert!(last.is_error());
    assert!(
        last.text()
            .starts_with("Error: Could not connect to the server.")
    );
}

#[tokio::test]
async fn history_is_sent_back_exactly_as_received() {
    let server = MockServer::start().await;

    let history = json!([
        {"role": "user", "content": "plan a launch", "agent": null},
        {"type": "function_call", "name": "transfer_to_business", "call_id": "c1", "arguments": "{}"},
        {
            "id": "msg_1",
            "type": "message",
            "status": "completed",
            "role": "assistant",
            "content": [{"type": "output_text", "text": "Here is a plan", "annotations": []}],
            "agent": "business"
        }
    ]);

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"session_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-9",
            "history": history.clone(),
            "response": "Here is a plan",
            "agent": "business"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"session_id": "s-9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-9",
            "history": [],
            "response": "Budget attached",
            "agent": "business"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server), quiet_renderer(), &ChatConfig::new());
    assert_eq!(session.send_message("plan a launch").await, SendOutcome::Replied);
    assert_eq!(session.send_message("add a budget").await, SendOutcome::Replied);

    let requests = server.received_requests().await.expect("recording is on");
    let posts: Vec<serde_json::Value> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| r.body_json().expect("JSON body"))
        .collect();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["history"], json!([]));
    assert_eq!(posts[1]["history"], history);
    assert_eq!(posts[1]["message"], json!("add a budget"));
    assert_eq!(posts[1]["agent_name"], json!("triage"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropped_cleanup_still_deletes_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "s-slow",
            "history": [],
            "response": "hi",
            "agent": "triage"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s-slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server), quiet_renderer(), &ChatConfig::new());
    session.send_message("hello").await;

    let start = Instant::now();
    drop(session.clear_session());
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(session.session_id(), None);

    let mut deleted = false;
    for _ in 0..100 {
        let requests = server.received_requests().await.expect("recording is on");
        if requests.iter().any(|r| r.method.as_str() == "DELETE") {
            deleted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(deleted, "delete should be sent without awaiting the cleanup");
    assert!(start.elapsed() < Duration::from_secs(10));
}
