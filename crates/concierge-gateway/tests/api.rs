// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests against a gateway bound to an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use concierge_agent::{ChatService, Dispatcher, StreamRelay};
use concierge_config::model::{AuthConfig, StorageConfig};
use concierge_core::{ProviderKind, StorageAdapter};
use concierge_gateway::{router, Accounts, GatewayState};
use concierge_storage::SqliteStorage;
use concierge_test_utils::MockProvider;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestGateway {
    base: String,
    client: reqwest::Client,
    _dir: TempDir,
}

impl TestGateway {
    async fn start(gemini: MockProvider, deepseek: MockProvider) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("gw.db").to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();

        let dispatcher = Arc::new(Dispatcher::new(Arc::new(gemini), Arc::new(deepseek)));
        let relay = StreamRelay::new(dispatcher.clone(), 10, Duration::from_millis(1));
        let chat = Arc::new(ChatService::new(dispatcher, relay, storage.clone()));
        let accounts = Arc::new(Accounts::new(
            storage,
            AuthConfig {
                token_bytes: 32,
                memory_cost_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        ));

        let app = router(GatewayState::new(chat, accounts));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://127.0.0.1:{}", addr.port()),
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    async fn default() -> Self {
        Self::start(
            MockProvider::new(ProviderKind::Gemini),
            MockProvider::new(ProviderKind::DeepSeek),
        )
        .await
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn register(&self, username: &str) -> (i64, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                json!({"username": username, "email": format!("{username}@example.com"), "password": "pw-123"}),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true, "{body}");
        (
            body["user_id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn chat_routes_records_and_shows_history() {
    let gw = TestGateway::start(
        MockProvider::with_responses(ProviderKind::Gemini, vec!["Use a debugger."]),
        MockProvider::new(ProviderKind::DeepSeek),
    )
    .await;

    let (status, body) = gw
        .post("/chat", json!({"query": "debug my python code", "session_id": "s1"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["agent_used"], "Code Assistant");
    assert_eq!(body["model"], "gemini-1.5-flash-8b");
    assert_eq!(body["response"], "Use a debugger.");
    assert_eq!(body["confidence"], 0.85);
    assert_eq!(body["cost_estimate"], 0.0);

    let (status, history) = gw.get("/chat/history?limit=10&session_id=s1").await;
    assert_eq!(status, 200);
    assert_eq!(history["success"], true);
    assert_eq!(history["count"], 1);
    assert_eq!(history["history"][0]["agent_used"], "Code Assistant");
    assert_eq!(history["history"][0]["query"], "debug my python code");

    let (_, other) = gw.get("/chat/history?session_id=nope").await;
    assert_eq!(other["count"], 0);
}

#[tokio::test]
async fn blank_query_is_a_bad_request_on_both_paths() {
    let gw = TestGateway::default().await;

    let (status, body) = gw.post("/chat", json!({"query": "   "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Query cannot be empty.");

    let (status, body) = gw.post("/chat/stream", json!({"query": ""})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Query cannot be empty.");

    let (_, history) = gw.get("/chat/history").await;
    assert_eq!(history["count"], 0);
}

#[tokio::test]
async fn stream_sends_start_deltas_and_complete() {
    let answer = (1..=15).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let gw = TestGateway::start(
        MockProvider::with_responses(ProviderKind::Gemini, vec![answer.as_str()]),
        MockProvider::new(ProviderKind::DeepSeek),
    )
    .await;

    let resp = gw
        .client
        .post(format!("{}/chat/stream", gw.base))
        .json(&json!({"query": "how to plant tomatoes"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let text = resp.text().await.unwrap();

    let events: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        json!({"event": "start", "agent": "Task Helper", "model": "gemini-1.5-flash-8b"})
    );
    assert_eq!(events[1]["content"], "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10");
    assert_eq!(events[2]["content"], "w11 w12 w13 w14 w15");
    assert_eq!(events[3], json!({"event": "complete", "ok": true}));
}

#[tokio::test]
async fn models_status_lists_only_configured_providers() {
    let gw = TestGateway::start(
        MockProvider::new(ProviderKind::Gemini).unconfigured(),
        MockProvider::new(ProviderKind::DeepSeek),
    )
    .await;

    let (status, body) = gw.get("/models/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);
    assert_eq!(
        body["models"][0],
        json!({"model": "deepseeker-1.0", "status": "available", "provider": "deepseek"})
    );
    assert!(body["time"].is_string());
}

#[tokio::test]
async fn register_login_verify() {
    let gw = TestGateway::default().await;
    let (user_id, token) = gw.register("ada").await;

    let (_, dup) = gw
        .post(
            "/auth/register",
            json!({"username": "ada", "email": "other@example.com", "password": "x"}),
        )
        .await;
    assert_eq!(dup["success"], false);
    assert_eq!(dup["message"], "Username or email already exists");

    let (_, bad) = gw
        .post("/auth/login", json!({"username": "ada", "password": "wrong"}))
        .await;
    assert_eq!(bad["success"], false);
    assert_eq!(bad["message"], "Invalid username or password");

    let (_, good) = gw
        .post("/auth/login", json!({"username": "ada", "password": "pw-123"}))
        .await;
    assert_eq!(good["success"], true);
    assert_eq!(good["message"], "Login successful");
    assert_eq!(good["user_id"], user_id);
    assert_ne!(good["token"].as_str().unwrap(), token);

    let (_, verified) = gw.get(&format!("/auth/verify?token={token}")).await;
    assert_eq!(verified["success"], true);
    assert_eq!(verified["user"]["username"], "ada");
    assert!(verified["user"].get("password_hash").is_none());

    let (_, rejected) = gw.get("/auth/verify?token=bogus").await;
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["message"], "Invalid or expired session");
}

#[tokio::test]
async fn analytics_require_the_owners_token() {
    let gw = TestGateway::default().await;
    let (ada, ada_token) = gw.register("ada").await;
    let (bob, _) = gw.register("bob").await;

    let (status, body) = gw
        .get(&format!("/analytics/user/{bob}?token={ada_token}"))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = gw
        .post("/chat", json!({"query": "research solar panels", "token": ada_token}))
        .await;
    assert_eq!(status, 200);

    let (status, body) = gw
        .get(&format!("/analytics/user/{ada}?token={ada_token}"))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["analytics"]["stats"]["total_chats"], 1);
    assert_eq!(
        body["analytics"]["agent_usage"][0]["agent_used"],
        "Research Assistant"
    );

    let (status, body) = gw
        .get(&format!("/analytics/report/{ada}?token={ada_token}&days=7"))
        .await;
    assert_eq!(status, 200);
    let report = &body["report"];
    assert_eq!(report["period_days"], 7);
    assert_eq!(report["summary"]["total_conversations"], 1);
    assert_eq!(report["summary"]["most_used_agent"], "Research Assistant");
    assert_eq!(report["user_info"]["id"], ada);
}

#[tokio::test]
async fn chat_with_unknown_token_is_unauthorized() {
    let gw = TestGateway::default().await;
    let (status, body) = gw
        .post("/chat", json!({"query": "hello", "token": "expired"}))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid or expired session");
}

#[tokio::test]
async fn health_reports_version() {
    let gw = TestGateway::default().await;
    let (status, body) = gw.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
