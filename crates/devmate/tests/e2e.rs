// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over a live gateway: real HTTP ingestion, REST polling,
//! and WebSocket dashboard streaming.
//!
//! Each test binds its own ephemeral-port server over an isolated harness,
//! so tests are independent and order-insensitive.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use devmate_core::InboundRequest;
use devmate_gateway::{router, AuthConfig, GatewayState};
use devmate_test_utils::TestHarness;

async fn spawn_gateway(
    harness: &TestHarness,
    bearer_token: Option<String>,
) -> (SocketAddr, mpsc::Receiver<InboundRequest>) {
    let (inbound_tx, inbound_rx) = mpsc::channel(16);
    let state = GatewayState {
        hub: Arc::clone(&harness.hub),
        inbound_tx,
        auth: AuthConfig { bearer_token },
        verify_token: "devmate_token".to_string(),
        idle_timeout: Duration::from_secs(25),
        start_time: std::time::Instant::now(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    (addr, inbound_rx)
}

async fn post_event(addr: SocketAddr, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/event"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn get_json(addr: SocketAddr, path: &str) -> serde_json::Value {
    reqwest::get(format!("http://{addr}{path}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn ingested_message_shows_up_in_stats_and_recent() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    let response = post_event(addr, serde_json::json!({"type": "message", "text": "hi"})).await;
    assert_eq!(response.status(), 200);

    let stats = get_json(addr, "/api/stats").await;
    assert_eq!(stats["total"], 1);

    let events = get_json(addr, "/api/events?limit=1").await;
    let event = &events.as_array().unwrap()[0];
    assert_eq!(event["type"], "message");
    assert_eq!(event["payload"]["text"], "hi");
    assert!(event["id"].as_str().unwrap().starts_with("ev_"));
    assert!(event["ts"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn file_sent_methods_split_counters_over_the_wire() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    post_event(addr, serde_json::json!({"type": "file_sent", "method": "direct"})).await;
    post_event(addr, serde_json::json!({"type": "file_sent", "method": "drive"})).await;
    // Missing method counts as a direct delivery.
    post_event(addr, serde_json::json!({"type": "file_sent"})).await;

    let stats = get_json(addr, "/api/stats").await;
    assert_eq!(stats["direct"], 2);
    assert_eq!(stats["drive"], 1);
    assert_eq!(stats["total"], 0);

    let files = get_json(addr, "/api/files").await;
    assert_eq!(files.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn error_event_increments_failed_only() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    post_event(addr, serde_json::json!({"type": "error", "error": "boom"})).await;

    let stats = get_json(addr, "/api/stats").await;
    assert_eq!(stats["failed"], 1);
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["direct"], 0);
    assert_eq!(stats["drive"], 0);
}

#[tokio::test]
async fn dashboard_gets_snapshot_then_incremental_updates() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    // Two events before the dashboard connects.
    post_event(addr, serde_json::json!({"type": "message", "text": "one"})).await;
    post_event(addr, serde_json::json!({"type": "message", "text": "two"})).await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();

    // First frame is the init snapshot with exactly the prior events.
    let init: serde_json::Value = match ws.next().await.unwrap().unwrap() {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    };
    assert_eq!(init["type"], "init");
    let events = init["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["payload"]["text"], "one");
    assert_eq!(events[1]["payload"]["text"], "two");
    assert_eq!(init["stats"]["total"], 2);

    // The next ingested event arrives incrementally, exactly once, with
    // updated counters.
    post_event(addr, serde_json::json!({"type": "message", "text": "three"})).await;
    let frame: serde_json::Value = match ws.next().await.unwrap().unwrap() {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    };
    assert_eq!(frame["type"], "event");
    assert_eq!(frame["data"]["payload"]["text"], "three");
    assert_eq!(frame["stats"]["total"], 3);

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn disconnected_dashboard_does_not_block_others() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    let (mut ws_dead, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let _ = ws_dead.next().await; // init
    let (mut ws_live, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let _ = ws_live.next().await; // init

    // First dashboard goes away.
    ws_dead.close(None).await.unwrap();
    drop(ws_dead);

    // Ingestion still succeeds and the live dashboard still gets frames.
    let response = post_event(addr, serde_json::json!({"type": "message", "text": "still"})).await;
    assert_eq!(response.status(), 200);

    let frame: serde_json::Value = match ws_live.next().await.unwrap().unwrap() {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    };
    assert_eq!(frame["type"], "event");
    assert_eq!(frame["data"]["payload"]["text"], "still");

    // And the event is durably retrievable.
    let events = get_json(addr, "/api/events").await;
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_message_reaches_agent_channel_and_dashboard() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, mut inbound_rx) = spawn_gateway(&harness, None).await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let _ = ws.next().await; // init

    let payload = serde_json::json!({
        "entry": [{
            "changes": [{
                "value": {
                    "messages": [{
                        "from": "+15551234",
                        "type": "text",
                        "text": {"body": "find my report"}
                    }]
                }
            }]
        }]
    });
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook/whatsapp"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // The agent loop would pick this up.
    let request = inbound_rx.recv().await.unwrap();
    assert_eq!(request.sender, "+15551234");
    assert_eq!(request.text, "find my report");

    // The dashboard saw the message event live.
    let frame: serde_json::Value = match ws.next().await.unwrap().unwrap() {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    };
    assert_eq!(frame["type"], "event");
    assert_eq!(frame["data"]["type"], "message");
    assert_eq!(frame["data"]["payload"]["from"], "+15551234");
}

#[tokio::test]
async fn sqlite_backed_pipeline_round_trips() {
    let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, None).await;

    post_event(addr, serde_json::json!({"type": "message", "text": "durable"})).await;
    post_event(addr, serde_json::json!({"type": "file_sent", "method": "drive"})).await;

    let stats = get_json(addr, "/api/stats").await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["drive"], 1);

    let conversations = get_json(addr, "/api/conversations").await;
    assert_eq!(conversations.as_array().unwrap().len(), 1);

    harness.close().await.unwrap();
}

#[tokio::test]
async fn ingestion_auth_is_enforced_end_to_end() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (addr, _rx) = spawn_gateway(&harness, Some("ingest-secret".to_string())).await;

    let response = post_event(addr, serde_json::json!({"type": "message"})).await;
    assert_eq!(response.status(), 401);

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/event"))
        .bearer_auth("ingest-secret")
        .json(&serde_json::json!({"type": "message"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let stats = get_json(addr, "/api/stats").await;
    assert_eq!(stats["total"], 1);
}
