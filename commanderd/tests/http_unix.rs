//! End-to-end tests over a real Unix socket: the daemon runs in-process,
//! the requests go through the client library.

#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use commander_commands::EchoCommand;
use commander_core::{Command, CommandDescription, CommandResult, HandlerError};
use commanderd::http::{self, AppState};
use commanderd::registry::Registry;
use commanderd::socket;
use commanderd::status::StatusTracker;
use commanderd_client::CommanderClient;
use serde_json::{json, Value};

struct FlakyCommand;

#[async_trait]
impl Command for FlakyCommand {
    type Params = Value;

    fn identifier(&self) -> &str {
        "flaky"
    }

    fn describe(&self) -> CommandDescription {
        CommandDescription {
            name: "Flaky".to_string(),
            command: "flaky".to_string(),
            description: "Always reports an in-band failure".to_string(),
        }
    }

    async fn handle(&self, _params: Self::Params) -> CommandResult {
        Err(HandlerError::new("flaked"))
    }
}

async fn start_daemon(dir: &Path) -> CommanderClient {
    let sock = dir.join("commanderd.sock");

    let mut registry = Registry::new();
    registry.install(EchoCommand).await.expect("install echo");
    registry
        .install(FlakyCommand)
        .await
        .expect("install flaky");

    let state = AppState {
        registry: Arc::new(registry),
        status: Arc::new(StatusTracker::new()),
    };
    let router = http::router(state, None);
    let listener = socket::bind_path(&sock).expect("bind socket");
    tokio::spawn(http::serve(listener, router));

    CommanderClient::new(&sock)
}

#[tokio::test]
async fn dispatch_echo_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = start_daemon(dir.path()).await;

    let reply = client
        .dispatch("echo", json!({ "message": "hi" }))
        .await
        .expect("dispatch");

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({ "success": true, "result": { "message": "hi" } }));
}

#[tokio::test]
async fn listing_describes_both_commands() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = start_daemon(dir.path()).await;

    let listing = client.listing().await.expect("listing");
    assert_eq!(listing["count"], 2);

    let mut commands: Vec<&str> = listing["commands"]
        .as_array()
        .expect("array")
        .iter()
        .map(|description| description["command"].as_str().expect("command"))
        .collect();
    commands.sort_unstable();
    assert_eq!(commands, vec!["echo", "flaky"]);
}

#[tokio::test]
async fn status_tracks_outcomes_across_requests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = start_daemon(dir.path()).await;

    tokio::time::sleep(Duration::from_millis(5)).await;

    // A fresh daemon has served nothing yet.
    let status = client.status().await.expect("status");
    assert_eq!(status["executions"]["total"], 0);
    assert_ne!(status["uptime"], "0.000s");

    // An unknown command is an error payload and one tallied failure.
    let reply = client
        .dispatch("nope", json!({}))
        .await
        .expect("dispatch unknown");
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body["success"], false);

    // A handler-level failure is still a dispatch success.
    let reply = client
        .dispatch("flaky", json!({}))
        .await
        .expect("dispatch flaky");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({ "success": false, "error": "flaked" }));

    let status = client.status().await.expect("status");
    // First status request + flaky dispatch succeeded; unknown command failed.
    assert_eq!(status["executions"]["successful"], 2);
    assert_eq!(status["executions"]["failed"], 1);
    assert_eq!(status["executions"]["total"], 3);
}

#[tokio::test]
async fn malformed_envelope_is_rejected_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = start_daemon(dir.path()).await;

    let reply = client.dispatch_raw("{not json").await.expect("dispatch raw");
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["success"], false);

    // The daemon is still serving.
    let listing = client.listing().await.expect("listing after bad request");
    assert_eq!(listing["count"], 2);
}
