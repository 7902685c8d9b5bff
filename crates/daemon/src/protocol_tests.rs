// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use serde_json::json;
use similar_asserts::assert_eq;
use std::path::Path;
use wsd_core::test_support::git_spec;
use wsd_core::{FailureCode, InitOutcome};

#[test]
fn init_request_wire_shape() {
    let request = Request::Init {
        spec: git_spec("ws-1", "https://example.com/r.git", Path::new("/workspace")),
    };

    let value: serde_json::Value = decode(&encode(&request).unwrap()).unwrap();

    assert_eq!(value["type"], "Init");
    assert_eq!(value["spec"]["workspace_id"], "ws-1");
    assert_eq!(value["spec"]["target_path"], "/workspace");
    assert_eq!(decode::<Request>(&encode(&request).unwrap()).unwrap(), request);
}

#[test]
fn unit_requests_are_tagged_objects() {
    assert_eq!(
        serde_json::to_value(Request::Shutdown).unwrap(),
        json!({ "type": "Shutdown" })
    );
    assert_eq!(
        serde_json::to_value(Request::SetMaintenance { enabled: true }).unwrap(),
        json!({ "type": "SetMaintenance", "enabled": true })
    );
}

#[test]
fn status_response_nests_workspace_state() {
    let response = Response::Status {
        status: WorkspaceStatus::Initializing { attempt: 2 },
    };
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "type": "Status", "status": { "state": "initializing", "attempt": 2 } })
    );
}

#[test]
fn ready_response_carries_the_wire_message() {
    let message = WorkspaceReadyMessage::new(
        WorkspaceId::new("ws-1"),
        &InitOutcome::failed(FailureCode::CloneFailed, "unreachable"),
    );
    let response = Response::Ready { message };

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "type": "Ready",
            "message": {
                "workspaceID": "ws-1",
                "outcome": {
                    "succeeded": false,
                    "failureReason": { "code": "clone-failed", "message": "unreachable" }
                },
                "metadata": {}
            }
        })
    );
}

#[test]
fn deferred_response_has_reason() {
    let bytes = encode(&Response::Deferred {
        reason: "under maintenance".to_string(),
    })
    .unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"type":"Deferred","reason":"under maintenance"}"#
    );
}

#[tokio::test]
async fn framing_roundtrip_over_a_stream() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let request = Request::WaitReady {
        id: WorkspaceId::new("ws-1"),
        timeout_ms: 250,
    };

    write_message(&mut client, &encode(&request).unwrap())
        .await
        .unwrap();
    let received = read_request(&mut server, DEFAULT_TIMEOUT).await.unwrap();

    assert_eq!(received, request);
}

#[tokio::test]
async fn length_prefix_is_big_endian() {
    let (mut client, mut server) = tokio::io::duplex(64);
    write_message(&mut client, b"{}").await.unwrap();

    let mut raw = [0u8; 6];
    tokio::io::AsyncReadExt::read_exact(&mut server, &mut raw)
        .await
        .unwrap();

    assert_eq!(raw, [0, 0, 0, 2, b'{', b'}']);
}

#[tokio::test]
async fn oversized_length_is_rejected_before_reading() {
    let (mut client, mut server) = tokio::io::duplex(64);
    let len = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
    tokio::io::AsyncWriteExt::write_all(&mut client, &len)
        .await
        .unwrap();

    let err = read_message(&mut server).await.unwrap_err();

    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn eof_before_length_is_connection_closed() {
    let (client, mut server) = tokio::io::duplex(64);
    drop(client);

    let err = read_message(&mut server).await.unwrap_err();

    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn call_without_daemon_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = call(&dir.path().join("missing.sock"), &Request::Ping, DEFAULT_TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Io(_)));
}
