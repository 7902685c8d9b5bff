// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::publish::ReadinessPublisher;
use tempfile::TempDir;
use wsd_adapters::ready_file::{ready_file_path, write_ready_file};
use wsd_core::{FailureCode, InitOutcome, WorkspaceId};

fn file_source(dir: &TempDir) -> ReadyFileSource {
    ReadyFileSource::new(dir.path()).with_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn subscription_source_returns_published_message() {
    let publisher = ReadinessPublisher::new(WorkspaceId::new("ws-1"));
    publisher.publish(&InitOutcome::success(0)).await.unwrap();
    let mut waiter = ReadinessWaiter::new(SubscriptionSource::new(publisher.subscribe()));

    match waiter.wait(Duration::from_secs(1)).await.unwrap() {
        WaitResult::Ready(msg) => assert!(msg.succeeded()),
        WaitResult::Degraded => panic!("expected ready"),
    }
}

#[tokio::test]
async fn failure_outcome_still_unblocks() {
    let publisher = ReadinessPublisher::new(WorkspaceId::new("ws-1"));
    let mut waiter = ReadinessWaiter::new(SubscriptionSource::new(publisher.subscribe()));
    publisher
        .publish(&InitOutcome::failed(FailureCode::CloneFailed, "nope"))
        .await
        .unwrap();

    let result = waiter.wait(Duration::from_secs(1)).await.unwrap();
    let WaitResult::Ready(msg) = result else {
        panic!("expected ready, got {result:?}");
    };
    assert!(!msg.succeeded());
}

#[tokio::test]
async fn silent_publisher_degrades_after_timeout() {
    let publisher = ReadinessPublisher::new(WorkspaceId::new("ws-1"));
    let mut waiter = ReadinessWaiter::new(SubscriptionSource::new(publisher.subscribe()));
    assert_eq!(
        waiter.wait(Duration::from_millis(30)).await.unwrap(),
        WaitResult::Degraded
    );
}

#[tokio::test]
async fn dropped_publisher_is_an_error() {
    let publisher = ReadinessPublisher::new(WorkspaceId::new("ws-1"));
    let mut waiter = ReadinessWaiter::new(SubscriptionSource::new(publisher.subscribe()));
    drop(publisher);
    assert!(matches!(
        waiter.wait(Duration::from_secs(1)).await,
        Err(WaitError::Closed)
    ));
}

#[tokio::test]
async fn ready_file_source_waits_for_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().to_path_buf();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let msg = WorkspaceReadyMessage::new(WorkspaceId::new("ws-1"), &InitOutcome::success(0));
        write_ready_file(&target, &msg).unwrap();
    });
    let mut waiter = ReadinessWaiter::new(file_source(&dir));

    let result = waiter.wait(Duration::from_secs(5)).await.unwrap();

    writer.await.unwrap();
    assert!(matches!(result, WaitResult::Ready(ref m) if m.workspace_id == "ws-1"));
}

#[tokio::test]
async fn missing_ready_file_degrades() {
    let dir = TempDir::new().unwrap();
    let mut waiter = ReadinessWaiter::new(file_source(&dir));
    assert_eq!(
        waiter.wait(Duration::from_millis(50)).await.unwrap(),
        WaitResult::Degraded
    );
}

#[tokio::test]
async fn malformed_ready_file_fails_hard() {
    let dir = TempDir::new().unwrap();
    let path = ready_file_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "garbage").unwrap();
    let mut waiter = ReadinessWaiter::new(file_source(&dir));

    assert!(matches!(
        waiter.wait(Duration::from_secs(1)).await,
        Err(WaitError::ReadyFile(_))
    ));
}
