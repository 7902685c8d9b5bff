// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::FakeInitializer;
use std::io::Read;
use tempfile::TempDir;
use wsd_adapters::archive::{unpack_into, HashingReader};
use wsd_adapters::MemoryBlobStore;
use wsd_core::test_support::empty_spec;
use wsd_core::SequentialIdGen;

type TestPods = LocalPods<FakeInitializer, SequentialIdGen, MemoryBlobStore>;

struct Fixture {
    dir: TempDir,
    fake: FakeInitializer,
    blobs: MemoryBlobStore,
    pods: TestPods,
}

fn fixture() -> Fixture {
    let fake = FakeInitializer::default();
    let blobs = MemoryBlobStore::new();
    let agent = NodeAgent::without_ready_file(fake.clone(), SequentialIdGen::new("inst"));
    Fixture {
        dir: TempDir::new().unwrap(),
        fake,
        blobs: blobs.clone(),
        pods: LocalPods::new(agent, blobs).with_delete_grace(Duration::from_secs(10)),
    }
}

fn ws(id: &str) -> WorkspaceId {
    WorkspaceId::new(id)
}

impl Fixture {
    fn target(&self, id: &str) -> std::path::PathBuf {
        self.dir.path().join(id)
    }

    async fn create_ready(&self, id: &str) {
        let target = self.target(id);
        std::fs::create_dir_all(target.join("src")).unwrap();
        std::fs::write(target.join("README.md"), "hello").unwrap();
        std::fs::write(target.join("src/main.rs"), "fn main() {}").unwrap();

        self.pods.create(empty_spec(id, &target)).await.unwrap();
        let msg = self
            .pods
            .agent()
            .subscribe(&ws(id))
            .unwrap()
            .wait_timeout(Duration::from_secs(10))
            .await
            .unwrap();
        assert!(msg.succeeded());
    }
}

#[tokio::test]
async fn create_starts_initialization() {
    let f = fixture();
    f.create_ready("ws-1").await;
    assert_eq!(f.fake.calls(), vec![ws("ws-1")]);
    assert_eq!(f.pods.agent().status(&ws("ws-1")), Some(WorkspaceStatus::Ready));
}

#[tokio::test]
async fn create_propagates_agent_rejection() {
    let f = fixture();
    f.fake.hang("ws-1");
    f.pods.create(empty_spec("ws-1", &f.target("ws-1"))).await.unwrap();

    let err = f
        .pods
        .create(empty_spec("ws-1", &f.target("ws-1")))
        .await
        .unwrap_err();

    assert!(matches!(err, PodError::Agent(AgentError::AlreadyRunning(_))));
    f.pods.agent().shutdown().await;
}

#[tokio::test]
async fn snapshot_stores_archive_under_its_digest() {
    let f = fixture();
    f.create_ready("ws-1").await;

    let id = f.pods.snapshot(&ws("ws-1")).await.unwrap();

    assert!(id.starts_with("sha256:"), "{id}");
    assert_eq!(id.len(), "sha256:".len() + 64);
    let stored = f.blobs.get(&id).unwrap();
    let mut hashing = HashingReader::new(stored.as_slice());
    std::io::copy(&mut hashing, &mut std::io::sink()).unwrap();
    assert_eq!(hashing.digest(), id);

    let restored = TempDir::new().unwrap();
    unpack_into(stored.as_slice(), restored.path(), false).unwrap();
    let mut main = String::new();
    std::fs::File::open(restored.path().join("src/main.rs"))
        .unwrap()
        .read_to_string(&mut main)
        .unwrap();
    assert_eq!(main, "fn main() {}");
}

#[tokio::test]
async fn snapshot_of_unchanged_tree_is_stable() {
    let f = fixture();
    f.create_ready("ws-1").await;

    let first = f.pods.snapshot(&ws("ws-1")).await.unwrap();
    let second = f.pods.snapshot(&ws("ws-1")).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn snapshot_requires_ready_workspace() {
    let f = fixture();
    f.fake.hang("ws-1");
    f.pods.create(empty_spec("ws-1", &f.target("ws-1"))).await.unwrap();

    let err = f.pods.snapshot(&ws("ws-1")).await.unwrap_err();

    assert!(matches!(err, PodError::NotReady(ref id) if id == "ws-1"));
    f.pods.agent().shutdown().await;
}

#[tokio::test]
async fn snapshot_of_unknown_workspace_is_not_found() {
    let f = fixture();
    let err = f.pods.snapshot(&ws("nope")).await.unwrap_err();
    assert!(matches!(err, PodError::Agent(AgentError::NotFound(_))));
}

#[tokio::test]
async fn delete_cancels_in_flight_init_and_removes_tree() {
    let f = fixture();
    f.fake.hang("ws-1");
    let target = f.target("ws-1");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("partial"), "x").unwrap();
    f.pods.create(empty_spec("ws-1", &target)).await.unwrap();
    let mut sub = f.pods.agent().subscribe(&ws("ws-1")).unwrap();

    f.pods.delete(&ws("ws-1")).await.unwrap();

    let msg = sub.wait_timeout(Duration::from_secs(1)).await.unwrap();
    assert!(!msg.succeeded());
    assert!(!target.exists());
    assert!(f.pods.agent().status(&ws("ws-1")).is_none());
}

#[tokio::test]
async fn delete_leaves_tree_alone_when_init_outlives_grace() {
    let f = fixture();
    let release = f.fake.stall("ws-1");
    let agent = NodeAgent::without_ready_file(f.fake.clone(), SequentialIdGen::new("inst"));
    let pods = LocalPods::new(agent, MemoryBlobStore::new())
        .with_delete_grace(Duration::from_millis(50));
    let target = f.target("ws-1");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("partial"), "x").unwrap();
    pods.create(empty_spec("ws-1", &target)).await.unwrap();

    let err = pods.delete(&ws("ws-1")).await.unwrap_err();
    assert!(matches!(err, PodError::StopTimeout { ref id, .. } if *id == ws("ws-1")));
    assert!(target.join("partial").exists());
    assert!(pods.agent().status(&ws("ws-1")).is_some());

    release.notify_one();
    let msg = pods
        .agent()
        .subscribe(&ws("ws-1"))
        .unwrap()
        .wait_timeout(Duration::from_secs(5))
        .await
        .unwrap();
    assert!(!msg.succeeded());
    pods.delete(&ws("ws-1")).await.unwrap();
    assert!(!target.exists());
}

#[tokio::test]
async fn delete_ready_workspace_allows_recreate() {
    let f = fixture();
    f.create_ready("ws-1").await;

    f.pods.delete(&ws("ws-1")).await.unwrap();
    assert!(!f.target("ws-1").exists());

    f.create_ready("ws-1").await;
    assert_eq!(f.pods.agent().instance(&ws("ws-1")).unwrap(), "inst-2");
}

#[tokio::test]
async fn delete_of_unknown_workspace_is_not_found() {
    let f = fixture();
    let err = f.pods.delete(&ws("nope")).await.unwrap_err();
    assert!(matches!(err, PodError::Agent(AgentError::NotFound(_))));
}
