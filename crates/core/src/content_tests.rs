// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn spec(source: ContentSource) -> ContentSourceSpec {
    ContentSourceSpec::new("ws-1", source, "/workspace/ws-1")
}

#[yare::parameterized(
    empty    = { ContentSource::Empty, ContentKind::Empty, None },
    git      = { ContentSource::FromGitClone { origin: "https://example.com/r.git".into(), revision: None }, ContentKind::Git, Some("https://example.com/r.git") },
    backup   = { ContentSource::FromBackup { origin: "backups/ws-1".into() }, ContentKind::Backup, Some("backups/ws-1") },
    prebuild = { ContentSource::FromPrebuild { origin: "prebuilds/p1".into(), delta: None, repository: "https://example.com/r.git".into() }, ContentKind::Prebuild, Some("prebuilds/p1") },
    snapshot = { ContentSource::FromSnapshot { origin: "sha256:abc".into() }, ContentKind::Snapshot, Some("sha256:abc") },
)]
fn kind_and_origin(source: ContentSource, kind: ContentKind, origin: Option<&str>) {
    let spec = spec(source);
    assert_eq!(spec.kind(), kind);
    assert_eq!(spec.origin(), origin);
    assert!(spec.validate().is_ok());
}

#[yare::parameterized(
    git      = { ContentSource::FromGitClone { origin: "".into(), revision: None }, ContentKind::Git },
    backup   = { ContentSource::FromBackup { origin: "  ".into() }, ContentKind::Backup },
    snapshot = { ContentSource::FromSnapshot { origin: "".into() }, ContentKind::Snapshot },
)]
fn validate_rejects_empty_origin(source: ContentSource, kind: ContentKind) {
    assert_eq!(spec(source).validate(), Err(SpecError::MissingOrigin { kind }));
}

#[test]
fn validate_rejects_prebuild_without_repository() {
    let spec = spec(ContentSource::FromPrebuild {
        origin: "prebuilds/p1".into(),
        delta: None,
        repository: String::new(),
    });
    assert_eq!(spec.validate(), Err(SpecError::MissingRepository));
}

#[test]
fn validate_rejects_relative_target() {
    let spec = ContentSourceSpec::new("ws-1", ContentSource::Empty, "relative/dir");
    assert!(matches!(spec.validate(), Err(SpecError::RelativeTarget(_))));
}

#[test]
fn source_serializes_with_kind_tag() {
    let spec = spec(ContentSource::FromBackup {
        origin: "backups/ws-1".into(),
    });
    let json = serde_json::to_value(&spec).unwrap();
    similar_asserts::assert_eq!(
        json,
        serde_json::json!({
            "workspace_id": "ws-1",
            "source": {"kind": "FromBackup", "origin": "backups/ws-1"},
            "target_path": "/workspace/ws-1",
        })
    );
}

#[test]
fn optional_fields_default_when_missing() {
    let json = r#"{"workspace_id":"w","source":{"kind":"FromGitClone","origin":"u"},"target_path":"/t"}"#;
    let spec: ContentSourceSpec = serde_json::from_str(json).unwrap();
    assert_eq!(
        spec.source,
        ContentSource::FromGitClone {
            origin: "u".into(),
            revision: None
        }
    );
}
