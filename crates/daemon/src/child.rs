// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wsd content-init`: the isolated content initializer.
//!
//! Reads one spec from stdin, populates the target, writes one report line
//! to stdout and exits 0 (ready) or 42 (content failure). Logs go to
//! stderr, which the parent inherits.

use std::io::{Read, Write};
use std::path::PathBuf;

use thiserror::Error;
use wsd_adapters::{populate, CliGit, ContentDeps, FsBlobStore, TracedBlobStore, TracedGit};
use wsd_core::{ChildReport, ContentSourceSpec, FailureCode, InitOutcome};

use crate::env;
use crate::lifecycle::LifecycleError;

/// Exit code for faults outside the content protocol (reported as a crash).
const EXIT_INFRA: i32 = 1;

#[derive(Debug, Error)]
enum ChildError {
    #[error("cannot locate blob store: {0}")]
    Blobs(#[from] LifecycleError),
    #[error("cannot start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cannot write report: {0}")]
    Write(std::io::Error),
}

/// Run the child and return its exit code.
pub fn run() -> i32 {
    setup_logging();
    match run_inner() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "content initializer failed");
            EXIT_INFRA
        }
    }
}

fn run_inner() -> Result<i32, ChildError> {
    let mut input = String::new();
    let outcome = match std::io::stdin().read_to_string(&mut input) {
        Err(e) => InitOutcome::failed(FailureCode::InvalidSpec, format!("cannot read spec: {e}")),
        Ok(_) => match serde_json::from_str::<ContentSourceSpec>(&input) {
            Err(e) => InitOutcome::failed(FailureCode::InvalidSpec, format!("malformed spec: {e}")),
            Ok(spec) => initialize(&spec)?,
        },
    };

    let report = ChildReport::new(outcome);
    let line = report.to_line()?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(line.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(ChildError::Write)?;
    Ok(report.exit_code())
}

fn initialize(spec: &ContentSourceSpec) -> Result<InitOutcome, ChildError> {
    let deps = ContentDeps::new(
        TracedGit::new(CliGit::default()),
        TracedBlobStore::new(FsBlobStore::new(blob_root()?)),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ChildError::Runtime)?;

    tracing::info!(
        workspace_id = %spec.workspace_id,
        kind = %spec.kind(),
        target = %spec.target_path.display(),
        "populating workspace"
    );
    Ok(runtime.block_on(populate(spec, &deps)))
}

fn blob_root() -> Result<PathBuf, LifecycleError> {
    match env::blob_dir() {
        Some(dir) => Ok(dir),
        None => Ok(env::state_dir()?.join("blobs")),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
