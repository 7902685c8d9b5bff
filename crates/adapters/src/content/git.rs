// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::stage::Stage;
use super::ContentError;
use crate::git::GitAdapter;
use std::path::Path;

pub(super) async fn clone<G: GitAdapter>(
    git: &G,
    url: &str,
    revision: Option<&str>,
    target: &Path,
) -> Result<(), ContentError> {
    let stage = Stage::new(target)?;
    git.clone_repo(url, revision, stage.path()).await?;
    stage.commit()
}
