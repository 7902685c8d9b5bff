// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

/// Marker files checked in order; first match wins.
const MARKERS: &[(&str, &str)] = &[
    ("Cargo.toml", "rust"),
    ("go.mod", "go"),
    ("package.json", "node"),
    ("pyproject.toml", "python"),
    ("requirements.txt", "python"),
    ("pom.xml", "java"),
];

/// Detect the project type of a populated workspace from marker files.
pub fn project_type(root: &Path) -> Option<&'static str> {
    MARKERS
        .iter()
        .find(|(marker, _)| root.join(marker).is_file())
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
