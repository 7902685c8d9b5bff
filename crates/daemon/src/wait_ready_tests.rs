// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn target_only_uses_default_timeout() {
    let (target, timeout) = parse_args(&args(&["/workspace"])).unwrap();
    assert_eq!(target, PathBuf::from("/workspace"));
    assert_eq!(timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
}

#[test]
fn fractional_timeout_is_accepted() {
    let (_, timeout) = parse_args(&args(&["/workspace", "0.5"])).unwrap();
    assert_eq!(timeout, Duration::from_millis(500));
}

#[parameterized(
    missing_target = { &[] },
    bad_number = { &["/workspace", "soon"] },
    negative = { &["/workspace", "-1"] },
    extra = { &["/workspace", "1", "2"] },
)]
fn bad_arguments_are_rejected(list: &[&str]) {
    assert!(parse_args(&args(list)).is_err());
}
