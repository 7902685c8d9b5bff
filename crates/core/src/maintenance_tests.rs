// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_to_normal() {
    let gate = Maintenance::default();
    assert_eq!(gate.mode(), MaintenanceMode::Normal);
    assert_eq!(gate.is_enabled(&CancellationToken::new()), Ok(false));
}

#[test]
fn toggles_are_shared_between_clones() {
    let admin = Maintenance::default();
    let reader = admin.clone();
    let ctx = CancellationToken::new();

    assert_eq!(admin.enable(), MaintenanceMode::Normal);
    assert_eq!(reader.is_enabled(&ctx), Ok(true));
    assert_eq!(reader.mode(), MaintenanceMode::Maintenance);

    assert_eq!(admin.disable(), MaintenanceMode::Maintenance);
    assert_eq!(reader.is_enabled(&ctx), Ok(false));
}

#[test]
fn stays_in_maintenance_until_disabled() {
    let gate = Maintenance::new(true);
    let ctx = CancellationToken::new();
    for _ in 0..3 {
        assert_eq!(gate.is_enabled(&ctx), Ok(true));
    }
    // Enabling twice is idempotent
    assert_eq!(gate.enable(), MaintenanceMode::Maintenance);
    assert_eq!(gate.mode(), MaintenanceMode::Maintenance);
}

#[test]
fn canceled_context_fails_the_check() {
    let gate = Maintenance::new(false);
    let ctx = CancellationToken::new();
    ctx.cancel();
    assert_eq!(gate.is_enabled(&ctx), Err(MaintenanceError::Canceled));
}

#[test]
fn concurrent_readers_observe_toggle() {
    let gate = Maintenance::default();
    gate.enable();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = gate.clone();
            std::thread::spawn(move || gate.is_enabled(&CancellationToken::new()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}

#[test]
fn mode_display() {
    assert_eq!(MaintenanceMode::Normal.to_string(), "normal");
    assert_eq!(MaintenanceMode::Maintenance.to_string(), "maintenance");
}
