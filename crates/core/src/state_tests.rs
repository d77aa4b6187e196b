// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn muppet(name: &str, status: MuppetStatus) -> Muppet {
    Muppet::builder().name(name).status(status).build()
}

#[test]
fn empty_platform_is_fully_healthy() {
    let health = PlatformState::default().health();
    assert_eq!(health.health_score, 1.0);
    assert_eq!(health.total_muppets, 0);
}

#[test]
fn health_score_penalises_errors_and_idle_muppets() {
    let mut state = PlatformState::default();
    state.upsert_muppet(muppet("a", MuppetStatus::Running));
    state.upsert_muppet(muppet("b", MuppetStatus::Running));
    state.upsert_muppet(muppet("c", MuppetStatus::Error));
    state.upsert_muppet(muppet("d", MuppetStatus::Stopped));

    let health = state.health();
    assert!((health.health_score - 0.375).abs() < f64::EPSILON);
    assert_eq!(health.running, 2);
    assert_eq!(health.error, 1);
    assert_eq!(health.stopped, 1);
}

#[test]
fn upsert_replaces_by_name() {
    let mut state = PlatformState::default();
    assert!(state.upsert_muppet(muppet("svc-a", MuppetStatus::Creating)).is_none());

    let replaced = state.upsert_muppet(muppet("svc-a", MuppetStatus::Running));
    assert_eq!(replaced.map(|m| m.status), Some(MuppetStatus::Creating));
    assert_eq!(state.muppets.len(), 1);
    assert_eq!(state.muppet("svc-a").map(|m| m.status), Some(MuppetStatus::Running));
}

#[test]
fn remove_missing_muppet_is_none() {
    let mut state = PlatformState::default();
    assert!(state.remove_muppet("ghost").is_none());
}

#[test]
fn orphaned_deployments_are_surfaced() {
    let mut state = PlatformState::default();
    state.upsert_muppet(muppet("known", MuppetStatus::Running));
    state.active_deployments.insert("known".into(), "arn:known".into());
    state.active_deployments.insert("stray".into(), "arn:stray".into());

    assert_eq!(state.orphaned_deployments(), vec!["stray".to_string()]);
    assert_eq!(state.health().orphaned_deployments, vec!["stray".to_string()]);
}
