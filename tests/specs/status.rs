// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status fan-out.

use crate::prelude::*;
use muppet_engine::HealthLevel;

#[tokio::test]
async fn healthy_deployed_muppet_reports_every_facet() {
    let world = World::started().await;
    let request = CreateRequest { auto_deploy: true, ..CreateRequest::new("billing", TEMPLATE) };
    world.platform.lifecycle.create_muppet(request).await.unwrap();
    world.ecs.add_service("billing", 1, 1);

    let report = world.platform.lifecycle.get_muppet_status("billing").await.unwrap();

    assert!(report.github.value().unwrap().is_some());
    assert_eq!(report.service.value().unwrap().as_ref().unwrap().running_count, 1);
    assert_eq!(report.infrastructure.value().unwrap().status, DeploymentStatus::Completed);
    assert!(report.steering.value().unwrap().is_some());
    assert_eq!(report.health.level, HealthLevel::Healthy);
}

#[tokio::test]
async fn one_failing_source_degrades_only_its_facet() {
    let world = World::started().await;
    world.platform.lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)).await.unwrap();
    world.ecs.set_failing(true);

    let report = world.platform.lifecycle.get_muppet_status("billing").await.unwrap();

    assert!(report.service.is_unavailable());
    assert!(!report.github.is_unavailable());
    assert!(!report.infrastructure.is_unavailable());
    assert!(report.health.score < 1.0);
}

#[tokio::test]
async fn unknown_muppet_is_not_found() {
    let world = World::started().await;
    let err = world.platform.lifecycle.get_muppet_status("ghost").await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}
