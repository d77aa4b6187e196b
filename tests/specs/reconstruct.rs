// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State rebuilt from GitHub, Parameter Store and ECS.

use crate::prelude::*;

#[tokio::test]
async fn every_repository_becomes_a_muppet_and_live_services_attach() {
    let world = World::new();
    world.scm.add_repo("alpha", &["muppet", "template-java-micronaut", "status-running"]);
    world.scm.add_repo("beta", &["muppet", "template-java-micronaut", "status-creating"]);
    world.scm.add_repo("gamma", &["muppet", "template-java-micronaut", "status-stopped"]);
    world.scm.add_repo("website", &["docs"]);
    world.ecs.add_service("alpha", 2, 2);
    world.ecs.add_service("beta", 1, 1);

    world.platform.state.initialize().await.unwrap();
    let state = world.platform.state.get_state().unwrap();

    assert_eq!(state.muppets.len(), 3);
    let with_service: Vec<_> = state
        .muppets
        .iter()
        .filter(|m| m.fargate_service_arn.is_some())
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(with_service, vec!["alpha", "beta"]);
    assert_eq!(state.muppet("beta").unwrap().status, MuppetStatus::Running);
    assert_eq!(state.muppet("gamma").unwrap().status, MuppetStatus::Stopped);
    assert_eq!(state.terraform_versions.get("fargate-service").map(String::as_str), Some("v1.4.0"));
}

#[tokio::test]
async fn unreachable_sources_contribute_nothing() {
    let world = World::new();
    world.scm.add_repo("alpha", &["muppet", "status-running"]);
    world.ecs.add_service("alpha", 1, 1);
    world.params.set_failing(true);

    let summary = world.platform.lifecycle.refresh().await.unwrap();
    let state = world.platform.state.get_state().unwrap();

    assert_eq!(summary.failed_sources.len(), 1);
    assert!(state.terraform_versions.is_empty());
    assert_eq!(state.active_deployments.len(), 1);
    assert_eq!(state.muppets.len(), 1);
}

#[tokio::test]
async fn platform_health_follows_running_and_error_counts() {
    let world = World::new();
    world.platform.state.initialize().await.unwrap();
    assert_eq!(world.platform.state.get_platform_health().unwrap().health_score, 1.0);

    for (name, status) in [
        ("a", "status-running"),
        ("b", "status-running"),
        ("c", "status-error"),
        ("d", "status-stopped"),
    ] {
        world.scm.add_repo(name, &["muppet", status]);
    }
    world.platform.lifecycle.refresh().await.unwrap();

    let health = world.platform.state.get_platform_health().unwrap();
    assert!((health.health_score - 0.375).abs() < 1e-9);
}

#[tokio::test]
async fn muppets_created_locally_survive_until_the_next_refresh() {
    let world = World::started().await;
    world.platform.lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)).await.unwrap();

    world.platform.lifecycle.refresh().await.unwrap();

    // The fake organization now holds the repository, so reconstruction finds it
    let muppet = world.muppet("billing").unwrap();
    assert_eq!(muppet.status, MuppetStatus::Stopped);
    assert_eq!(muppet.template, TEMPLATE);
}
