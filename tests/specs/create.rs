// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Muppet creation end to end.

use crate::prelude::*;

#[tokio::test]
async fn created_muppet_has_repository_code_and_steering() {
    let world = World::started().await;

    let request = CreateRequest::new("billing", TEMPLATE);
    let result = world.platform.lifecycle.create_muppet(request).await.unwrap();

    assert!(result.success);
    assert_eq!(result.muppet.status, MuppetStatus::Stopped);
    assert!(world.scm.has_repo("billing"));
    let pushed = world.scm.pushed_paths("billing");
    assert_eq!(pushed.first().map(String::as_str), Some(".github/workflows/ci.yml"));
    assert!(world.scm.file("billing", ".kiro/steering/java.md").is_some());
    assert_eq!(world.muppet("billing").unwrap().status, MuppetStatus::Stopped);
    assert!(!world.workspace_exists("billing"));
}

#[tokio::test]
async fn auto_deployed_muppet_is_running_with_its_service() {
    let world = World::started().await;
    let request = CreateRequest { auto_deploy: true, ..CreateRequest::new("billing", TEMPLATE) };

    let result = world.platform.lifecycle.create_muppet(request).await.unwrap();

    let muppet = world.muppet("billing").unwrap();
    assert_eq!(muppet.status, MuppetStatus::Running);
    assert_eq!(
        muppet.fargate_service_arn.as_deref(),
        Some("arn:aws:ecs:us-west-2:1:service/cluster/spec")
    );
    assert_eq!(muppet.terraform_version.as_deref(), Some("v1.4.0"));
    assert_eq!(
        result.deployment.unwrap().service_url.as_deref(),
        Some("https://spec.muppet-platform.dev")
    );

    let status =
        world.platform.infrastructure.get_deployment_status("billing").await.unwrap();
    assert_eq!(status.status, DeploymentStatus::Completed);
}

#[tokio::test]
async fn repository_failure_leaves_no_trace_in_state() {
    let world = World::started().await;
    world.scm.fail_on("create");

    let err = world
        .platform
        .lifecycle
        .create_muppet(CreateRequest::new("billing", TEMPLATE))
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "github_error");
    assert!(world.muppet("billing").is_none());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_call() {
    let world = World::started().await;

    for (name, template) in [("bad name!", TEMPLATE), ("billing", "no-such-template")] {
        let err = world
            .platform
            .lifecycle
            .create_muppet(CreateRequest::new(name, template))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    assert!(world.scm.calls().iter().all(|c| c.operation() == "discover"));
    assert!(world.platform.lifecycle.list_muppets().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_creates_of_one_name_yield_one_muppet() {
    let world = World::started().await;
    let lifecycle = &world.platform.lifecycle;

    let (first, second) = tokio::join!(
        lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)),
        lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let creates = world.scm.calls().iter().filter(|c| c.operation() == "create").count();
    assert_eq!(creates, 1);
    assert_eq!(lifecycle.list_muppets().unwrap().len(), 1);
}
