// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deletion accounting and idempotent teardown.

use crate::prelude::*;

async fn deployed(world: &World, name: &str) {
    let request = CreateRequest { auto_deploy: true, ..CreateRequest::new(name, TEMPLATE) };
    world.platform.lifecycle.create_muppet(request).await.unwrap();
}

#[tokio::test]
async fn full_delete_removes_everything() {
    let world = World::started().await;
    deployed(&world, "billing").await;

    let result =
        world.platform.lifecycle.delete_muppet(DeleteRequest::new("billing")).await.unwrap();

    assert!(result.success);
    assert_eq!(
        result.steps_completed,
        vec![
            DeleteStep::UndeployFargate,
            DeleteStep::DestroyInfrastructure,
            DeleteStep::DeleteRepository,
            DeleteStep::RemoveFromState,
        ]
    );
    assert!(world.muppet("billing").is_none());
    assert!(!world.scm.has_repo("billing"));
    assert!(!world.workspace_exists("billing"));
}

#[tokio::test]
async fn forced_delete_accounts_for_a_failed_destroy() {
    let world = World::started().await;
    world.platform.lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)).await.unwrap();
    // Workspace left behind by an earlier, interrupted deploy
    std::fs::create_dir_all(world.platform.infrastructure.workspace_path("billing")).unwrap();
    world.terraform.fail_on("destroy", "Error: resource still in use");

    let request = DeleteRequest { force: true, ..DeleteRequest::new("billing") };
    let result = world.platform.lifecycle.delete_muppet(request).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.steps_failed.len(), 1);
    assert_eq!(result.steps_failed[0].step, DeleteStep::DestroyInfrastructure);
    assert!(result.steps_failed[0].error.contains("resource still in use"));
    assert!(result.steps_completed.contains(&DeleteStep::DeleteRepository));
    assert!(world.muppet("billing").is_none());
}

#[tokio::test]
async fn unforced_delete_stops_cleanup_but_still_forgets_the_muppet() {
    let world = World::started().await;
    world.platform.lifecycle.create_muppet(CreateRequest::new("billing", TEMPLATE)).await.unwrap();
    std::fs::create_dir_all(world.platform.infrastructure.workspace_path("billing")).unwrap();
    world.terraform.fail_on("destroy", "Error: resource still in use");

    let err =
        world.platform.lifecycle.delete_muppet(DeleteRequest::new("billing")).await.unwrap_err();

    let details = err.details();
    assert_eq!(details.get("failed_step").map(String::as_str), Some("destroy_infrastructure"));
    assert_eq!(details.get("removed_from_state").map(String::as_str), Some("true"));
    assert!(world.muppet("billing").is_none());
    assert!(world.scm.has_repo("billing"));
    assert!(world.scm.topics("billing").contains(&"status-error".to_string()));
}

#[tokio::test]
async fn destroying_twice_is_harmless_and_skips_terraform() {
    let world = World::started().await;
    deployed(&world, "billing").await;
    let infra = &world.platform.infrastructure;

    let first = infra.destroy_infrastructure("billing").await.unwrap();
    let calls_after_first = world.terraform.calls().len();
    let second = infra.destroy_infrastructure("billing").await.unwrap();

    assert_eq!(first.status, DeploymentStatus::Destroyed);
    assert_eq!(second.status, DeploymentStatus::Destroyed);
    assert!(second.terraform_workspace.is_none());
    assert_eq!(world.terraform.calls().len(), calls_after_first);
}

#[tokio::test]
async fn destroy_without_workspace_never_runs_terraform() {
    let world = World::started().await;

    let infra = &world.platform.infrastructure;
    let state = infra.destroy_infrastructure("never-deployed").await.unwrap();

    assert_eq!(state.status, DeploymentStatus::Destroyed);
    assert!(world.terraform.calls().is_empty());
}
