// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn info(status: &str, running: i32, desired: i32) -> ServiceInfo {
    ServiceInfo {
        name: "svc".to_string(),
        arn: "arn:svc".to_string(),
        status: status.to_string(),
        running_count: running,
        desired_count: desired,
        pending_count: 0,
        deployment_count: 1,
        task_definition: None,
    }
}

#[yare::parameterized(
    serving        = { "ACTIVE",   2, 2, true },
    partially_up   = { "ACTIVE",   1, 3, true },
    scaled_to_zero = { "ACTIVE",   0, 0, false },
    not_started    = { "ACTIVE",   0, 1, false },
    draining       = { "DRAINING", 2, 2, false },
)]
fn active_deployment_filter(status: &str, running: i32, desired: i32, expected: bool) {
    assert_eq!(info(status, running, desired).is_active_deployment(), expected);
}

#[test]
fn stability_requires_single_deployment_at_desired_count() {
    assert!(info("ACTIVE", 2, 2).is_stable());
    assert!(!info("ACTIVE", 1, 2).is_stable());
    let mut rolling = info("ACTIVE", 2, 2);
    rolling.deployment_count = 2;
    assert!(!rolling.is_stable());
}

#[tokio::test]
async fn active_deployments_map_names_to_arns() {
    let ecs = FakeOrchestrator::new();
    let live = ecs.add_service("live", 1, 1);
    ecs.add_service("idle", 0, 0);
    ecs.add_service("draining", 1, 1);
    ecs.set_status("draining", "DRAINING");

    let active = ecs.get_active_deployments("cluster").await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active.get("live"), Some(&live.arn));
}

#[tokio::test]
async fn update_service_records_desired_count() {
    let ecs = FakeOrchestrator::new();
    ecs.add_service("svc", 1, 1);
    let updated = ecs.update_service("cluster", "svc", 4).await.unwrap();
    assert_eq!(updated.desired_count, 4);
    assert_eq!(ecs.updates(), vec![("svc".to_string(), 4)]);
    assert!(ecs.update_service("cluster", "ghost", 1).await.is_err());
}
