// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muppet_adapters::ServiceInfo;
use muppet_core::{DeploymentState, MuppetStatus};
use muppet_engine::{HealthAssessment, HealthLevel};

fn muppet(name: &str, status: MuppetStatus) -> Muppet {
    let mut m = Muppet::new(name, "java-micronaut", format!("https://github.com/acme/{name}"));
    m.status = status;
    m
}

#[test]
fn list_rows_show_status_and_age() {
    let mut svc = muppet("svc-a", MuppetStatus::Running);
    let now = svc.updated_at + chrono::Duration::seconds(120);
    svc.port = 8080;

    let rows = rows(&[svc], now);
    assert_eq!(rows, vec![vec!["svc-a", "java-micronaut", "running", "8080", "2m"]]);
}

#[test]
fn describe_marks_unavailable_facets_and_lists_issues() {
    let report = MuppetStatusReport {
        muppet: muppet("svc-a", MuppetStatus::Running),
        github: Facet::Unavailable { error: "GitHub error: rate limited".to_string() },
        service: Facet::Available(Some(ServiceInfo {
            name: "svc-a".to_string(),
            arn: "arn:aws:ecs:us-west-2:1:service/svc-a".to_string(),
            status: "ACTIVE".to_string(),
            running_count: 1,
            desired_count: 2,
            pending_count: 1,
            deployment_count: 1,
            task_definition: None,
        })),
        infrastructure: Facet::Available(DeploymentState::destroyed("svc-a")),
        steering: Facet::Available(None),
        health: HealthAssessment {
            score: 0.25,
            level: HealthLevel::Unhealthy,
            issues: vec!["GitHub unavailable".to_string()],
        },
    };

    let text = describe(&report);
    assert!(text.contains("Health:     unhealthy (0.25)"));
    assert!(text.contains("GitHub:     unavailable (GitHub error: rate limited)"));
    assert!(text.contains("Service:    ACTIVE 1/2 running"));
    assert!(text.contains("Terraform:  destroyed"));
    assert!(text.contains("Steering:   not installed"));
    assert!(text.ends_with("  ! GitHub unavailable"));
}
