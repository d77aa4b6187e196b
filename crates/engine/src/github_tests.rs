// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::TeamGrant;
use muppet_adapters::{FakeSourceControl, FileContent, RepoPermission, ScmCall};

fn manager(scm: &FakeSourceControl, config: PlatformConfig) -> GitHubManager {
    GitHubManager::new(Arc::new(config), Arc::new(scm.clone()))
}

fn request(name: &str) -> RepositoryRequest {
    let files = FileMap::from([
        ("README.md".to_string(), FileContent::Text("# svc\n".to_string())),
        (".github/workflows/ci.yml".to_string(), FileContent::Text("name: CI\n".to_string())),
        ("logo.png".to_string(), FileContent::Binary(vec![0x89, 0x50])),
    ]);
    RepositoryRequest {
        name: name.to_string(),
        template: "java-micronaut".to_string(),
        description: "Billing service".to_string(),
        files,
        status: MuppetStatus::Creating,
        port: 3000,
    }
}

#[tokio::test]
async fn creates_a_fully_configured_repository() {
    let scm = FakeSourceControl::new("acme");
    let config = PlatformConfig {
        team_permissions: vec![TeamGrant {
            team: "platform".to_string(),
            permission: RepoPermission::Maintain,
        }],
        ..PlatformConfig::default()
    };

    let setup = manager(&scm, config).create_muppet_repository(request("billing")).await.unwrap();

    assert!(setup.warnings.is_empty());
    assert_eq!(setup.files_pushed, 3);
    assert_eq!(setup.repository.html_url, "https://github.com/acme/billing");
    assert_eq!(
        scm.topics("billing"),
        vec!["muppet", "template-java-micronaut", "status-creating", "port-3000"]
    );
    assert!(scm.calls().contains(&ScmCall::TeamPermission {
        name: "billing".to_string(),
        team: "platform".to_string(),
        permission: RepoPermission::Maintain,
    }));
    assert!(scm.calls().contains(&ScmCall::ProtectBranch {
        name: "billing".to_string(),
        branch: "main".to_string(),
    }));
}

#[tokio::test]
async fn workflows_are_pushed_first() {
    let scm = FakeSourceControl::new("acme");
    manager(&scm, PlatformConfig::default())
        .create_muppet_repository(request("billing"))
        .await
        .unwrap();
    assert_eq!(
        scm.pushed_paths("billing"),
        vec![".github/workflows/ci.yml", "README.md", "logo.png"]
    );
}

#[tokio::test]
async fn invalid_input_touches_nothing() {
    let long_name = "x".repeat(101);
    let cases = [
        ("has space", "java-micronaut"),
        (long_name.as_str(), "java-micronaut"),
        ("billing", "java/micronaut"),
        ("billing", "Java_Micronaut"),
    ];
    for (name, template) in cases {
        let scm = FakeSourceControl::new("acme");
        let mut req = request(name);
        req.template = template.to_string();

        let err = manager(&scm, PlatformConfig::default())
            .create_muppet_repository(req)
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "validation_error", "{name}/{template}");
        assert!(scm.calls().is_empty());
    }
}

#[tokio::test]
async fn creation_failure_is_fatal() {
    let scm = FakeSourceControl::new("acme");
    scm.add_repo("billing", &[]);
    let err = manager(&scm, PlatformConfig::default())
        .create_muppet_repository(request("billing"))
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "github_error");
}

#[tokio::test]
async fn post_creation_failures_become_warnings() {
    let scm = FakeSourceControl::new("acme");
    scm.fail_on("protect_branch");
    scm.fail_on("push_file");

    let setup = manager(&scm, PlatformConfig::default())
        .create_muppet_repository(request("billing"))
        .await
        .unwrap();

    assert!(scm.has_repo("billing"));
    assert_eq!(setup.files_pushed, 0);
    let steps: Vec<_> = setup.warnings.iter().map(|w| w.step.as_str()).collect();
    assert_eq!(
        steps,
        vec![
            "branch_protection",
            "push_file:.github/workflows/ci.yml",
            "push_file:README.md",
            "push_file:logo.png",
        ]
    );
}

#[tokio::test]
async fn sync_status_rewrites_topics() {
    let scm = FakeSourceControl::new("acme");
    scm.add_repo("billing", &["muppet", "status-creating"]);
    let muppet =
        Muppet { status: MuppetStatus::Running, ..Muppet::new("billing", "node-express", "u") };

    manager(&scm, PlatformConfig::default()).sync_status(&muppet).await.unwrap();

    assert!(scm.topics("billing").contains(&"status-running".to_string()));
    assert!(scm.topics("billing").contains(&"template-node-express".to_string()));
}

#[tokio::test]
async fn repository_info_includes_latest_tag() {
    let scm = FakeSourceControl::new("acme");
    scm.add_repo("billing", &["muppet"]);
    scm.add_tag("billing", "v1.2.0");
    let github = manager(&scm, PlatformConfig::default());

    let info = github.repository_info("billing").await.unwrap().unwrap();
    assert_eq!(info.latest_tag.map(|t| t.name).as_deref(), Some("v1.2.0"));
    assert!(github.repository_info("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn tag_listing_failure_is_tolerated() {
    let scm = FakeSourceControl::new("acme");
    scm.add_repo("billing", &["muppet"]);
    scm.fail_on("list_tags");
    let info =
        manager(&scm, PlatformConfig::default()).repository_info("billing").await.unwrap().unwrap();
    assert!(info.latest_tag.is_none());
}

#[tokio::test]
async fn deleting_twice_reports_absence() {
    let scm = FakeSourceControl::new("acme");
    scm.add_repo("billing", &["muppet"]);
    let github = manager(&scm, PlatformConfig::default());
    assert!(github.delete_repository("billing").await.unwrap());
    assert!(!github.delete_repository("billing").await.unwrap());
}
