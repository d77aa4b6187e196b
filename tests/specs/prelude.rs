// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A platform wired to fakes, plus shortcuts the specs share.

use std::sync::Arc;
use std::time::Duration;

pub use muppet_adapters::{
    FakeOrchestrator, FakeParameterStore, FakeSourceControl, FakeTemplateRenderer,
    FakeTerraformRunner,
};
pub use muppet_core::{DeploymentStatus, Muppet, MuppetStatus};
pub use muppet_engine::{
    Adapters, CreateRequest, DeleteRequest, DeleteStep, Platform, PlatformConfig,
};
use serde_json::json;
use tempfile::TempDir;

pub const ORG: &str = "acme";
pub const TEMPLATE: &str = "java-micronaut";

pub struct World {
    _root: TempDir,
    pub scm: FakeSourceControl,
    pub params: FakeParameterStore,
    pub ecs: FakeOrchestrator,
    pub terraform: FakeTerraformRunner,
    pub platform: Platform,
}

impl World {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let steering_dir = root.path().join("steering");
        std::fs::create_dir_all(&steering_dir).unwrap();
        std::fs::write(steering_dir.join("java.md"), "# Java conventions\n").unwrap();

        let config = PlatformConfig {
            github_org: ORG.to_string(),
            workspace_root: root.path().join("terraform"),
            steering_dir,
            stability_timeout: Duration::ZERO,
            stability_poll_interval: Duration::from_millis(1),
            ..PlatformConfig::default()
        };

        let scm = FakeSourceControl::new(ORG);
        let params = FakeParameterStore::new();
        params.insert(
            "/muppet-platform/tls/certificate-arn",
            "arn:aws:acm:us-west-2:1:certificate/spec",
        );
        params.insert("/muppet-platform/tls/hosted-zone-id", "ZSPEC");
        params.insert("/muppet-platform/terraform/modules/fargate-service/version", "v1.4.0");
        let ecs = FakeOrchestrator::new();
        let terraform = FakeTerraformRunner::new();
        terraform.set_outputs(json!({
            "service_arn": { "value": "arn:aws:ecs:us-west-2:1:service/cluster/spec" },
            "service_url": { "value": "https://spec.muppet-platform.dev" },
        }));

        let platform = Platform::new(
            config,
            Adapters {
                scm: Arc::new(scm.clone()),
                params: Arc::new(params.clone()),
                ecs: Arc::new(ecs.clone()),
                terraform: Arc::new(terraform.clone()),
                templates: Arc::new(FakeTemplateRenderer::new()),
            },
        );
        Self { _root: root, scm, params, ecs, terraform, platform }
    }

    pub async fn started() -> Self {
        let world = Self::new();
        world.platform.state.initialize().await.unwrap();
        world
    }

    pub fn muppet(&self, name: &str) -> Option<Muppet> {
        self.platform.state.get_muppet(name).unwrap()
    }

    pub fn workspace_exists(&self, name: &str) -> bool {
        self.platform.infrastructure.workspace_path(name).exists()
    }
}
