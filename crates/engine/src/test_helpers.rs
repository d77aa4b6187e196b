// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A [`Platform`] wired to in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use muppet_adapters::{
    FakeOrchestrator, FakeParameterStore, FakeSourceControl, FakeTemplateRenderer,
    FakeTerraformRunner,
};
use serde_json::json;
use tempfile::TempDir;

use crate::config::PlatformConfig;
use crate::platform::{Adapters, Platform};

pub(crate) const ORG: &str = "acme";

pub(crate) struct Harness {
    _root: TempDir,
    pub scm: FakeSourceControl,
    pub params: FakeParameterStore,
    pub ecs: FakeOrchestrator,
    pub terraform: FakeTerraformRunner,
    pub templates: FakeTemplateRenderer,
    pub platform: Platform,
}

impl Harness {
    /// Fakes with TLS parameters, one steering doc and Terraform outputs
    /// for a service named after each deployed muppet.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let steering_dir = root.path().join("steering");
        std::fs::create_dir_all(&steering_dir).unwrap();
        std::fs::write(steering_dir.join("guidelines.md"), "# Guidelines\n").unwrap();

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
            "arn:aws:acm:us-west-2:1:certificate/abc",
        );
        params.insert("/muppet-platform/tls/hosted-zone-id", "Z0000");
        let ecs = FakeOrchestrator::new();
        let terraform = FakeTerraformRunner::new();
        terraform.set_outputs(json!({
            "service_arn": { "value": "arn:aws:ecs:us-west-2:1:service/cluster/deployed" },
            "service_url": { "value": "https://deployed.muppet-platform.dev" },
        }));
        let templates = FakeTemplateRenderer::new();

        let platform = Platform::new(
            config,
            Adapters {
                scm: Arc::new(scm.clone()),
                params: Arc::new(params.clone()),
                ecs: Arc::new(ecs.clone()),
                terraform: Arc::new(terraform.clone()),
                templates: Arc::new(templates.clone()),
            },
        );
        Self { _root: root, scm, params, ecs, terraform, templates, platform }
    }

    /// Harness with state already initialised.
    pub async fn initialized() -> Self {
        let harness = Self::new();
        harness.platform.state.initialize().await.unwrap();
        harness
    }
}
