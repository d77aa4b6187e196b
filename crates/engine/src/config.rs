// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform configuration shared by every engine component.

use std::path::PathBuf;
use std::time::Duration;

use muppet_core::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

/// Every field has a default so a partial TOML file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform name, also the workspace directory under the temp dir
    pub name: String,
    pub github_org: String,
    pub aws_region: String,
    pub environment: String,
    pub ecs_cluster: String,
    /// Parameter Store path holding `<module>/version` entries
    pub terraform_param_prefix: String,
    /// Parameter Store path holding `certificate-arn` and `hosted-zone-id`
    pub tls_param_prefix: String,
    /// Parameter Store path for per-muppet bookkeeping
    pub muppet_param_prefix: String,
    pub workspace_root: PathBuf,
    pub terraform_binary: PathBuf,
    #[serde(with = "secs")]
    pub terraform_timeout: Duration,
    /// Git source of the shared Terraform modules
    pub module_source: String,
    pub templates_dir: PathBuf,
    pub steering_dir: PathBuf,
    pub default_port: u16,
    /// Registry prefix for images when none is given (`<registry>/<name>:latest`)
    pub image_registry: String,
    #[serde(with = "secs")]
    pub stability_timeout: Duration,
    #[serde(with = "secs")]
    pub stability_poll_interval: Duration,
    pub base_domain: String,
    /// Teams granted access to every new repository
    pub team_permissions: Vec<TeamGrant>,
    pub required_approvals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGrant {
    pub team: String,
    pub permission: muppet_adapters::RepoPermission,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        let name = "muppet-platform".to_string();
        Self {
            workspace_root: std::env::temp_dir().join(&name).join("terraform"),
            github_org: "muppet-platform".to_string(),
            aws_region: "us-west-2".to_string(),
            environment: "development".to_string(),
            ecs_cluster: "muppet-platform-cluster".to_string(),
            terraform_param_prefix: "/muppet-platform/terraform/modules".to_string(),
            tls_param_prefix: "/muppet-platform/tls".to_string(),
            muppet_param_prefix: "/muppet-platform/muppets".to_string(),
            terraform_binary: PathBuf::from("terraform"),
            terraform_timeout: Duration::from_secs(1800),
            module_source: "git::https://github.com/muppet-platform/terraform-modules.git"
                .to_string(),
            templates_dir: PathBuf::from("templates"),
            steering_dir: PathBuf::from("steering-docs"),
            default_port: DEFAULT_PORT,
            image_registry: "muppet-platform".to_string(),
            stability_timeout: Duration::from_secs(600),
            stability_poll_interval: Duration::from_secs(10),
            base_domain: "muppet-platform.dev".to_string(),
            team_permissions: Vec::new(),
            required_approvals: 1,
            name,
        }
    }
}

impl PlatformConfig {
    /// Default container image for a muppet.
    pub fn default_image(&self, muppet_name: &str) -> String {
        format!("{}/{}:latest", self.image_registry.trim_end_matches('/'), muppet_name)
    }

    pub fn image_param(&self, muppet_name: &str) -> String {
        format!("{}/{}/image", self.muppet_param_prefix.trim_end_matches('/'), muppet_name)
    }

    pub fn repo_url(&self, muppet_name: &str) -> String {
        format!("https://github.com/{}/{}", self.github_org, muppet_name)
    }
}

/// Durations as whole seconds in config files.
mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
