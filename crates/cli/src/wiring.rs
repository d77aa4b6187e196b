// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production adapters and the platform built from them.

use std::sync::Arc;

use anyhow::Result;
use muppet_adapters::{
    load_sdk_config, CliTerraformRunner, EcsOrchestrator, FsTemplateRenderer, GitHubClient,
    SsmParameterStore,
};
use muppet_engine::{Adapters, Platform, PlatformConfig};
use tracing::warn;

use crate::exit_error::{ExitError, USAGE_EXIT};

/// Build the platform and load state.
///
/// A failed state load is logged, not fatal: commands that need state
/// report `state_not_initialized` themselves.
pub async fn connect(config: PlatformConfig) -> Result<Platform> {
    let token = crate::env::github_token()
        .ok_or_else(|| ExitError::new(USAGE_EXIT, "GITHUB_TOKEN is not set"))?;
    let scm = GitHubClient::new(&token, config.github_org.clone())?;
    let sdk = load_sdk_config(&config.aws_region).await;

    let adapters = Adapters {
        scm: Arc::new(scm),
        params: Arc::new(SsmParameterStore::new(&sdk)),
        ecs: Arc::new(EcsOrchestrator::new(&sdk)),
        terraform: Arc::new(CliTerraformRunner::new(
            config.terraform_binary.clone(),
            config.terraform_timeout,
        )),
        templates: Arc::new(FsTemplateRenderer::new(config.templates_dir.clone())),
    };
    let platform = Platform::new(config, adapters);
    if let Err(e) = platform.state.initialize().await {
        warn!(error = %e, "platform state could not be loaded");
    }
    Ok(platform)
}
