// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment Service: a muppet plus a container image in, a Fargate
//! service out.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use muppet_adapters::{ContainerOrchestrator, ParameterStore, ServiceInfo};
use muppet_core::{
    validate_muppet_name, DeploymentState, DeploymentStatus, FargateConfig, InfrastructureConfig,
    Muppet, MuppetStatus, PlatformError,
};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PlatformConfig;
use crate::github::GitHubManager;
use crate::infrastructure::InfrastructureManager;

/// Caller-controlled part of a deployment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployRequest {
    /// Defaults to `<registry>/<name>:latest`
    pub image: Option<String>,
    pub environment_variables: BTreeMap<String, String>,
    pub secrets: BTreeMap<String, String>,
    /// Extra Terraform variables, applied over the defaults
    pub variables: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentOutcome {
    pub image: String,
    pub service_arn: Option<String>,
    pub service_url: Option<String>,
    /// Whether ECS reported the service stable before the wait ran out
    pub stable: bool,
    pub infrastructure: DeploymentState,
}

pub struct DeploymentService {
    config: Arc<PlatformConfig>,
    infrastructure: Arc<InfrastructureManager>,
    github: Arc<GitHubManager>,
    params: Arc<dyn ParameterStore>,
    ecs: Arc<dyn ContainerOrchestrator>,
}

impl DeploymentService {
    pub fn new(
        config: Arc<PlatformConfig>,
        infrastructure: Arc<InfrastructureManager>,
        github: Arc<GitHubManager>,
        params: Arc<dyn ParameterStore>,
        ecs: Arc<dyn ContainerOrchestrator>,
    ) -> Self {
        Self { config, infrastructure, github, params, ecs }
    }

    /// Provision and start a muppet's service.
    ///
    /// The muppet is marked `Creating` (and that status pushed to GitHub)
    /// before any infrastructure work. A Terraform result other than
    /// `Completed` is a deployment error; on success the muppet ends up
    /// `Running` with its service ARN set. Not reaching ECS stability in
    /// time only logs a warning.
    pub async fn deploy_muppet(
        &self,
        muppet: &mut Muppet,
        request: &DeployRequest,
        module_versions: &BTreeMap<String, String>,
    ) -> Result<DeploymentOutcome, PlatformError> {
        muppet.transition_to(MuppetStatus::Creating)?;
        self.publish_status(muppet).await;

        let image =
            request.image.clone().unwrap_or_else(|| self.config.default_image(&muppet.name));
        let config = self.infrastructure_config(muppet, &image, request, module_versions);
        info!(muppet = %muppet.name, %image, "deploying muppet");

        let infrastructure = self.infrastructure.deploy_infrastructure(&config).await?;
        if !infrastructure.is_completed() {
            let reason = infrastructure
                .error_message
                .clone()
                .unwrap_or_else(|| format!("terraform ended {}", infrastructure.status));
            let mut err = PlatformError::deployment(format!(
                "infrastructure deployment failed for '{}': {reason}",
                muppet.name
            ))
            .with_detail("muppet", muppet.name.clone());
            if let Some(op) = infrastructure.last_operation {
                err = err.with_detail("operation", op.to_string());
            }
            return Err(err);
        }

        let service_arn = infrastructure.output_str("service_arn");
        let service_url = infrastructure.output_str("service_url");
        if let Some(arn) = &service_arn {
            muppet.fargate_service_arn = Some(arn.clone());
        }
        if let Some(version) = module_versions.get(crate::state::FARGATE_MODULE) {
            muppet.terraform_version = Some(version.clone());
        }
        muppet.transition_to(MuppetStatus::Running)?;
        self.publish_status(muppet).await;

        let image_param = self.config.image_param(&muppet.name);
        if let Err(e) = self.params.put(&image_param, &image).await {
            warn!(muppet = %muppet.name, error = %e, "failed to record deployed image");
        }

        let stable = self.wait_for_stability(&muppet.name).await;
        info!(muppet = %muppet.name, stable, url = ?service_url, "muppet deployed");
        Ok(DeploymentOutcome { image, service_arn, service_url, stable, infrastructure })
    }

    /// Tear down a muppet's infrastructure. The repository is left alone.
    pub async fn undeploy_muppet(
        &self,
        muppet: &mut Muppet,
    ) -> Result<DeploymentState, PlatformError> {
        if muppet.status != MuppetStatus::Deleting {
            muppet.transition_to(MuppetStatus::Deleting)?;
            self.publish_status(muppet).await;
        }

        let state = self.infrastructure.destroy_infrastructure(&muppet.name).await?;
        if state.status == DeploymentStatus::Failed {
            return Err(PlatformError::infrastructure(format!(
                "failed to destroy infrastructure for '{}': {}",
                muppet.name,
                state.error_message.as_deref().unwrap_or("unknown error")
            ))
            .with_detail("muppet", muppet.name.clone()));
        }
        muppet.fargate_service_arn = None;

        let image_param = self.config.image_param(&muppet.name);
        if let Err(e) = self.params.delete(&image_param).await {
            warn!(muppet = %muppet.name, error = %e, "failed to remove deployed image record");
        }
        info!(muppet = %muppet.name, "muppet undeployed");
        Ok(state)
    }

    /// Set the ECS desired count directly, without a Terraform run.
    pub async fn scale_muppet(
        &self,
        name: &str,
        desired_count: u32,
        min_capacity: Option<u32>,
        max_capacity: Option<u32>,
    ) -> Result<ServiceInfo, PlatformError> {
        validate_muppet_name(name)?;
        check_capacity(desired_count, min_capacity, max_capacity)?;
        let desired = i32::try_from(desired_count).map_err(|_| {
            PlatformError::validation("desired count is too large")
                .with_detail("desired_count", desired_count.to_string())
        })?;
        let service = self.ecs.update_service(&self.config.ecs_cluster, name, desired).await?;
        info!(muppet = %name, desired, "muppet scaled");
        Ok(service)
    }

    /// Live ECS view of a muppet's service, `None` when not deployed.
    pub async fn service_status(&self, name: &str) -> Result<Option<ServiceInfo>, PlatformError> {
        Ok(self.ecs.get_service(&self.config.ecs_cluster, name).await?)
    }

    fn infrastructure_config(
        &self,
        muppet: &Muppet,
        image: &str,
        request: &DeployRequest,
        module_versions: &BTreeMap<String, String>,
    ) -> InfrastructureConfig {
        let fargate = FargateConfig {
            image: image.to_string(),
            port: muppet.port,
            environment_variables: request.environment_variables.clone(),
            secrets: request.secrets.clone(),
            ..FargateConfig::default()
        };
        let mut config = InfrastructureConfig::new(
            &muppet.name,
            &self.config.aws_region,
            &self.config.environment,
        )
        .fargate(fargate)
        .module_versions(module_versions.clone());
        for (key, value) in &request.variables {
            config = config.with_variable(key.clone(), value.clone());
        }
        config
    }

    async fn publish_status(&self, muppet: &Muppet) {
        if let Err(e) = self.github.sync_status(muppet).await {
            warn!(
                muppet = %muppet.name,
                status = %muppet.status,
                error = %e,
                "failed to sync status to GitHub"
            );
        }
    }

    /// Poll ECS until the service is stable or the configured wait runs out.
    async fn wait_for_stability(&self, name: &str) -> bool {
        let deadline = Instant::now() + self.config.stability_timeout;
        loop {
            match self.ecs.get_service(&self.config.ecs_cluster, name).await {
                Ok(Some(service)) if service.is_stable() => return true,
                Ok(service) => debug!(
                    muppet = %name,
                    running = service.as_ref().map(|s| s.running_count),
                    "waiting for service stability"
                ),
                Err(e) => warn!(muppet = %name, error = %e, "stability check failed"),
            }
            if Instant::now() >= deadline {
                warn!(
                    muppet = %name,
                    timeout_secs = self.config.stability_timeout.as_secs(),
                    "service did not stabilise in time"
                );
                return false;
            }
            tokio::time::sleep(self.config.stability_poll_interval).await;
        }
    }
}

/// `min <= desired <= max` for whichever bounds are given.
pub(crate) fn check_capacity(
    desired: u32,
    min: Option<u32>,
    max: Option<u32>,
) -> Result<(), PlatformError> {
    let out_of_range = |bound: &str, value: u32| {
        let message = format!("desired count {desired} is outside the {bound} capacity {value}");
        PlatformError::validation(message)
            .with_detail("desired_count", desired.to_string())
            .with_detail(format!("{bound}_capacity"), value.to_string())
    };
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(PlatformError::validation(format!(
                "minimum capacity {min} exceeds maximum capacity {max}"
            )));
        }
    }
    if let Some(min) = min.filter(|min| desired < *min) {
        return Err(out_of_range("min", min));
    }
    if let Some(max) = max.filter(|max| desired > *max) {
        return Err(out_of_range("max", max));
    }
    Ok(())
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
