// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use muppet_adapters::collect_files;
use muppet_core::{
    validate_muppet_name, validate_template_name, Muppet, MuppetStatus, PlatformError,
};
use serde::Serialize;
use tracing::{info, warn};

use super::MuppetLifecycle;
use crate::deployment::{DeployRequest, DeploymentOutcome};
use crate::github::{RepositoryRequest, RepositorySetup, SetupWarning};
use crate::steering::SteeringSetup;
use crate::tls::TlsConfig;

#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub name: String,
    pub template: String,
    pub description: String,
    pub auto_deploy: bool,
    pub enable_tls: bool,
    pub deployment: DeployRequest,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self { name: name.into(), template: template.into(), enable_tls: true, ..Self::default() }
    }
}

/// Outcome of a creation that got past repository setup.
///
/// `success` is true even when the deployment sub-step failed; the
/// repository and code exist and `deployment_error` says what went wrong.
#[derive(Debug, Clone, Serialize)]
pub struct CreateResult {
    pub success: bool,
    pub muppet: Muppet,
    pub repository: RepositorySetup,
    pub steering: SteeringSetup,
    pub tls: Option<TlsConfig>,
    pub tls_error: Option<String>,
    pub deployment: Option<DeploymentOutcome>,
    pub deployment_error: Option<String>,
    /// Non-fatal problems outside repository setup
    pub warnings: Vec<SetupWarning>,
}

impl MuppetLifecycle {
    /// Create a muppet: repository, steering docs, optionally TLS and a
    /// deployment.
    ///
    /// The muppet is visible in state as `Creating` from the moment input
    /// is validated. Any error returned after that point removes it again.
    pub async fn create_muppet(
        &self,
        request: CreateRequest,
    ) -> Result<CreateResult, PlatformError> {
        validate_muppet_name(&request.name)?;
        validate_template_name(&request.template)?;
        let _guard = self.locks.lock(&request.name).await;

        let templates = self.templates.list_templates().await?;
        if !templates.contains(&request.template) {
            return Err(PlatformError::validation(format!(
                "unknown template '{}'",
                request.template
            ))
            .with_detail("template", request.template.clone())
            .with_detail("available", templates.join(",")));
        }
        if self.state.get_muppet(&request.name)?.is_some() {
            return Err(PlatformError::validation(format!(
                "muppet '{}' already exists",
                request.name
            ))
            .with_detail("muppet", request.name.clone()));
        }

        let repo_url = self.config.repo_url(&request.name);
        let muppet =
            Muppet::new(&request.name, &request.template, repo_url).port(self.config.default_port);
        self.state.add_muppet_to_state(muppet.clone())?;
        info!(muppet = %request.name, template = %request.template, "creating muppet");

        match self.run_create(muppet, &request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    muppet = %request.name,
                    error = %e,
                    "muppet creation failed, removing from state"
                );
                if let Err(cleanup) = self.state.remove_muppet_from_state(&request.name) {
                    warn!(
                        muppet = %request.name,
                        error = %cleanup,
                        "failed to remove muppet from state"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_create(
        &self,
        mut muppet: Muppet,
        request: &CreateRequest,
    ) -> Result<CreateResult, PlatformError> {
        let files = {
            let scratch = tempfile::tempdir().map_err(|e| {
                PlatformError::internal(format!("cannot create scratch directory: {e}"))
            })?;
            let parameters = self.template_parameters(&muppet, request);
            let generated = self
                .templates
                .generate(&request.template, &muppet.name, &parameters, scratch.path())
                .await?;
            collect_files(&generated).await?
        };
        info!(muppet = %muppet.name, files = files.len(), "code generated");

        let repository = self
            .github
            .create_muppet_repository(RepositoryRequest {
                name: muppet.name.clone(),
                template: request.template.clone(),
                description: request.description.clone(),
                files,
                status: muppet.status,
                port: muppet.port,
            })
            .await?;
        muppet.github_repo_url = repository.repository.html_url.clone();
        self.state.add_muppet_to_state(muppet.clone())?;

        let steering = self.steering.distribute(&muppet).await;

        let (tls, tls_error) = if request.enable_tls {
            match self.tls.configure(&muppet.name).await {
                Ok(tls) => (Some(tls), None),
                Err(e) if request.auto_deploy => return Err(e),
                Err(e) => {
                    warn!(muppet = %muppet.name, error = %e, "TLS configuration failed");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        let mut deployment = None;
        let mut deployment_error = None;
        if request.auto_deploy {
            let mut deploy = request.deployment.clone();
            for (key, value) in tls.iter().flat_map(TlsConfig::terraform_variables) {
                deploy.variables.entry(key.to_string()).or_insert(value);
            }
            let versions = self.state.get_state()?.terraform_versions.clone();
            match self.deployment.deploy_muppet(&mut muppet, &deploy, &versions).await {
                Ok(outcome) => deployment = Some(outcome),
                Err(e) => {
                    warn!(muppet = %muppet.name, error = %e, "auto-deploy failed");
                    muppet.transition_to(MuppetStatus::Error)?;
                    deployment_error = Some(e.to_string());
                }
            }
        } else {
            muppet.transition_to(MuppetStatus::Stopped)?;
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.publish_status(&muppet).await {
            warnings.push(SetupWarning::new("status_sync", e));
        }
        self.state.add_muppet_to_state(muppet.clone())?;
        info!(muppet = %muppet.name, status = %muppet.status, "muppet created");

        Ok(CreateResult {
            success: true,
            muppet,
            repository,
            steering,
            tls,
            tls_error,
            deployment,
            deployment_error,
            warnings,
        })
    }

    fn template_parameters(
        &self,
        muppet: &Muppet,
        request: &CreateRequest,
    ) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("muppet_name".to_string(), muppet.name.clone()),
            ("description".to_string(), request.description.clone()),
            ("port".to_string(), muppet.port.to_string()),
            ("template".to_string(), request.template.clone()),
            ("github_org".to_string(), self.config.github_org.clone()),
            ("aws_region".to_string(), self.config.aws_region.clone()),
        ])
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
