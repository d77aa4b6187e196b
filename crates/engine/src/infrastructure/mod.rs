// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Infrastructure Manager: the per-muppet Terraform workflow.
//!
//! Each muppet owns one workspace directory under the workspace root. The
//! directory and the Terraform state file inside it are the only record of
//! deployment status; [`InfrastructureManager::get_deployment_status`]
//! recomputes it on every call.

mod files;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use muppet_adapters::TerraformRunner;
use muppet_core::{
    validate_muppet_name, DeploymentState, DeploymentStatus, InfrastructureConfig, PlatformError,
    TerraformOperation,
};
use serde_json::Value;
use tracing::{info, warn};

pub const STATE_FILE: &str = "terraform.tfstate";
pub const LOCK_FILE: &str = ".terraform.tfstate.lock.info";
pub const TFVARS_FILE: &str = "terraform.tfvars";
pub const PLAN_FILE: &str = "tfplan";

/// Deploy workflow, stopping at the first failing step
const DEPLOY_STEPS: [(TerraformOperation, &[&str]); 4] = [
    (TerraformOperation::Init, &["init", "-no-color", "-input=false"]),
    (TerraformOperation::Validate, &["validate", "-no-color"]),
    (
        TerraformOperation::Plan,
        &["plan", "-no-color", "-input=false", "-var-file=terraform.tfvars", "-out=tfplan"],
    ),
    (TerraformOperation::Apply, &["apply", "-no-color", "-auto-approve", "tfplan"]),
];

const DESTROY_ARGS: &[&str] =
    &["destroy", "-no-color", "-auto-approve", "-var-file=terraform.tfvars"];
const OUTPUT_ARGS: &[&str] = &["output", "-no-color", "-json"];

pub struct InfrastructureManager {
    workspace_root: PathBuf,
    module_source: String,
    terraform: Arc<dyn TerraformRunner>,
}

impl InfrastructureManager {
    pub fn new(
        workspace_root: impl Into<PathBuf>,
        module_source: impl Into<String>,
        terraform: Arc<dyn TerraformRunner>,
    ) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            module_source: module_source.into(),
            terraform,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn workspace_path(&self, muppet_name: &str) -> PathBuf {
        self.workspace_root.join(muppet_name)
    }

    /// Generate the workspace and run init, validate, plan and apply.
    ///
    /// A failing Terraform step is reported as a `Failed` state carrying the
    /// command's error output. `Err` is reserved for problems before Terraform
    /// runs (invalid name, unwritable workspace).
    pub async fn deploy_infrastructure(
        &self,
        config: &InfrastructureConfig,
    ) -> Result<DeploymentState, PlatformError> {
        let name = config.muppet_name.as_str();
        validate_muppet_name(name)?;
        let workspace = self.workspace_path(name);
        self.write_workspace(&workspace, config).await?;
        info!(muppet = %name, workspace = %workspace.display(), "deploying infrastructure");

        for (operation, args) in DEPLOY_STEPS {
            if let Err(message) = self.run_step(&workspace, args).await {
                warn!(muppet = %name, %operation, error = %message, "terraform step failed");
                return Ok(DeploymentState::failed(name, workspace, operation, message));
            }
        }

        let outputs = match self.read_outputs(&workspace).await {
            Ok(outputs) => outputs,
            Err(message) => {
                warn!(muppet = %name, error = %message, "could not read terraform outputs");
                BTreeMap::new()
            }
        };
        info!(muppet = %name, outputs = outputs.len(), "infrastructure deployed");
        Ok(DeploymentState {
            terraform_workspace: Some(workspace),
            last_operation: Some(TerraformOperation::Apply),
            outputs,
            ..DeploymentState::new(name, DeploymentStatus::Completed)
        })
    }

    /// Destroy a muppet's infrastructure and remove its workspace.
    ///
    /// Without a workspace there is nothing to destroy and Terraform is not
    /// invoked, so calling this twice is harmless.
    pub async fn destroy_infrastructure(
        &self,
        muppet_name: &str,
    ) -> Result<DeploymentState, PlatformError> {
        validate_muppet_name(muppet_name)?;
        let workspace = self.workspace_path(muppet_name);
        if !exists(&workspace).await {
            return Ok(DeploymentState::destroyed(muppet_name));
        }

        let has_vars = exists(&workspace.join(TFVARS_FILE)).await;
        let args: &[&str] = if has_vars { DESTROY_ARGS } else { &DESTROY_ARGS[..3] };
        if let Err(message) = self.run_step(&workspace, args).await {
            warn!(muppet = %muppet_name, error = %message, "terraform destroy failed");
            return Ok(DeploymentState::failed(
                muppet_name,
                workspace,
                TerraformOperation::Destroy,
                message,
            ));
        }

        if let Err(e) = tokio::fs::remove_dir_all(&workspace).await {
            warn!(muppet = %muppet_name, error = %e, "failed to remove workspace, ignoring");
        }
        info!(muppet = %muppet_name, "infrastructure destroyed");
        Ok(DeploymentState {
            last_operation: Some(TerraformOperation::Destroy),
            ..DeploymentState::destroyed(muppet_name)
        })
    }

    /// Infer status from the workspace on disk.
    pub async fn get_deployment_status(
        &self,
        muppet_name: &str,
    ) -> Result<DeploymentState, PlatformError> {
        validate_muppet_name(muppet_name)?;
        let workspace = self.workspace_path(muppet_name);
        if !exists(&workspace).await {
            return Ok(DeploymentState::destroyed(muppet_name));
        }

        let in_workspace = |status| DeploymentState {
            terraform_workspace: Some(workspace.clone()),
            ..DeploymentState::new(muppet_name, status)
        };
        if exists(&workspace.join(LOCK_FILE)).await {
            return Ok(in_workspace(DeploymentStatus::InProgress));
        }
        if !exists(&workspace.join(STATE_FILE)).await {
            return Ok(in_workspace(DeploymentStatus::Pending));
        }

        Ok(match self.read_outputs(&workspace).await {
            Ok(outputs) => DeploymentState { outputs, ..in_workspace(DeploymentStatus::Completed) },
            Err(message) => DeploymentState {
                error_message: Some(message),
                ..in_workspace(DeploymentStatus::Failed)
            },
        })
    }

    /// Names of every muppet that has a workspace.
    pub async fn list_workspaces(&self) -> Result<Vec<String>, PlatformError> {
        let mut entries = match tokio::fs::read_dir(&self.workspace_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.workspace_root, e)),
        };
        let mut names = Vec::new();
        while let Some(entry) =
            entries.next_entry().await.map_err(|e| io_error(&self.workspace_root, e))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn write_workspace(
        &self,
        workspace: &Path,
        config: &InfrastructureConfig,
    ) -> Result<(), PlatformError> {
        let generated = files::render(config, &self.module_source).map_err(|e| {
            PlatformError::infrastructure(format!("failed to render terraform configuration: {e}"))
                .with_detail("muppet", config.muppet_name.clone())
        })?;
        tokio::fs::create_dir_all(workspace).await.map_err(|e| io_error(workspace, e))?;
        for (file, content) in generated.entries() {
            let path = workspace.join(file);
            tokio::fs::write(&path, content).await.map_err(|e| io_error(&path, e))?;
        }
        Ok(())
    }

    /// Run one command; `Err` carries the text to report.
    async fn run_step(&self, workspace: &Path, args: &[&str]) -> Result<(), String> {
        match self.terraform.run(workspace, args).await {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => Err(output.error_text()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn read_outputs(&self, workspace: &Path) -> Result<BTreeMap<String, Value>, String> {
        let output = self.terraform.run(workspace, OUTPUT_ARGS).await.map_err(|e| e.to_string())?;
        if !output.success() {
            return Err(output.error_text());
        }
        parse_outputs(&output.stdout).map_err(|e| format!("invalid terraform output: {e}"))
    }
}

/// Flatten `terraform output -json` (`{name: {value, type, sensitive}}`).
pub(crate) fn parse_outputs(stdout: &str) -> Result<BTreeMap<String, Value>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let raw: BTreeMap<String, Value> = serde_json::from_str(stdout)?;
    Ok(raw
        .into_iter()
        .map(|(name, entry)| match entry {
            Value::Object(mut fields) => (name, fields.remove("value").unwrap_or(Value::Null)),
            other => (name, other),
        })
        .collect())
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn io_error(path: &Path, e: std::io::Error) -> PlatformError {
    PlatformError::infrastructure(format!("workspace I/O failed: {e}"))
        .with_detail("path", path.display().to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
