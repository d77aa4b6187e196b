// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-muppet infrastructure provisioning record.
//!
//! A `DeploymentState` is never stored; it is recomputed from the Terraform
//! workspace on disk every time it is asked for.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Destroyed,
}

crate::simple_display! {
    DeploymentStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
        Destroyed => "destroyed",
    }
}

/// Terraform sub-command that last ran (or was inferred) for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerraformOperation {
    Init,
    Validate,
    Plan,
    Apply,
    Destroy,
}

crate::simple_display! {
    TerraformOperation {
        Init => "init",
        Validate => "validate",
        Plan => "plan",
        Apply => "apply",
        Destroy => "destroy",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentState {
    pub muppet_name: String,
    pub status: DeploymentStatus,
    /// `None` once the workspace is gone.
    pub terraform_workspace: Option<PathBuf>,
    pub last_operation: Option<TerraformOperation>,
    #[serde(default)]
    pub outputs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DeploymentState {
    pub fn new(muppet_name: impl Into<String>, status: DeploymentStatus) -> Self {
        Self {
            muppet_name: muppet_name.into(),
            status,
            terraform_workspace: None,
            last_operation: None,
            outputs: BTreeMap::new(),
            error_message: None,
        }
    }

    /// No workspace, nothing to destroy.
    pub fn destroyed(muppet_name: impl Into<String>) -> Self {
        Self::new(muppet_name, DeploymentStatus::Destroyed)
    }

    pub fn failed(
        muppet_name: impl Into<String>,
        workspace: PathBuf,
        operation: TerraformOperation,
        error: impl Into<String>,
    ) -> Self {
        Self {
            terraform_workspace: Some(workspace),
            last_operation: Some(operation),
            error_message: Some(error.into()),
            ..Self::new(muppet_name, DeploymentStatus::Failed)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == DeploymentStatus::Completed
    }

    /// String value of a Terraform output, if present.
    pub fn output_str(&self, key: &str) -> Option<String> {
        match self.outputs.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
