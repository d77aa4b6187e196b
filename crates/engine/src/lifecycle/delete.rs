// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use muppet_core::{
    validate_muppet_name, DeploymentState, DeploymentStatus, Muppet, MuppetStatus, PlatformError,
};
use serde::Serialize;
use tracing::{info, warn};

use super::MuppetLifecycle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub name: String,
    pub force: bool,
    pub cleanup_github: bool,
    pub cleanup_infrastructure: bool,
}

impl DeleteRequest {
    /// Full cleanup, not forced.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), force: false, cleanup_github: true, cleanup_infrastructure: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStep {
    UndeployFargate,
    DestroyInfrastructure,
    DeleteRepository,
    RemoveFromState,
}

muppet_core::simple_display! {
    DeleteStep {
        UndeployFargate => "undeploy_fargate",
        DestroyInfrastructure => "destroy_infrastructure",
        DeleteRepository => "delete_repository",
        RemoveFromState => "remove_from_state",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedStep {
    pub step: DeleteStep,
    pub error: String,
}

/// Per-step accounting of a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub muppet_name: String,
    pub success: bool,
    pub steps_completed: Vec<DeleteStep>,
    pub steps_failed: Vec<FailedStep>,
}

impl DeleteResult {
    fn new(muppet_name: &str) -> Self {
        Self {
            muppet_name: muppet_name.to_string(),
            success: false,
            steps_completed: Vec::new(),
            steps_failed: Vec::new(),
        }
    }

    /// Record a step; hands the error back when it failed.
    fn record<T>(
        &mut self,
        step: DeleteStep,
        outcome: Result<T, PlatformError>,
    ) -> Option<PlatformError> {
        match outcome {
            Ok(_) => {
                self.steps_completed.push(step);
                None
            }
            Err(e) => {
                warn!(muppet = %self.muppet_name, %step, error = %e, "deletion step failed");
                self.steps_failed.push(FailedStep { step, error: e.to_string() });
                Some(e)
            }
        }
    }
}

impl MuppetLifecycle {
    /// Delete a muppet, accounting for each cleanup step.
    ///
    /// Removal from in-memory state is always attempted. Without `force`, the
    /// first failing cleanup step skips the remaining external steps, marks
    /// the repository `error` and returns that step's error. With `force`,
    /// every step runs and failures are only recorded.
    pub async fn delete_muppet(
        &self,
        request: DeleteRequest,
    ) -> Result<DeleteResult, PlatformError> {
        validate_muppet_name(&request.name)?;
        let _guard = self.locks.lock(&request.name).await;

        let Some(mut muppet) = self.state.get_muppet(&request.name)? else {
            return Err(PlatformError::validation(format!(
                "muppet '{}' does not exist",
                request.name
            ))
            .with_detail("muppet", request.name.clone()));
        };
        if muppet.status == MuppetStatus::Creating && !request.force {
            return Err(PlatformError::conflict(format!(
                "muppet '{}' is still being created; use force to delete it",
                request.name
            ))
            .with_detail("muppet", request.name.clone())
            .with_detail("status", muppet.status.to_string()));
        }

        muppet.transition_to(MuppetStatus::Deleting)?;
        self.state.add_muppet_to_state(muppet.clone())?;
        let _ = self.publish_status(&muppet).await;
        info!(muppet = %muppet.name, force = request.force, "deleting muppet");

        let mut result = DeleteResult::new(&muppet.name);
        let mut aborted: Option<PlatformError> = None;

        if request.cleanup_infrastructure && muppet.is_deployed() {
            let outcome = self.deployment.undeploy_muppet(&mut muppet).await;
            aborted =
                result.record(DeleteStep::UndeployFargate, outcome).filter(|_| !request.force);
        }

        if aborted.is_none() && request.cleanup_infrastructure {
            let outcome = self.destroy_workspace(&muppet.name).await;
            aborted = result
                .record(DeleteStep::DestroyInfrastructure, outcome)
                .filter(|_| !request.force);
        }

        if aborted.is_none() && request.cleanup_github {
            let outcome = self.github.delete_repository(&muppet.name).await;
            aborted =
                result.record(DeleteStep::DeleteRepository, outcome).filter(|_| !request.force);
        }

        let removed = self.state.remove_muppet_from_state(&muppet.name);
        result.record(DeleteStep::RemoveFromState, removed);

        if let Some(cause) = aborted {
            return Err(self.abort_delete(muppet, &result, cause).await);
        }

        result.success = result.steps_failed.is_empty();
        info!(
            muppet = %muppet.name,
            success = result.success,
            failed = result.steps_failed.len(),
            "muppet deletion finished"
        );
        Ok(result)
    }

    /// Destroy the workspace, treating a `Failed` Terraform result as an error.
    async fn destroy_workspace(&self, name: &str) -> Result<DeploymentState, PlatformError> {
        let state = self.infrastructure.destroy_infrastructure(name).await?;
        if state.status == DeploymentStatus::Failed {
            let message =
                state.error_message.unwrap_or_else(|| "terraform destroy failed".to_string());
            return Err(PlatformError::infrastructure(message).with_detail("muppet", name));
        }
        Ok(state)
    }

    /// Mark the repository `error` and build the error to return.
    async fn abort_delete(
        &self,
        mut muppet: Muppet,
        result: &DeleteResult,
        cause: PlatformError,
    ) -> PlatformError {
        if muppet.transition_to(MuppetStatus::Error).is_ok() {
            let _ = self.publish_status(&muppet).await;
        }
        let completed: Vec<String> =
            result.steps_completed.iter().map(ToString::to_string).collect();
        let failed = result.steps_failed.first().map(|f| f.step.to_string()).unwrap_or_default();
        let removed = result.steps_completed.contains(&DeleteStep::RemoveFromState);
        warn!(muppet = %muppet.name, failed_step = %failed, removed, "muppet deletion aborted");
        cause
            .with_detail("muppet", muppet.name)
            .with_detail("failed_step", failed)
            .with_detail("steps_completed", completed.join(","))
            .with_detail("removed_from_state", removed.to_string())
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
