// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use muppet_adapters::ServiceInfo;
use muppet_core::{
    validate_muppet_name, DeploymentState, DeploymentStatus, Muppet, MuppetStatus, PlatformError,
};
use serde::Serialize;

use super::MuppetLifecycle;
use crate::github::RepositoryInfo;
use crate::steering::SteeringManifest;

/// One independently-fetched part of a status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Facet<T> {
    Available(T),
    Unavailable { error: String },
}

impl<T> Facet<T> {
    fn from_result(result: Result<T, PlatformError>) -> Self {
        match result {
            Ok(value) => Facet::Available(value),
            Err(e) => Facet::Unavailable { error: e.to_string() },
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Facet::Available(value) => Some(value),
            Facet::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Facet::Unavailable { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Unhealthy,
    Critical,
}

muppet_core::simple_display! {
    HealthLevel {
        Healthy => "healthy",
        Degraded => "degraded",
        Unhealthy => "unhealthy",
        Critical => "critical",
    }
}

impl HealthLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            HealthLevel::Healthy
        } else if score >= 0.5 {
            HealthLevel::Degraded
        } else if score >= 0.2 {
            HealthLevel::Unhealthy
        } else {
            HealthLevel::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    pub score: f64,
    pub level: HealthLevel,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MuppetStatusReport {
    pub muppet: Muppet,
    pub github: Facet<Option<RepositoryInfo>>,
    pub service: Facet<Option<ServiceInfo>>,
    pub infrastructure: Facet<DeploymentState>,
    pub steering: Facet<Option<SteeringManifest>>,
    pub health: HealthAssessment,
}

/// Start from 1.0 and multiply in a penalty per problem found.
pub fn assess_health(
    muppet: &Muppet,
    github: &Facet<Option<RepositoryInfo>>,
    service: &Facet<Option<ServiceInfo>>,
    infrastructure: &Facet<DeploymentState>,
) -> HealthAssessment {
    let mut score = 1.0;
    let mut issues = Vec::new();
    let mut penalise = |factor: f64, issue: String| {
        score *= factor;
        issues.push(issue);
    };

    match muppet.status {
        MuppetStatus::Error => penalise(0.0, "muppet is in error state".to_string()),
        MuppetStatus::Deleting => penalise(0.0, "muppet is being deleted".to_string()),
        MuppetStatus::Creating => penalise(0.5, "muppet is still being created".to_string()),
        MuppetStatus::Running | MuppetStatus::Stopped => {}
    }

    match github {
        Facet::Unavailable { error } => penalise(0.5, format!("repository unavailable: {error}")),
        Facet::Available(None) => penalise(0.5, "repository not found".to_string()),
        Facet::Available(Some(_)) => {}
    }

    match service {
        Facet::Unavailable { error } => {
            penalise(0.3, format!("deployment status unavailable: {error}"))
        }
        Facet::Available(Some(s)) if s.running_count < s.desired_count => penalise(
            0.5,
            format!("{} of {} tasks running", s.running_count, s.desired_count),
        ),
        Facet::Available(_) => {}
    }

    match infrastructure {
        Facet::Unavailable { error } => {
            penalise(0.5, format!("infrastructure status unavailable: {error}"))
        }
        Facet::Available(state) if state.status == DeploymentStatus::Failed => penalise(
            0.3,
            format!(
                "infrastructure failed: {}",
                state.error_message.as_deref().unwrap_or("unknown error")
            ),
        ),
        Facet::Available(_) => {}
    }

    HealthAssessment { score, level: HealthLevel::from_score(score), issues }
}

impl MuppetLifecycle {
    /// Fan out to GitHub, ECS, the Terraform workspace and the steering
    /// manifest. A failing facet is reported in place without failing the
    /// whole call.
    pub async fn get_muppet_status(&self, name: &str) -> Result<MuppetStatusReport, PlatformError> {
        validate_muppet_name(name)?;
        let muppet = self.state.get_muppet(name)?.ok_or_else(|| {
            PlatformError::not_found(format!("muppet '{name}' does not exist"))
                .with_detail("muppet", name)
        })?;

        let (github, service, infrastructure, steering) = tokio::join!(
            self.github.repository_info(name),
            self.deployment.service_status(name),
            self.infrastructure.get_deployment_status(name),
            self.steering.installed_manifest(name),
        );
        let github = Facet::from_result(github);
        let service = Facet::from_result(service);
        let infrastructure = Facet::from_result(infrastructure);
        let steering = Facet::from_result(steering);

        let health = assess_health(&muppet, &github, &service, &infrastructure);
        Ok(MuppetStatusReport { muppet, github, service, infrastructure, steering, health })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
