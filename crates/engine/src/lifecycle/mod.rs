// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Muppet Lifecycle Service.
//!
//! Composes the State Manager, GitHub Manager, Infrastructure Manager,
//! Deployment Service, steering distribution and TLS configuration into the
//! create, delete and status workflows. Steps within one workflow run
//! strictly in order; workflows on the same muppet name are serialised by
//! [`MuppetLocks`].

mod create;
mod delete;
mod status;

pub use create::{CreateRequest, CreateResult};
pub use delete::{DeleteRequest, DeleteResult, DeleteStep, FailedStep};
pub use status::{assess_health, Facet, HealthAssessment, HealthLevel, MuppetStatusReport};

use std::sync::Arc;

use muppet_adapters::TemplateRenderer;
use muppet_core::{Muppet, PlatformError};
use tracing::warn;

use crate::config::PlatformConfig;
use crate::deployment::DeploymentService;
use crate::github::GitHubManager;
use crate::infrastructure::InfrastructureManager;
use crate::locks::MuppetLocks;
use crate::state::{RefreshSummary, StateManager};
use crate::steering::SteeringDistributor;
use crate::tls::TlsConfigurator;

pub struct MuppetLifecycle {
    pub(crate) config: Arc<PlatformConfig>,
    pub(crate) state: Arc<StateManager>,
    pub(crate) infrastructure: Arc<InfrastructureManager>,
    pub(crate) deployment: Arc<DeploymentService>,
    pub(crate) github: Arc<GitHubManager>,
    pub(crate) steering: SteeringDistributor,
    pub(crate) tls: TlsConfigurator,
    pub(crate) templates: Arc<dyn TemplateRenderer>,
    pub(crate) locks: MuppetLocks,
}

impl MuppetLifecycle {
    /// Every known muppet, sorted by name.
    pub fn list_muppets(&self) -> Result<Vec<Muppet>, PlatformError> {
        let mut muppets = self.state.get_state()?.muppets.clone();
        muppets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(muppets)
    }

    pub async fn refresh(&self) -> Result<RefreshSummary, PlatformError> {
        self.state.refresh_state().await
    }

    pub async fn list_templates(&self) -> Result<Vec<String>, PlatformError> {
        let mut templates = self.templates.list_templates().await?;
        templates.sort();
        Ok(templates)
    }

    /// Push a muppet's status to GitHub, logging instead of failing.
    async fn publish_status(&self, muppet: &Muppet) -> Result<(), PlatformError> {
        let result = self.github.sync_status(muppet).await;
        if let Err(e) = &result {
            warn!(
                muppet = %muppet.name,
                status = %muppet.status,
                error = %e,
                "failed to sync status to GitHub"
            );
        }
        result
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
