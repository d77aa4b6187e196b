// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Construction of the whole component graph from one set of adapters.

use std::sync::Arc;

use muppet_adapters::{
    ContainerOrchestrator, ParameterStore, SourceControl, TemplateRenderer, TerraformRunner,
};

use crate::config::PlatformConfig;
use crate::deployment::DeploymentService;
use crate::github::GitHubManager;
use crate::infrastructure::InfrastructureManager;
use crate::lifecycle::MuppetLifecycle;
use crate::locks::MuppetLocks;
use crate::state::StateManager;
use crate::steering::SteeringDistributor;
use crate::tls::TlsConfigurator;

/// The external systems the platform talks to.
pub struct Adapters {
    pub scm: Arc<dyn SourceControl>,
    pub params: Arc<dyn ParameterStore>,
    pub ecs: Arc<dyn ContainerOrchestrator>,
    pub terraform: Arc<dyn TerraformRunner>,
    pub templates: Arc<dyn TemplateRenderer>,
}

/// Every engine component, wired once at start-up.
pub struct Platform {
    pub config: Arc<PlatformConfig>,
    pub state: Arc<StateManager>,
    pub infrastructure: Arc<InfrastructureManager>,
    pub deployment: Arc<DeploymentService>,
    pub github: Arc<GitHubManager>,
    pub templates: Arc<dyn TemplateRenderer>,
    pub lifecycle: MuppetLifecycle,
}

impl Platform {
    pub fn new(config: PlatformConfig, adapters: Adapters) -> Self {
        let config = Arc::new(config);
        let Adapters { scm, params, ecs, terraform, templates } = adapters;

        let state = Arc::new(StateManager::new(
            Arc::clone(&config),
            Arc::clone(&scm),
            Arc::clone(&params),
            Arc::clone(&ecs),
        ));
        let infrastructure = Arc::new(InfrastructureManager::new(
            config.workspace_root.clone(),
            config.module_source.clone(),
            terraform,
        ));
        let github = Arc::new(GitHubManager::new(Arc::clone(&config), Arc::clone(&scm)));
        let deployment = Arc::new(DeploymentService::new(
            Arc::clone(&config),
            Arc::clone(&infrastructure),
            Arc::clone(&github),
            Arc::clone(&params),
            ecs,
        ));
        let lifecycle = MuppetLifecycle {
            config: Arc::clone(&config),
            state: Arc::clone(&state),
            infrastructure: Arc::clone(&infrastructure),
            deployment: Arc::clone(&deployment),
            github: Arc::clone(&github),
            steering: SteeringDistributor::new(Arc::clone(&config), scm),
            tls: TlsConfigurator::new(Arc::clone(&config), params),
            templates: Arc::clone(&templates),
            locks: MuppetLocks::new(),
        };

        Self { config, state, infrastructure, deployment, github, templates, lifecycle }
    }
}
