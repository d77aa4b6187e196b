// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muppet-engine: state reconstruction, Terraform workflow and the muppet
//! lifecycle orchestration built on top of the adapters.

pub mod config;
pub mod deployment;
pub mod github;
pub mod infrastructure;
pub mod lifecycle;
pub mod locks;
pub mod platform;
pub mod state;
pub mod steering;
pub mod tls;

#[cfg(test)]
mod test_helpers;

pub use config::{PlatformConfig, TeamGrant};
pub use deployment::{DeployRequest, DeploymentOutcome, DeploymentService};
pub use github::{GitHubManager, RepositoryInfo, RepositoryRequest, RepositorySetup, SetupWarning};
pub use infrastructure::InfrastructureManager;
pub use lifecycle::{
    CreateRequest, CreateResult, DeleteRequest, DeleteResult, DeleteStep, Facet, FailedStep,
    HealthAssessment, HealthLevel, MuppetLifecycle, MuppetStatusReport,
};
pub use locks::MuppetLocks;
pub use platform::{Adapters, Platform};
pub use state::{RefreshSummary, StateManager, StateSource};
pub use steering::{SteeringDistributor, SteeringManifest, SteeringSetup};
pub use tls::{TlsConfig, TlsConfigurator};
