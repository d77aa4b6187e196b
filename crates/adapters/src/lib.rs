// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external systems the platform drives: GitHub, AWS
//! Parameter Store, ECS, the Terraform CLI and the template tree on disk.
//!
//! Each adapter is a trait with one production implementation and, behind
//! the `test-support` feature, an in-memory fake.

pub mod aws;
pub mod orchestrator;
pub mod param_store;
pub mod source_control;
pub mod template;
pub mod terraform;

pub use aws::{load_sdk_config, AwsError};
pub use orchestrator::{ContainerOrchestrator, EcsOrchestrator, ServiceInfo};
pub use param_store::{ParameterStore, SsmParameterStore};
pub use source_control::{
    BranchProtection, CreateRepoOptions, GitHubClient, GitHubError, RepoMetadata, RepoPermission,
    SourceControl, Tag,
};
pub use template::{
    collect_files, FileContent, FileMap, FsTemplateRenderer, TemplateError, TemplateRenderer,
};
pub use terraform::{CliTerraformRunner, CommandOutput, TerraformError, TerraformRunner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use orchestrator::FakeOrchestrator;
#[cfg(any(test, feature = "test-support"))]
pub use param_store::FakeParameterStore;
#[cfg(any(test, feature = "test-support"))]
pub use source_control::{FakeSourceControl, ScmCall};
#[cfg(any(test, feature = "test-support"))]
pub use template::FakeTemplateRenderer;
#[cfg(any(test, feature = "test-support"))]
pub use terraform::{FakeTerraformRunner, TerraformCall};
