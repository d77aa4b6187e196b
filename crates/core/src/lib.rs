// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muppet-core: data model and error taxonomy for the Muppet Platform

pub mod macros;

pub mod deployment;
pub mod error;
pub mod infra;
pub mod muppet;
pub mod state;
pub mod topics;
pub mod validate;

pub use deployment::{DeploymentState, DeploymentStatus, TerraformOperation};
pub use error::{ErrorBody, ErrorDetails, PlatformError};
pub use infra::{FargateConfig, InfrastructureConfig, MonitoringConfig, VpcConfig};
#[cfg(any(test, feature = "test-support"))]
pub use muppet::MuppetBuilder;
pub use muppet::{Muppet, MuppetStatus, DEFAULT_PORT};
pub use state::{PlatformHealth, PlatformState, StatusTransition};
pub use validate::{validate_muppet_name, validate_template_name};
