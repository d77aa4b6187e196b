// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared AWS SDK plumbing.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use muppet_core::PlatformError;
use thiserror::Error;

/// Errors from AWS service calls
#[derive(Debug, Error)]
pub enum AwsError {
    #[error("{service} {operation} failed: {message}")]
    Request { service: &'static str, operation: &'static str, message: String },
    #[error("unexpected {service} response: {message}")]
    Response { service: &'static str, message: String },
}

impl AwsError {
    /// Wrap an SDK error, keeping the full source chain in the message.
    pub(crate) fn request<E>(service: &'static str, operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        AwsError::Request {
            service,
            operation,
            message: aws_sdk_ssm::error::DisplayErrorContext(err).to_string(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            AwsError::Request { service, .. } | AwsError::Response { service, .. } => service,
        }
    }
}

impl From<AwsError> for PlatformError {
    fn from(e: AwsError) -> Self {
        let service = e.service();
        PlatformError::aws(e.to_string()).with_detail("service", service)
    }
}

/// Load SDK configuration from the default credential chain for `region`.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
