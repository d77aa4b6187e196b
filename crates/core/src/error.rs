// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform error taxonomy.
//!
//! Every failure that leaves an engine operation is a [`PlatformError`].
//! Adapters convert their provider-specific errors into one of the
//! external-system variants and keep the original detail in `details`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-form diagnostic detail attached to an error.
pub type ErrorDetails = BTreeMap<String, String>;

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Caller-supplied input violates a precondition.
    #[error("validation failed: {message}")]
    Validation { message: String, details: ErrorDetails },

    #[error("not found: {message}")]
    NotFound { message: String, details: ErrorDetails },

    /// The target exists but is in a state that forbids the operation.
    #[error("conflict: {message}")]
    Conflict { message: String, details: ErrorDetails },

    #[error("GitHub error: {message}")]
    GitHub { message: String, details: ErrorDetails },

    #[error("AWS error: {message}")]
    Aws { message: String, details: ErrorDetails },

    #[error("infrastructure error: {message}")]
    Infrastructure { message: String, details: ErrorDetails },

    #[error("deployment error: {message}")]
    Deployment { message: String, details: ErrorDetails },

    #[error("platform state not initialized")]
    NotInitialized,

    #[error("platform state initialization failed: {message}")]
    Initialization { message: String, details: ErrorDetails },

    #[error("internal error: {message}")]
    Internal { message: String, details: ErrorDetails },
}

impl PlatformError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn github(message: impl Into<String>) -> Self {
        Self::GitHub { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn aws(message: impl Into<String>) -> Self {
        Self::Aws { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn deployment(message: impl Into<String>) -> Self {
        Self::Deployment { message: message.into(), details: ErrorDetails::new() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), details: ErrorDetails::new() }
    }

    /// Attach a detail entry. No-op for `NotInitialized`, which carries none.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(details) = self.details_mut() {
            details.insert(key.into(), value.into());
        }
        self
    }

    /// Machine-readable error kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::GitHub { .. } => "github_error",
            Self::Aws { .. } => "aws_error",
            Self::Infrastructure { .. } => "infrastructure_error",
            Self::Deployment { .. } => "deployment_error",
            Self::NotInitialized => "state_not_initialized",
            Self::Initialization { .. } => "state_initialization_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// HTTP-style status code for API layers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::GitHub { .. } | Self::Aws { .. } => 502,
            Self::NotInitialized | Self::Initialization { .. } => 503,
            Self::Infrastructure { .. } | Self::Deployment { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Whether the caller is at fault (4xx class).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::GitHub { message, .. }
            | Self::Aws { message, .. }
            | Self::Infrastructure { message, .. }
            | Self::Deployment { message, .. }
            | Self::Initialization { message, .. }
            | Self::Internal { message, .. } => message.clone(),
            Self::NotInitialized => "platform state not initialized".to_string(),
        }
    }

    pub fn details(&self) -> ErrorDetails {
        match self {
            Self::NotInitialized => ErrorDetails::new(),
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::GitHub { details, .. }
            | Self::Aws { details, .. }
            | Self::Infrastructure { details, .. }
            | Self::Deployment { details, .. }
            | Self::Initialization { details, .. }
            | Self::Internal { details, .. } => details.clone(),
        }
    }

    fn details_mut(&mut self) -> Option<&mut ErrorDetails> {
        match self {
            Self::NotInitialized => None,
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::GitHub { details, .. }
            | Self::Aws { details, .. }
            | Self::Infrastructure { details, .. }
            | Self::Deployment { details, .. }
            | Self::Initialization { details, .. }
            | Self::Internal { details, .. } => Some(details),
        }
    }

    /// Structured body for API responses.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error_type: self.error_type().to_string(),
            message: self.message(),
            details: self.details(),
        }
    }
}

/// `{error_type, message, details}` as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_type: String,
    pub message: String,
    #[serde(default)]
    pub details: ErrorDetails,
}

impl From<std::io::Error> for PlatformError {
    fn from(e: std::io::Error) -> Self {
        PlatformError::internal(e.to_string()).with_detail("io_kind", format!("{:?}", e.kind()))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
