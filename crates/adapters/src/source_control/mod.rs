// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source control adapter (GitHub organization repositories)

mod github;

pub use github::GitHubClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muppet_core::PlatformError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from source control operations
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub {operation} returned {status}: {message}")]
    Api { operation: &'static str, status: u16, message: String },
    #[error("GitHub {operation} request failed: {message}")]
    Transport { operation: &'static str, message: String },
    #[error("invalid GitHub {operation} response: {message}")]
    Decode { operation: &'static str, message: String },
    #[error("GitHub client configuration: {0}")]
    Config(String),
}

impl GitHubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    fn operation(&self) -> &'static str {
        match self {
            GitHubError::Api { operation, .. }
            | GitHubError::Transport { operation, .. }
            | GitHubError::Decode { operation, .. } => operation,
            GitHubError::Config(_) => "configure",
        }
    }
}

impl From<GitHubError> for PlatformError {
    fn from(e: GitHubError) -> Self {
        let operation = e.operation();
        let status = e.status();
        let mut err = PlatformError::github(e.to_string()).with_detail("operation", operation);
        if let Some(status) = status {
            err = err.with_detail("status", status.to_string());
        }
        err
    }
}

/// Repository metadata as reported by the organization listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Parameters for creating an organization repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepoOptions {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

impl CreateRepoOptions {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), private: true, auto_init: true }
    }
}

/// Team access level on a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoPermission {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

muppet_core::simple_display! {
    RepoPermission {
        Pull => "pull",
        Triage => "triage",
        Push => "push",
        Maintain => "maintain",
        Admin => "admin",
    }
}

/// Branch protection rules applied to the default branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProtection {
    pub required_approvals: u32,
    pub required_status_checks: Vec<String>,
    pub enforce_admins: bool,
}

impl Default for BranchProtection {
    fn default() -> Self {
        Self { required_approvals: 1, required_status_checks: Vec::new(), enforce_admins: false }
    }
}

/// A git tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit_sha: String,
}

/// Adapter for the organization that hosts muppet repositories.
///
/// Implementations are bound to a single organization; repository names are
/// unqualified.
#[async_trait]
pub trait SourceControl: Send + Sync + 'static {
    fn org(&self) -> &str;

    /// List every repository in the organization (all pages).
    async fn discover_repositories(&self) -> Result<Vec<RepoMetadata>, GitHubError>;

    /// `Ok(None)` when the repository does not exist.
    async fn get_repository(&self, name: &str) -> Result<Option<RepoMetadata>, GitHubError>;

    async fn create_repository(
        &self,
        options: &CreateRepoOptions,
    ) -> Result<RepoMetadata, GitHubError>;

    async fn replace_topics(&self, name: &str, topics: &[String]) -> Result<(), GitHubError>;

    async fn update_description(&self, name: &str, description: &str) -> Result<(), GitHubError>;

    /// Create or update a single file on the default branch.
    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), GitHubError>;

    /// Returns `false` when the repository was already gone.
    async fn delete_repository(&self, name: &str) -> Result<bool, GitHubError>;

    async fn list_tags(&self, name: &str) -> Result<Vec<Tag>, GitHubError>;

    /// `Ok(None)` when the file does not exist at `git_ref` (default branch if `None`).
    async fn get_file_content(
        &self,
        name: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Option<String>, GitHubError>;

    async fn set_team_permission(
        &self,
        name: &str,
        team: &str,
        permission: RepoPermission,
    ) -> Result<(), GitHubError>;

    async fn protect_branch(
        &self,
        name: &str,
        branch: &str,
        rules: &BranchProtection,
    ) -> Result<(), GitHubError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSourceControl, ScmCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
