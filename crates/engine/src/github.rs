// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub Manager: repository setup as one logical operation.
//!
//! Validation and repository creation are strict. Everything after the
//! repository exists (topics, team access, branch protection, file pushes)
//! is best-effort and reported back as [`SetupWarning`]s; a created but
//! partially configured repository is never rolled back.

use std::sync::Arc;

use muppet_adapters::{
    BranchProtection, CreateRepoOptions, FileMap, RepoMetadata, SourceControl, Tag,
};
use muppet_core::topics::muppet_topics;
use muppet_core::{
    validate_muppet_name, validate_template_name, Muppet, MuppetStatus, PlatformError,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PlatformConfig;

/// Workflow files land first so CI exists before the code it builds.
const WORKFLOW_DIR: &str = ".github/workflows/";

pub struct RepositoryRequest {
    pub name: String,
    pub template: String,
    pub description: String,
    pub files: FileMap,
    pub status: MuppetStatus,
    pub port: u16,
}

/// A post-creation step that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupWarning {
    pub step: String,
    pub error: String,
}

impl SetupWarning {
    pub fn new(step: impl Into<String>, error: impl ToString) -> Self {
        Self { step: step.into(), error: error.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RepositorySetup {
    pub repository: RepoMetadata,
    pub files_pushed: usize,
    pub warnings: Vec<SetupWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepositoryInfo {
    pub repository: RepoMetadata,
    pub latest_tag: Option<Tag>,
}

pub struct GitHubManager {
    config: Arc<PlatformConfig>,
    scm: Arc<dyn SourceControl>,
}

impl GitHubManager {
    pub fn new(config: Arc<PlatformConfig>, scm: Arc<dyn SourceControl>) -> Self {
        Self { config, scm }
    }

    pub async fn create_muppet_repository(
        &self,
        request: RepositoryRequest,
    ) -> Result<RepositorySetup, PlatformError> {
        validate_muppet_name(&request.name)?;
        validate_template_name(&request.template)?;

        let name = request.name.as_str();
        let repository = self
            .scm
            .create_repository(&CreateRepoOptions::new(name, request.description.as_str()))
            .await?;
        info!(muppet = %name, url = %repository.html_url, "repository created");

        let mut warnings = Vec::new();
        let topics = muppet_topics(&request.template, request.status, request.port);
        if let Err(e) = self.scm.replace_topics(name, &topics).await {
            warnings.push(SetupWarning::new("topics", e));
        }

        for grant in &self.config.team_permissions {
            if let Err(e) = self.scm.set_team_permission(name, &grant.team, grant.permission).await
            {
                warnings.push(SetupWarning::new(format!("team_permission:{}", grant.team), e));
            }
        }

        let protection = BranchProtection {
            required_approvals: self.config.required_approvals,
            ..BranchProtection::default()
        };
        if let Err(e) =
            self.scm.protect_branch(name, &repository.default_branch, &protection).await
        {
            warnings.push(SetupWarning::new("branch_protection", e));
        }

        let mut files_pushed = 0;
        for (path, content) in ordered_files(&request.files) {
            let message = format!("Add {path} from {} template", request.template);
            match self.scm.push_file(name, path, content.as_bytes(), &message).await {
                Ok(()) => files_pushed += 1,
                Err(e) => warnings.push(SetupWarning::new(format!("push_file:{path}"), e)),
            }
        }

        for warning in &warnings {
            warn!(
                muppet = %name,
                step = %warning.step,
                error = %warning.error,
                "repository setup step failed"
            );
        }
        info!(muppet = %name, files_pushed, warnings = warnings.len(), "repository setup finished");
        Ok(RepositorySetup { repository, files_pushed, warnings })
    }

    /// Write the muppet's status into its repository topics.
    pub async fn sync_status(&self, muppet: &Muppet) -> Result<(), PlatformError> {
        let topics = muppet_topics(&muppet.template, muppet.status, muppet.port);
        self.scm.replace_topics(&muppet.name, &topics).await?;
        Ok(())
    }

    /// Repository metadata plus its newest tag. `None` when the repository is gone.
    pub async fn repository_info(
        &self,
        name: &str,
    ) -> Result<Option<RepositoryInfo>, PlatformError> {
        let Some(repository) = self.scm.get_repository(name).await? else {
            return Ok(None);
        };
        let latest_tag = match self.scm.list_tags(name).await {
            Ok(tags) => tags.into_iter().next(),
            Err(e) => {
                warn!(muppet = %name, error = %e, "failed to list tags");
                None
            }
        };
        Ok(Some(RepositoryInfo { repository, latest_tag }))
    }

    /// `false` when there was no repository to delete.
    pub async fn delete_repository(&self, name: &str) -> Result<bool, PlatformError> {
        let deleted = self.scm.delete_repository(name).await?;
        info!(muppet = %name, deleted, "repository deletion finished");
        Ok(deleted)
    }
}

fn ordered_files(files: &FileMap) -> impl Iterator<Item = (&str, &muppet_adapters::FileContent)> {
    let (workflows, rest): (Vec<_>, Vec<_>) =
        files.iter().map(|(p, c)| (p.as_str(), c)).partition(|(p, _)| p.starts_with(WORKFLOW_DIR));
    workflows.into_iter().chain(rest)
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
