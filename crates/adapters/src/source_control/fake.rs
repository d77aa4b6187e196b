// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    BranchProtection, CreateRepoOptions, GitHubError, RepoMetadata, RepoPermission, SourceControl,
    Tag,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Recorded source control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmCall {
    Discover,
    GetRepository { name: String },
    Create { name: String },
    ReplaceTopics { name: String, topics: Vec<String> },
    UpdateDescription { name: String },
    PushFile { name: String, path: String },
    Delete { name: String },
    ListTags { name: String },
    GetFile { name: String, path: String },
    TeamPermission { name: String, team: String, permission: RepoPermission },
    ProtectBranch { name: String, branch: String },
}

impl ScmCall {
    /// Operation name used with [`FakeSourceControl::fail_on`]
    pub fn operation(&self) -> &'static str {
        match self {
            ScmCall::Discover => "discover",
            ScmCall::GetRepository { .. } => "get_repository",
            ScmCall::Create { .. } => "create",
            ScmCall::ReplaceTopics { .. } => "replace_topics",
            ScmCall::UpdateDescription { .. } => "update_description",
            ScmCall::PushFile { .. } => "push_file",
            ScmCall::Delete { .. } => "delete",
            ScmCall::ListTags { .. } => "list_tags",
            ScmCall::GetFile { .. } => "get_file",
            ScmCall::TeamPermission { .. } => "team_permission",
            ScmCall::ProtectBranch { .. } => "protect_branch",
        }
    }
}

#[derive(Default)]
struct FakeScmState {
    repos: BTreeMap<String, RepoMetadata>,
    files: BTreeMap<(String, String), Vec<u8>>,
    tags: BTreeMap<String, Vec<Tag>>,
    calls: Vec<ScmCall>,
    failing: HashSet<&'static str>,
}

/// In-memory organization for testing
#[derive(Clone)]
pub struct FakeSourceControl {
    org: String,
    inner: Arc<Mutex<FakeScmState>>,
}

impl Default for FakeSourceControl {
    fn default() -> Self {
        Self::new("muppet-org")
    }
}

impl FakeSourceControl {
    pub fn new(org: impl Into<String>) -> Self {
        Self { org: org.into(), inner: Arc::new(Mutex::new(FakeScmState::default())) }
    }

    /// Seed a repository with the given topics.
    pub fn add_repo(&self, name: &str, topics: &[&str]) -> RepoMetadata {
        let repo = RepoMetadata {
            name: name.to_string(),
            description: None,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            html_url: format!("https://github.com/{}/{}", self.org, name),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            default_branch: "main".to_string(),
            private: true,
        };
        self.inner.lock().repos.insert(name.to_string(), repo.clone());
        repo
    }

    pub fn add_tag(&self, name: &str, tag: &str) {
        self.inner
            .lock()
            .tags
            .entry(name.to_string())
            .or_default()
            .push(Tag { name: tag.to_string(), commit_sha: format!("sha-{tag}") });
    }

    pub fn add_file(&self, name: &str, path: &str, content: &str) {
        self.inner
            .lock()
            .files
            .insert((name.to_string(), path.to_string()), content.as_bytes().to_vec());
    }

    /// Make every call of the given operation fail (see [`ScmCall::operation`]).
    pub fn fail_on(&self, operation: &'static str) {
        self.inner.lock().failing.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().failing.clear();
    }

    pub fn calls(&self) -> Vec<ScmCall> {
        self.inner.lock().calls.clone()
    }

    pub fn repo(&self, name: &str) -> Option<RepoMetadata> {
        self.inner.lock().repos.get(name).cloned()
    }

    pub fn has_repo(&self, name: &str) -> bool {
        self.inner.lock().repos.contains_key(name)
    }

    pub fn topics(&self, name: &str) -> Vec<String> {
        self.inner.lock().repos.get(name).map(|r| r.topics.clone()).unwrap_or_default()
    }

    /// Paths pushed to a repository, in push order.
    pub fn pushed_paths(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ScmCall::PushFile { name: n, path } if n == name => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn file(&self, name: &str, path: &str) -> Option<String> {
        self.inner
            .lock()
            .files
            .get(&(name.to_string(), path.to_string()))
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    fn record(&self, call: ScmCall) -> Result<(), GitHubError> {
        let operation = call.operation();
        let mut state = self.inner.lock();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(GitHubError::Api {
                operation,
                status: 500,
                message: format!("injected {operation} failure"),
            });
        }
        Ok(())
    }

    fn not_found(operation: &'static str) -> GitHubError {
        GitHubError::Api { operation, status: 404, message: "Not Found".to_string() }
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    fn org(&self) -> &str {
        &self.org
    }

    async fn discover_repositories(&self) -> Result<Vec<RepoMetadata>, GitHubError> {
        self.record(ScmCall::Discover)?;
        Ok(self.inner.lock().repos.values().cloned().collect())
    }

    async fn get_repository(&self, name: &str) -> Result<Option<RepoMetadata>, GitHubError> {
        self.record(ScmCall::GetRepository { name: name.to_string() })?;
        Ok(self.repo(name))
    }

    async fn create_repository(
        &self,
        options: &CreateRepoOptions,
    ) -> Result<RepoMetadata, GitHubError> {
        self.record(ScmCall::Create { name: options.name.clone() })?;
        if self.has_repo(&options.name) {
            return Err(GitHubError::Api {
                operation: "create",
                status: 422,
                message: "name already exists on this account".to_string(),
            });
        }
        let mut repo = self.add_repo(&options.name, &[]);
        repo.description = Some(options.description.clone());
        repo.private = options.private;
        self.inner.lock().repos.insert(repo.name.clone(), repo.clone());
        Ok(repo)
    }

    async fn replace_topics(&self, name: &str, topics: &[String]) -> Result<(), GitHubError> {
        self.record(ScmCall::ReplaceTopics { name: name.to_string(), topics: topics.to_vec() })?;
        let mut state = self.inner.lock();
        let repo = state.repos.get_mut(name).ok_or_else(|| Self::not_found("replace_topics"))?;
        repo.topics = topics.to_vec();
        repo.updated_at = Utc::now();
        Ok(())
    }

    async fn update_description(&self, name: &str, description: &str) -> Result<(), GitHubError> {
        self.record(ScmCall::UpdateDescription { name: name.to_string() })?;
        let mut state = self.inner.lock();
        let repo =
            state.repos.get_mut(name).ok_or_else(|| Self::not_found("update_description"))?;
        repo.description = Some(description.to_string());
        Ok(())
    }

    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        _message: &str,
    ) -> Result<(), GitHubError> {
        self.record(ScmCall::PushFile { name: name.to_string(), path: path.to_string() })?;
        let mut state = self.inner.lock();
        if !state.repos.contains_key(name) {
            return Err(Self::not_found("push_file"));
        }
        state.files.insert((name.to_string(), path.to_string()), content.to_vec());
        Ok(())
    }

    async fn delete_repository(&self, name: &str) -> Result<bool, GitHubError> {
        self.record(ScmCall::Delete { name: name.to_string() })?;
        let mut state = self.inner.lock();
        state.files.retain(|(repo, _), _| repo != name);
        state.tags.remove(name);
        Ok(state.repos.remove(name).is_some())
    }

    async fn list_tags(&self, name: &str) -> Result<Vec<Tag>, GitHubError> {
        self.record(ScmCall::ListTags { name: name.to_string() })?;
        Ok(self.inner.lock().tags.get(name).cloned().unwrap_or_default())
    }

    async fn get_file_content(
        &self,
        name: &str,
        path: &str,
        _git_ref: Option<&str>,
    ) -> Result<Option<String>, GitHubError> {
        self.record(ScmCall::GetFile { name: name.to_string(), path: path.to_string() })?;
        Ok(self.file(name, path))
    }

    async fn set_team_permission(
        &self,
        name: &str,
        team: &str,
        permission: RepoPermission,
    ) -> Result<(), GitHubError> {
        self.record(ScmCall::TeamPermission {
            name: name.to_string(),
            team: team.to_string(),
            permission,
        })
    }

    async fn protect_branch(
        &self,
        name: &str,
        branch: &str,
        _rules: &BranchProtection,
    ) -> Result<(), GitHubError> {
        self.record(ScmCall::ProtectBranch { name: name.to_string(), branch: branch.to_string() })
    }
}
