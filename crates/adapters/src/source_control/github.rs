// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub REST client bound to one organization.

use super::{
    BranchProtection, CreateRepoOptions, GitHubError, RepoMetadata, RepoPermission, SourceControl,
    Tag,
};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    org: String,
}

impl GitHubClient {
    pub fn new(token: &str, org: impl Into<String>) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GitHubError::Config(format!("invalid token: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("muppet-platform"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(Self { http, api_base: DEFAULT_API_BASE.to_string(), org: org.into() })
    }

    /// Point the client at a different API host (GitHub Enterprise).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, name: &str, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_base, self.org, name, suffix)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, GitHubError> {
        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Transport { operation, message: e.to_string() })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GitHubError::Api { operation, status: status.as_u16(), message: api_message(&body) })
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, GitHubError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GitHubError::Decode { operation, message: e.to_string() })
    }

    /// Blob sha of an existing file, needed to update it in place.
    async fn existing_sha(&self, name: &str, path: &str) -> Result<Option<String>, GitHubError> {
        let url = self.repo_url(name, &format!("/contents/{path}"));
        match self.send("get_contents", self.http.get(url)).await {
            Ok(response) => {
                let entry: ContentEntry = Self::decode("get_contents", response).await?;
                Ok(Some(entry.sha))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Deserialize)]
struct ContentEntry {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
    commit: TagCommit,
}

#[derive(Deserialize)]
struct TagCommit {
    sha: String,
}

/// Extract the `message` field GitHub puts in error bodies, falling back to
/// the raw body.
pub(super) fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }
    match serde_json::from_str::<ApiError>(body) {
        Ok(e) => e.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Decode a contents-API payload. GitHub wraps base64 at 60 columns.
pub(super) fn decode_content(content: &str, encoding: Option<&str>) -> Result<String, String> {
    match encoding {
        Some("base64") | None => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| e.to_string())?;
            String::from_utf8(bytes).map_err(|e| e.to_string())
        }
        Some(other) => Err(format!("unsupported encoding '{other}'")),
    }
}

pub(super) fn protection_body(rules: &BranchProtection) -> serde_json::Value {
    let status_checks = if rules.required_status_checks.is_empty() {
        serde_json::Value::Null
    } else {
        json!({ "strict": true, "contexts": rules.required_status_checks })
    };
    json!({
        "required_status_checks": status_checks,
        "enforce_admins": rules.enforce_admins,
        "required_pull_request_reviews": {
            "required_approving_review_count": rules.required_approvals,
        },
        "restrictions": null,
    })
}

#[async_trait]
impl SourceControl for GitHubClient {
    fn org(&self) -> &str {
        &self.org
    }

    async fn discover_repositories(&self) -> Result<Vec<RepoMetadata>, GitHubError> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let url = format!(
                "{}/orgs/{}/repos?type=all&per_page={PAGE_SIZE}&page={page}",
                self.api_base, self.org
            );
            let response = self.send("list_repos", self.http.get(url)).await?;
            let batch: Vec<RepoMetadata> = Self::decode("list_repos", response).await?;
            let done = batch.len() < PAGE_SIZE;
            repos.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        tracing::debug!(org = %self.org, count = repos.len(), "listed organization repositories");
        Ok(repos)
    }

    async fn get_repository(&self, name: &str) -> Result<Option<RepoMetadata>, GitHubError> {
        match self.send("get_repo", self.http.get(self.repo_url(name, ""))).await {
            Ok(response) => Ok(Some(Self::decode("get_repo", response).await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_repository(
        &self,
        options: &CreateRepoOptions,
    ) -> Result<RepoMetadata, GitHubError> {
        let url = format!("{}/orgs/{}/repos", self.api_base, self.org);
        let body = json!({
            "name": options.name,
            "description": options.description,
            "private": options.private,
            "auto_init": options.auto_init,
        });
        let response = self.send("create_repo", self.http.post(url).json(&body)).await?;
        let repo: RepoMetadata = Self::decode("create_repo", response).await?;
        tracing::info!(org = %self.org, repo = %repo.name, "created repository");
        Ok(repo)
    }

    async fn replace_topics(&self, name: &str, topics: &[String]) -> Result<(), GitHubError> {
        let body = json!({ "names": topics });
        self.send("replace_topics", self.http.put(self.repo_url(name, "/topics")).json(&body))
            .await?;
        Ok(())
    }

    async fn update_description(&self, name: &str, description: &str) -> Result<(), GitHubError> {
        let body = json!({ "description": description });
        self.send("update_repo", self.http.patch(self.repo_url(name, "")).json(&body)).await?;
        Ok(())
    }

    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), GitHubError> {
        let sha = self.existing_sha(name, path).await?;
        let mut body = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(content),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }
        let url = self.repo_url(name, &format!("/contents/{path}"));
        self.send("put_contents", self.http.put(url).json(&body)).await?;
        tracing::debug!(repo = %name, %path, "pushed file");
        Ok(())
    }

    async fn delete_repository(&self, name: &str) -> Result<bool, GitHubError> {
        match self.send("delete_repo", self.http.delete(self.repo_url(name, ""))).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_tags(&self, name: &str) -> Result<Vec<Tag>, GitHubError> {
        let url = self.repo_url(name, &format!("/tags?per_page={PAGE_SIZE}"));
        let response = self.send("list_tags", self.http.get(url)).await?;
        let entries: Vec<TagEntry> = Self::decode("list_tags", response).await?;
        Ok(entries.into_iter().map(|t| Tag { name: t.name, commit_sha: t.commit.sha }).collect())
    }

    async fn get_file_content(
        &self,
        name: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Option<String>, GitHubError> {
        let mut request = self.http.get(self.repo_url(name, &format!("/contents/{path}")));
        if let Some(git_ref) = git_ref {
            request = request.query(&[("ref", git_ref)]);
        }
        let response = match self.send("get_contents", request).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let entry: ContentEntry = Self::decode("get_contents", response).await?;
        let Some(content) = entry.content else {
            return Ok(None);
        };
        decode_content(&content, entry.encoding.as_deref())
            .map(Some)
            .map_err(|message| GitHubError::Decode { operation: "get_contents", message })
    }

    async fn set_team_permission(
        &self,
        name: &str,
        team: &str,
        permission: RepoPermission,
    ) -> Result<(), GitHubError> {
        let url = format!(
            "{}/orgs/{}/teams/{}/repos/{}/{}",
            self.api_base, self.org, team, self.org, name
        );
        let body = json!({ "permission": permission });
        self.send("team_permission", self.http.put(url).json(&body)).await?;
        Ok(())
    }

    async fn protect_branch(
        &self,
        name: &str,
        branch: &str,
        rules: &BranchProtection,
    ) -> Result<(), GitHubError> {
        let url = self.repo_url(name, &format!("/branches/{branch}/protection"));
        self.send("protect_branch", self.http.put(url).json(&protection_body(rules))).await?;
        Ok(())
    }
}
