// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform state reconstruction from the systems of record.
//!
//! Nothing is read from a local database. Muppets come from the GitHub
//! organization (repositories tagged `muppet`), module versions from Parameter
//! Store and live deployments from ECS. The three queries run concurrently and
//! each one degrades to an empty contribution when its system is unreachable.

use std::collections::BTreeMap;

use chrono::Utc;
use muppet_adapters::{AwsError, ContainerOrchestrator, GitHubError, ParameterStore, SourceControl};
use muppet_core::topics;
use muppet_core::{Muppet, MuppetStatus, PlatformState};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PlatformConfig;

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

/// Module whose version is recorded on each muppet
pub const FARGATE_MODULE: &str = "fargate-service";

/// Fallback when a repository carries no template topic
pub const UNKNOWN_TEMPLATE: &str = "unknown";

/// One of the three systems state is rebuilt from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSource {
    SourceControl,
    ParameterStore,
    Orchestrator,
}

muppet_core::simple_display! {
    StateSource {
        SourceControl => "source_control",
        ParameterStore => "parameter_store",
        Orchestrator => "orchestrator",
    }
}

/// Result of one reconstruction pass
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub state: PlatformState,
    /// Sources that failed and contributed nothing
    pub failed_sources: Vec<StateSource>,
    /// Muppets promoted from `Creating` to `Running` by a live deployment
    pub promoted: Vec<String>,
}

impl Reconstruction {
    pub fn all_sources_failed(&self) -> bool {
        self.failed_sources.len() == 3
    }
}

/// Rebuild platform state from the three sources.
pub(crate) async fn reconstruct(
    scm: &dyn SourceControl,
    params: &dyn ParameterStore,
    ecs: &dyn ContainerOrchestrator,
    config: &PlatformConfig,
) -> Reconstruction {
    let (muppets, versions, active) = tokio::join!(
        discover_muppets(scm, config.default_port),
        fetch_module_versions(params, &config.terraform_param_prefix),
        ecs.get_active_deployments(&config.ecs_cluster),
    );

    let mut failed_sources = Vec::new();
    let mut muppets = muppets.unwrap_or_else(|e| {
        warn!(org = %scm.org(), error = %e, "muppet discovery failed, continuing without it");
        failed_sources.push(StateSource::SourceControl);
        Vec::new()
    });
    let terraform_versions = versions.unwrap_or_else(|e| {
        warn!(error = %e, "module version lookup failed, continuing without it");
        failed_sources.push(StateSource::ParameterStore);
        BTreeMap::new()
    });
    let active_deployments = active.unwrap_or_else(|e| {
        warn!(
            cluster = %config.ecs_cluster,
            error = %e,
            "deployment listing failed, continuing without it"
        );
        failed_sources.push(StateSource::Orchestrator);
        BTreeMap::new()
    });

    let promoted = enrich(&mut muppets, &active_deployments, &terraform_versions);

    info!(
        muppets = muppets.len(),
        active_deployments = active_deployments.len(),
        modules = terraform_versions.len(),
        failed = failed_sources.len(),
        "reconstructed platform state"
    );

    Reconstruction {
        state: PlatformState {
            muppets,
            active_deployments,
            terraform_versions,
            last_updated: Utc::now(),
        },
        failed_sources,
        promoted,
    }
}

/// Muppets are the organization's repositories carrying the `muppet` topic.
pub(crate) async fn discover_muppets(
    scm: &dyn SourceControl,
    default_port: u16,
) -> Result<Vec<Muppet>, GitHubError> {
    let repos = scm.discover_repositories().await?;
    let mut muppets: Vec<Muppet> = Vec::new();
    for repo in repos.into_iter().filter(|r| topics::is_muppet(&r.topics)) {
        if muppets.iter().any(|m| m.name == repo.name) {
            continue;
        }
        let template =
            topics::parse_template(&repo.topics).unwrap_or_else(|| UNKNOWN_TEMPLATE.to_string());
        muppets.push(Muppet {
            status: topics::parse_status(&repo.topics),
            port: topics::parse_port(&repo.topics).unwrap_or(default_port),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            ..Muppet::new(repo.name, template, repo.html_url)
        });
    }
    Ok(muppets)
}

/// Module name to version, from `<prefix>/<module>/version` parameters.
pub(crate) async fn fetch_module_versions(
    params: &dyn ParameterStore,
    prefix: &str,
) -> Result<BTreeMap<String, String>, AwsError> {
    let raw = params.get_by_path(prefix, true).await?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| module_name(prefix, &key).map(|name| (name, value)))
        .collect())
}

/// `/prefix/fargate-service/version` and `/prefix/fargate-service` both name
/// `fargate-service`.
pub(crate) fn module_name(prefix: &str, key: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix.trim_end_matches('/'))?.trim_matches('/');
    let name = rest.strip_suffix("/version").unwrap_or(rest);
    (!name.is_empty() && name != "version").then(|| name.to_string())
}

/// Attach live deployment data to discovered muppets. Returns the names of
/// muppets promoted from `Creating` to `Running`.
pub(crate) fn enrich(
    muppets: &mut [Muppet],
    active_deployments: &BTreeMap<String, String>,
    terraform_versions: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut promoted = Vec::new();
    let fargate_version = terraform_versions.get(FARGATE_MODULE);
    for muppet in muppets.iter_mut() {
        if let Some(version) = fargate_version {
            muppet.terraform_version = Some(version.clone());
        }
        let Some(arn) = active_deployments.get(&muppet.name) else {
            continue;
        };
        muppet.fargate_service_arn = Some(arn.clone());
        // A live deployment outranks a stale `creating` topic
        if muppet.status == MuppetStatus::Creating {
            muppet.status = MuppetStatus::Running;
            promoted.push(muppet.name.clone());
        }
    }
    promoted
}
