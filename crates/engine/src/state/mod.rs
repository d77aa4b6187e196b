// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State Manager: the single owner of the in-memory [`PlatformState`].
//!
//! Readers get an `Arc` snapshot. Writers go through the narrow mutation
//! methods here, which copy-on-write so a snapshot already handed out never
//! changes underneath its reader.

mod reconcile;

pub use reconcile::{Reconstruction, StateSource, FARGATE_MODULE, UNKNOWN_TEMPLATE};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use muppet_adapters::{ContainerOrchestrator, ParameterStore, SourceControl};
use muppet_core::{
    Muppet, MuppetStatus, PlatformError, PlatformHealth, PlatformState, StatusTransition,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PlatformConfig;

/// Outcome of a successful refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub muppets: usize,
    pub active_deployments: usize,
    pub terraform_modules: usize,
    pub failed_sources: Vec<StateSource>,
    pub promoted: Vec<String>,
}

pub struct StateManager {
    config: Arc<PlatformConfig>,
    scm: Arc<dyn SourceControl>,
    params: Arc<dyn ParameterStore>,
    ecs: Arc<dyn ContainerOrchestrator>,
    snapshot: RwLock<Option<Arc<PlatformState>>>,
    history: Mutex<BTreeMap<String, Vec<StatusTransition>>>,
    init_lock: tokio::sync::Mutex<()>,
}

impl StateManager {
    pub fn new(
        config: Arc<PlatformConfig>,
        scm: Arc<dyn SourceControl>,
        params: Arc<dyn ParameterStore>,
        ecs: Arc<dyn ContainerOrchestrator>,
    ) -> Self {
        Self {
            config,
            scm,
            params,
            ecs,
            snapshot: RwLock::new(None),
            history: Mutex::new(BTreeMap::new()),
            init_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Reconstruct state once. Later calls return immediately.
    ///
    /// Fails only when every source is unreachable; the caller may keep
    /// running in a degraded mode and retry with [`refresh_state`](Self::refresh_state).
    pub async fn initialize(&self) -> Result<(), PlatformError> {
        if self.is_initialized() {
            return Ok(());
        }
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return Ok(());
        }
        let summary = self.rebuild().await?;
        info!(muppets = summary.muppets, "state manager initialized");
        Ok(())
    }

    /// Re-run the full reconstruction and swap the snapshot in.
    ///
    /// The previous snapshot stays readable until the swap. When every source
    /// fails the previous snapshot is kept and an error is returned.
    pub async fn refresh_state(&self) -> Result<RefreshSummary, PlatformError> {
        let _guard = self.init_lock.lock().await;
        self.rebuild().await
    }

    async fn rebuild(&self) -> Result<RefreshSummary, PlatformError> {
        let rebuilt = reconcile::reconstruct(
            self.scm.as_ref(),
            self.params.as_ref(),
            self.ecs.as_ref(),
            &self.config,
        )
        .await;

        if rebuilt.all_sources_failed() {
            return Err(PlatformError::Initialization {
                message: "state reconstruction failed: no source reachable".to_string(),
                details: rebuilt
                    .failed_sources
                    .iter()
                    .map(|s| (s.to_string(), "unreachable".to_string()))
                    .collect(),
            });
        }

        let summary = RefreshSummary {
            muppets: rebuilt.state.muppets.len(),
            active_deployments: rebuilt.state.active_deployments.len(),
            terraform_modules: rebuilt.state.terraform_versions.len(),
            failed_sources: rebuilt.failed_sources.clone(),
            promoted: rebuilt.promoted.clone(),
        };

        let previous = self.snapshot.read().clone();
        self.record_rebuild(previous.as_deref(), &rebuilt);
        *self.snapshot.write() = Some(Arc::new(rebuilt.state));
        Ok(summary)
    }

    /// Record transitions for muppets whose status differs from what was
    /// known before the rebuild.
    fn record_rebuild(&self, previous: Option<&PlatformState>, rebuilt: &Reconstruction) {
        let now = Utc::now();
        let mut history = self.history.lock();
        for muppet in &rebuilt.state.muppets {
            let entries = history.entry(muppet.name.clone()).or_default();
            let known = previous
                .and_then(|p| p.muppet(&muppet.name))
                .map(|m| m.status)
                .or_else(|| entries.last().map(|t| t.to));
            if known.is_none() && rebuilt.promoted.contains(&muppet.name) {
                entries.push(StatusTransition { from: None, to: MuppetStatus::Creating, at: now });
                entries.push(StatusTransition {
                    from: Some(MuppetStatus::Creating),
                    to: muppet.status,
                    at: now,
                });
                continue;
            }
            if known != Some(muppet.status) {
                entries.push(StatusTransition { from: known, to: muppet.status, at: now });
            }
        }
    }

    /// Current snapshot.
    pub fn get_state(&self) -> Result<Arc<PlatformState>, PlatformError> {
        self.snapshot.read().clone().ok_or(PlatformError::NotInitialized)
    }

    pub fn get_muppet(&self, name: &str) -> Result<Option<Muppet>, PlatformError> {
        Ok(self.get_state()?.muppet(name).cloned())
    }

    /// Insert or replace a muppet by name.
    pub fn add_muppet_to_state(&self, muppet: Muppet) -> Result<(), PlatformError> {
        let (name, status) = (muppet.name.clone(), muppet.status);
        let previous = self.mutate(|state| state.upsert_muppet(muppet))?;
        let from = previous.map(|p| p.status);
        if from != Some(status) {
            self.history.lock().entry(name.clone()).or_default().push(StatusTransition {
                from,
                to: status,
                at: Utc::now(),
            });
        }
        debug!(muppet = %name, %status, "muppet stored in state");
        Ok(())
    }

    /// Returns the removed muppet, if it was present.
    pub fn remove_muppet_from_state(&self, name: &str) -> Result<Option<Muppet>, PlatformError> {
        let removed = self.mutate(|state| state.remove_muppet(name))?;
        if removed.is_some() {
            debug!(muppet = %name, "muppet removed from state");
        }
        Ok(removed)
    }

    /// Every recorded status change for `name`, oldest first.
    pub fn status_history(&self, name: &str) -> Vec<StatusTransition> {
        self.history.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn get_platform_health(&self) -> Result<PlatformHealth, PlatformError> {
        Ok(self.get_state()?.health())
    }

    /// Install a snapshot directly, bypassing reconstruction.
    #[cfg(any(test, feature = "test-support"))]
    pub fn install_state(&self, state: PlatformState) {
        *self.snapshot.write() = Some(Arc::new(state));
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut PlatformState) -> R) -> Result<R, PlatformError> {
        let mut guard = self.snapshot.write();
        let snapshot = guard.as_mut().ok_or(PlatformError::NotInitialized)?;
        Ok(f(Arc::make_mut(snapshot)))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
