// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate platform snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::muppet::{Muppet, MuppetStatus};

/// Snapshot of everything the platform knows, rebuilt from external systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformState {
    /// Unique by name.
    pub muppets: Vec<Muppet>,
    /// Muppet (ECS service) name → service ARN.
    pub active_deployments: BTreeMap<String, String>,
    /// Terraform module name → version.
    pub terraform_versions: BTreeMap<String, String>,
    pub last_updated: DateTime<Utc>,
}

impl Default for PlatformState {
    fn default() -> Self {
        Self {
            muppets: Vec::new(),
            active_deployments: BTreeMap::new(),
            terraform_versions: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl PlatformState {
    pub fn muppet(&self, name: &str) -> Option<&Muppet> {
        self.muppets.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.muppet(name).is_some()
    }

    /// Insert or replace by name. Returns the entry that was replaced.
    pub fn upsert_muppet(&mut self, muppet: Muppet) -> Option<Muppet> {
        self.last_updated = Utc::now();
        match self.muppets.iter_mut().find(|m| m.name == muppet.name) {
            Some(existing) => Some(std::mem::replace(existing, muppet)),
            None => {
                self.muppets.push(muppet);
                None
            }
        }
    }

    pub fn remove_muppet(&mut self, name: &str) -> Option<Muppet> {
        let idx = self.muppets.iter().position(|m| m.name == name)?;
        self.last_updated = Utc::now();
        Some(self.muppets.remove(idx))
    }

    /// Deployments whose service name matches no known muppet.
    pub fn orphaned_deployments(&self) -> Vec<String> {
        self.active_deployments.keys().filter(|name| !self.contains(name)).cloned().collect()
    }

    pub fn count_with_status(&self, status: MuppetStatus) -> usize {
        self.muppets.iter().filter(|m| m.status == status).count()
    }

    /// Summarise the snapshot into a health report.
    ///
    /// The score is `(running / total) * (1 - error / total)`, and `1.0` when
    /// the platform has no muppets.
    pub fn health(&self) -> PlatformHealth {
        let total = self.muppets.len();
        let running = self.count_with_status(MuppetStatus::Running);
        let error = self.count_with_status(MuppetStatus::Error);

        let health_score = if total == 0 {
            1.0
        } else {
            let total = total as f64;
            (running as f64 / total) * (1.0 - error as f64 / total)
        };

        PlatformHealth {
            health_score,
            total_muppets: total,
            running,
            stopped: self.count_with_status(MuppetStatus::Stopped),
            creating: self.count_with_status(MuppetStatus::Creating),
            deleting: self.count_with_status(MuppetStatus::Deleting),
            error,
            active_deployments: self.active_deployments.len(),
            orphaned_deployments: self.orphaned_deployments(),
            last_updated: self.last_updated,
        }
    }
}

/// Platform-wide health summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformHealth {
    /// 0.0 to 1.0
    pub health_score: f64,
    pub total_muppets: usize,
    pub running: usize,
    pub stopped: usize,
    pub creating: usize,
    pub deleting: usize,
    pub error: usize,
    pub active_deployments: usize,
    pub orphaned_deployments: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// One entry in a muppet's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// `None` when the muppet first appeared.
    pub from: Option<MuppetStatus>,
    pub to: MuppetStatus,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
