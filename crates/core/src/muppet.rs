// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Muppet record and status state machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Port a muppet listens on when nothing else is recorded.
pub const DEFAULT_PORT: u16 = 3000;

/// Lifecycle status of a muppet.
///
/// Serialized lowercase; the same form is used in `status-<value>` repository topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuppetStatus {
    Creating,
    Running,
    Stopped,
    Error,
    Deleting,
}

crate::simple_display! {
    MuppetStatus {
        Creating => "creating",
        Running => "running",
        Stopped => "stopped",
        Error => "error",
        Deleting => "deleting",
    }
}

impl FromStr for MuppetStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creating" => Ok(Self::Creating),
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            "error" => Ok(Self::Error),
            "deleting" => Ok(Self::Deleting),
            other => Err(PlatformError::validation(format!("unknown muppet status: {other}"))),
        }
    }
}

impl MuppetStatus {
    pub const ALL: [MuppetStatus; 5] =
        [Self::Creating, Self::Running, Self::Stopped, Self::Error, Self::Deleting];

    /// Whether moving from `self` to `next` is an allowed path.
    ///
    /// Staying in the same status is always allowed. `Deleting` only leaves
    /// towards `Error` (a deletion that could not finish).
    pub fn can_transition_to(self, next: MuppetStatus) -> bool {
        use MuppetStatus::*;
        if self == next {
            return true;
        }
        match self {
            Creating => matches!(next, Running | Stopped | Error | Deleting),
            Running => matches!(next, Creating | Stopped | Error | Deleting),
            Stopped => matches!(next, Creating | Running | Error | Deleting),
            Error => matches!(next, Creating | Running | Stopped | Deleting),
            Deleting => matches!(next, Error),
        }
    }
}

/// One managed backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muppet {
    pub name: String,
    pub template: String,
    pub status: MuppetStatus,
    pub github_repo_url: String,
    #[serde(default)]
    pub fargate_service_arn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub terraform_version: Option<String>,
    pub port: u16,
}

impl Muppet {
    /// A freshly created muppet, status `Creating`.
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        github_repo_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            template: template.into(),
            status: MuppetStatus::Creating,
            github_repo_url: github_repo_url.into(),
            fargate_service_arn: None,
            created_at: now,
            updated_at: now,
            terraform_version: None,
            port: DEFAULT_PORT,
        }
    }

    crate::setters! {
        set {
            port: u16,
        }
        option {
            fargate_service_arn: String,
            terraform_version: String,
        }
    }

    /// Move to `next`, rejecting paths the state machine does not allow.
    pub fn transition_to(&mut self, next: MuppetStatus) -> Result<(), PlatformError> {
        if !self.status.can_transition_to(next) {
            return Err(PlatformError::conflict(format!(
                "muppet '{}' cannot move from {} to {}",
                self.name, self.status, next
            ))
            .with_detail("muppet", self.name.clone())
            .with_detail("from", self.status.to_string())
            .with_detail("to", next.to_string()));
        }
        if self.status != next {
            self.status = next;
            self.updated_at = Utc::now();
        }
        Ok(())
    }

    /// Whether a Fargate service is known for this muppet.
    pub fn is_deployed(&self) -> bool {
        self.fargate_service_arn.is_some()
    }
}

crate::builder! {
    pub struct MuppetBuilder => Muppet {
        into {
            name: String = "test-muppet",
            template: String = "java-micronaut",
            github_repo_url: String = "https://github.com/muppet-platform/test-muppet",
        }
        set {
            status: MuppetStatus = MuppetStatus::Running,
            port: u16 = DEFAULT_PORT,
        }
        option {
            fargate_service_arn: String = None,
            terraform_version: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "muppet_tests.rs"]
mod tests;
