// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Steering documentation distribution.
//!
//! Shared development guidelines (`*.md` under the steering directory) are
//! pushed into each muppet repository under `.kiro/steering/`, together with
//! a `.kiro/settings/muppet.json` manifest describing what was installed.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use muppet_adapters::SourceControl;
use muppet_core::{Muppet, PlatformError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PlatformConfig;

pub const STEERING_DIR: &str = ".kiro/steering";
pub const MANIFEST_PATH: &str = ".kiro/settings/muppet.json";

/// Result of distributing steering docs. Never an error: a failure here
/// does not stop muppet creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SteeringSetup {
    pub success: bool,
    pub files: Vec<String>,
    pub error: Option<String>,
}

/// Contents of `.kiro/settings/muppet.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteeringManifest {
    pub muppet: String,
    pub template: String,
    pub platform: String,
    pub steering_files: Vec<String>,
    pub installed_at: DateTime<Utc>,
}

pub struct SteeringDistributor {
    config: Arc<PlatformConfig>,
    scm: Arc<dyn SourceControl>,
}

impl SteeringDistributor {
    pub fn new(config: Arc<PlatformConfig>, scm: Arc<dyn SourceControl>) -> Self {
        Self { config, scm }
    }

    pub async fn distribute(&self, muppet: &Muppet) -> SteeringSetup {
        match self.push_all(muppet).await {
            Ok(files) => {
                info!(muppet = %muppet.name, files = files.len(), "steering docs distributed");
                SteeringSetup { success: true, files, error: None }
            }
            Err((files, e)) => {
                warn!(muppet = %muppet.name, error = %e, "steering distribution failed");
                SteeringSetup { success: false, files, error: Some(e.to_string()) }
            }
        }
    }

    /// On failure, also returns the files pushed before it.
    async fn push_all(&self, muppet: &Muppet) -> Result<Vec<String>, (Vec<String>, PlatformError)> {
        let docs = read_docs(&self.config.steering_dir).await.map_err(|e| (Vec::new(), e))?;
        let mut pushed = Vec::with_capacity(docs.len() + 1);
        for (file, content) in &docs {
            let path = format!("{STEERING_DIR}/{file}");
            let message = format!("Add steering doc {file}");
            if let Err(e) = self.scm.push_file(&muppet.name, &path, content, &message).await {
                return Err((pushed, e.into()));
            }
            pushed.push(path);
        }

        let manifest = SteeringManifest {
            muppet: muppet.name.clone(),
            template: muppet.template.clone(),
            platform: self.config.name.clone(),
            steering_files: docs.into_iter().map(|(file, _)| file).collect(),
            installed_at: Utc::now(),
        };
        let body = match serde_json::to_vec_pretty(&manifest) {
            Ok(body) => body,
            Err(e) => return Err((pushed, PlatformError::internal(e.to_string()))),
        };
        if let Err(e) =
            self.scm.push_file(&muppet.name, MANIFEST_PATH, &body, "Add muppet settings").await
        {
            return Err((pushed, e.into()));
        }
        pushed.push(MANIFEST_PATH.to_string());
        Ok(pushed)
    }

    /// The manifest installed in a muppet's repository, if any.
    pub async fn installed_manifest(
        &self,
        muppet_name: &str,
    ) -> Result<Option<SteeringManifest>, PlatformError> {
        let Some(raw) = self.scm.get_file_content(muppet_name, MANIFEST_PATH, None).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            PlatformError::internal(format!("invalid steering manifest: {e}"))
                .with_detail("muppet", muppet_name)
        })
    }
}

/// `(file name, content)` for every markdown file in `dir`, sorted by name.
async fn read_docs(dir: &Path) -> Result<Vec<(String, Vec<u8>)>, PlatformError> {
    let io_err = |e: std::io::Error| {
        PlatformError::internal(format!("cannot read steering docs: {e}"))
            .with_detail("path", dir.display().to_string())
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut docs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") && path.is_file() {
            let content = tokio::fs::read(&path).await.map_err(io_err)?;
            docs.push((entry.file_name().to_string_lossy().into_owned(), content));
        }
    }
    docs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(docs)
}

#[cfg(test)]
#[path = "steering_tests.rs"]
mod tests;
