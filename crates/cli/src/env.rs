// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration resolution and environment variable access.
//!
//! Layers, lowest precedence first: built-in defaults, the TOML file, then
//! `MUPPET_*` overrides.

use std::path::{Path, PathBuf};

use muppet_engine::PlatformConfig;
use thiserror::Error;

pub const CONFIG_ENV: &str = "MUPPET_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Resolve the platform configuration.
///
/// An explicit path must exist. Without one, `~/.config/muppet/config.toml`
/// is read when present.
pub fn load_config(explicit: Option<&Path>) -> Result<PlatformConfig, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.is_file()),
    };
    let mut config = match path {
        Some(path) => read_config(&path)?,
        None => PlatformConfig::default(),
    };
    apply_overrides(&mut config);
    Ok(config)
}

fn read_config(path: &Path) -> Result<PlatformConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("muppet").join("config.toml"))
}

pub fn apply_overrides(config: &mut PlatformConfig) {
    if let Some(org) = var("MUPPET_GITHUB_ORG") {
        config.github_org = org;
    }
    if let Some(region) = var("MUPPET_AWS_REGION") {
        config.aws_region = region;
    }
    if let Some(cluster) = var("MUPPET_ECS_CLUSTER") {
        config.ecs_cluster = cluster;
    }
    if let Some(root) = var("MUPPET_WORKSPACE_ROOT") {
        config.workspace_root = PathBuf::from(root);
    }
    if let Some(dir) = var("MUPPET_TEMPLATES_DIR") {
        config.templates_dir = PathBuf::from(dir);
    }
    if let Some(dir) = var("MUPPET_STEERING_DIR") {
        config.steering_dir = PathBuf::from(dir);
    }
    if let Some(bin) = var("MUPPET_TERRAFORM_BIN") {
        config.terraform_binary = PathBuf::from(bin);
    }
}

/// Log filter directive (default: "info")
pub fn log_filter() -> String {
    var("MUPPET_LOG").unwrap_or_else(|| "info".to_string())
}

/// GitHub token. Read from the environment only, never from a config file.
pub fn github_token() -> Option<String> {
    var("GITHUB_TOKEN")
}

/// Set and non-blank.
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
