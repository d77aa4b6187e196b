// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `health`, `refresh` and `templates`

use anyhow::Result;
use muppet_core::PlatformHealth;
use muppet_engine::{Platform, RefreshSummary};

use crate::output::{print_json, OutputFormat};

pub fn health(platform: &Platform, format: OutputFormat) -> Result<()> {
    let health = platform.state.get_platform_health()?;
    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Text => println!("{}", describe_health(&health)),
    }
    Ok(())
}

pub(crate) fn describe_health(health: &PlatformHealth) -> String {
    let mut lines = vec![
        format!("Health score: {:.2}", health.health_score),
        format!(
            "Muppets: {} total, {} running, {} stopped, {} creating, {} deleting, {} error",
            health.total_muppets,
            health.running,
            health.stopped,
            health.creating,
            health.deleting,
            health.error
        ),
        format!("Active deployments: {}", health.active_deployments),
    ];
    if !health.orphaned_deployments.is_empty() {
        lines.push(format!("Orphaned deployments: {}", health.orphaned_deployments.join(", ")));
    }
    lines.join("\n")
}

pub async fn refresh(platform: &Platform, format: OutputFormat) -> Result<()> {
    let summary = platform.lifecycle.refresh().await?;
    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => println!("{}", describe_refresh(&summary)),
    }
    Ok(())
}

pub(crate) fn describe_refresh(summary: &RefreshSummary) -> String {
    let mut line = format!(
        "Refreshed: {} muppet(s), {} active deployment(s), {} terraform module(s)",
        summary.muppets, summary.active_deployments, summary.terraform_modules
    );
    if !summary.promoted.is_empty() {
        line.push_str(&format!("\nNow running: {}", summary.promoted.join(", ")));
    }
    if !summary.failed_sources.is_empty() {
        let failed: Vec<String> = summary.failed_sources.iter().map(ToString::to_string).collect();
        line.push_str(&format!("\nUnreachable: {}", failed.join(", ")));
    }
    line
}

pub async fn templates(platform: &Platform, format: OutputFormat) -> Result<()> {
    let templates = platform.lifecycle.list_templates().await?;
    match format {
        OutputFormat::Json => print_json(&templates)?,
        OutputFormat::Text if templates.is_empty() => println!("No templates"),
        OutputFormat::Text => templates.iter().for_each(|t| println!("{t}")),
    }
    Ok(())
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
