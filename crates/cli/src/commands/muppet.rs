// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list` and `status`

use anyhow::Result;
use chrono::{DateTime, Utc};
use muppet_core::{Muppet, PlatformError};
use muppet_engine::{Facet, MuppetStatusReport, Platform};

use crate::output::{format_time_ago, print_json, table, OutputFormat};

pub fn list(platform: &Platform, format: OutputFormat) -> Result<()> {
    let muppets = platform.lifecycle.list_muppets()?;
    match format {
        OutputFormat::Json => print_json(&muppets)?,
        OutputFormat::Text if muppets.is_empty() => println!("No muppets"),
        OutputFormat::Text => {
            let headers = ["NAME", "TEMPLATE", "STATUS", "PORT", "UPDATED"];
            println!("{}", table(&headers, &rows(&muppets, Utc::now())));
        }
    }
    Ok(())
}

pub(crate) fn rows(muppets: &[Muppet], now: DateTime<Utc>) -> Vec<Vec<String>> {
    muppets
        .iter()
        .map(|m| {
            vec![
                m.name.clone(),
                m.template.clone(),
                m.status.to_string(),
                m.port.to_string(),
                format_time_ago(m.updated_at, now),
            ]
        })
        .collect()
}

pub async fn status(name: &str, platform: &Platform, format: OutputFormat) -> Result<()> {
    let report = platform.lifecycle.get_muppet_status(name).await?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => println!("{}", describe(&report)),
    }
    Ok(())
}

pub(crate) fn describe(report: &MuppetStatusReport) -> String {
    let muppet = &report.muppet;
    let mut lines = vec![
        format!("Muppet:     {}", muppet.name),
        format!("Template:   {}", muppet.template),
        format!("Status:     {}", muppet.status),
        format!("Repository: {}", muppet.github_repo_url),
        format!("Health:     {} ({:.2})", report.health.level, report.health.score),
    ];

    lines.push(format!(
        "GitHub:     {}",
        facet_line(&report.github, |repo| match repo {
            Some(info) => match &info.latest_tag {
                Some(tag) => format!("ok, latest tag {}", tag.name),
                None => "ok, no tags".to_string(),
            },
            None => "repository missing".to_string(),
        })
    ));
    lines.push(format!(
        "Service:    {}",
        facet_line(&report.service, |service| match service {
            Some(s) => format!("{} {}/{} running", s.status, s.running_count, s.desired_count),
            None => "not deployed".to_string(),
        })
    ));
    let terraform = facet_line(&report.infrastructure, |d| d.status.to_string());
    lines.push(format!("Terraform:  {terraform}"));
    lines.push(format!(
        "Steering:   {}",
        facet_line(&report.steering, |manifest| match manifest {
            Some(m) => format!("{} file(s)", m.steering_files.len()),
            None => "not installed".to_string(),
        })
    ));

    for issue in &report.health.issues {
        lines.push(format!("  ! {issue}"));
    }
    lines.join("\n")
}

fn facet_line<T>(facet: &Facet<T>, render: impl Fn(&T) -> String) -> String {
    match facet {
        Facet::Available(value) => render(value),
        Facet::Unavailable { error } => format!("unavailable ({error})"),
    }
}

/// The muppet must be known to state before anything else is asked of it.
pub(crate) fn require_known(platform: &Platform, name: &str) -> Result<Muppet, PlatformError> {
    platform
        .state
        .get_muppet(name)?
        .ok_or_else(|| {
            PlatformError::not_found(format!("muppet '{name}' not found"))
                .with_detail("muppet", name)
        })
}

#[cfg(test)]
#[path = "muppet_tests.rs"]
mod tests;
