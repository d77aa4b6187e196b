// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create`

use anyhow::Result;
use clap::Args;
use muppet_engine::{CreateRequest, CreateResult, DeployRequest, Platform};

use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Muppet name (also the repository name)
    pub name: String,
    /// Template to generate the code from
    #[arg(long, short = 't')]
    pub template: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Deploy to Fargate once the repository is set up
    #[arg(long)]
    pub auto_deploy: bool,
    /// Skip HTTPS configuration
    #[arg(long)]
    pub no_tls: bool,
    /// Container image (default: <registry>/<name>:latest)
    #[arg(long)]
    pub image: Option<String>,
    /// Environment variable for the service (repeatable: --env KEY=value)
    #[arg(long = "env", value_parser = super::parse_key_value)]
    pub env: Vec<(String, String)>,
    /// Secret reference for the service (repeatable: --secret KEY=arn)
    #[arg(long = "secret", value_parser = super::parse_key_value)]
    pub secrets: Vec<(String, String)>,
}

impl CreateArgs {
    pub fn into_request(self) -> CreateRequest {
        CreateRequest {
            description: self.description,
            auto_deploy: self.auto_deploy,
            enable_tls: !self.no_tls,
            deployment: DeployRequest {
                image: self.image,
                environment_variables: self.env.into_iter().collect(),
                secrets: self.secrets.into_iter().collect(),
                ..DeployRequest::default()
            },
            ..CreateRequest::new(self.name, self.template)
        }
    }
}

pub async fn handle(args: CreateArgs, platform: &Platform, format: OutputFormat) -> Result<()> {
    let result = platform.lifecycle.create_muppet(args.into_request()).await?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => println!("{}", summary(&result)),
    }
    Ok(())
}

pub(crate) fn summary(result: &CreateResult) -> String {
    let muppet = &result.muppet;
    let mut lines = vec![
        format!("Created {} ({}), status {}", muppet.name, muppet.template, muppet.status),
        format!(
            "Repository: {} ({} file(s) pushed)",
            muppet.github_repo_url, result.repository.files_pushed
        ),
    ];
    if result.steering.success {
        lines.push(format!("Steering:   {} file(s)", result.steering.files.len()));
    } else if let Some(error) = &result.steering.error {
        lines.push(format!("Steering:   failed ({error})"));
    }
    if let Some(error) = &result.tls_error {
        lines.push(format!("TLS:        failed ({error})"));
    }
    if let Some(deployment) = &result.deployment {
        let url = deployment.service_url.as_deref().unwrap_or("-");
        lines.push(format!("Deployed:   {} at {url}", deployment.image));
    }
    if let Some(error) = &result.deployment_error {
        lines.push(format!("Deployment: failed ({error})"));
    }
    for warning in result.repository.warnings.iter().chain(&result.warnings) {
        lines.push(format!("  warning: {}: {}", warning.step, warning.error));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
