// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `delete`

use anyhow::Result;
use clap::Args;
use muppet_engine::{DeleteRequest, DeleteResult, Platform};

use crate::exit_error::{ExitError, FAILURE_EXIT};
use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub name: String,
    /// Run every cleanup step even when one fails, and delete a muppet
    /// that is still being created
    #[arg(long)]
    pub force: bool,
    /// Leave the GitHub repository in place
    #[arg(long)]
    pub keep_repo: bool,
    /// Leave the Fargate service and Terraform workspace in place
    #[arg(long)]
    pub keep_infra: bool,
}

impl DeleteArgs {
    pub fn into_request(self) -> DeleteRequest {
        DeleteRequest {
            force: self.force,
            cleanup_github: !self.keep_repo,
            cleanup_infrastructure: !self.keep_infra,
            ..DeleteRequest::new(self.name)
        }
    }
}

pub async fn handle(args: DeleteArgs, platform: &Platform, format: OutputFormat) -> Result<()> {
    let result = platform.lifecycle.delete_muppet(args.into_request()).await?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => println!("{}", summary(&result)),
    }
    if !result.success {
        return Err(ExitError::new(
            FAILURE_EXIT,
            format!(
                "{} cleanup step(s) failed for '{}'",
                result.steps_failed.len(),
                result.muppet_name
            ),
        )
        .into());
    }
    Ok(())
}

pub(crate) fn summary(result: &DeleteResult) -> String {
    let verdict = if result.success { "Deleted" } else { "Partially deleted" };
    let mut lines = vec![format!("{verdict} {}", result.muppet_name)];
    lines.extend(result.steps_completed.iter().map(|step| format!("  ok      {step}")));
    lines.extend(result.steps_failed.iter().map(|f| format!("  failed  {}: {}", f.step, f.error)));
    lines.join("\n")
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
