// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scale`

use anyhow::Result;
use clap::Args;
use muppet_engine::Platform;

use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct ScaleArgs {
    pub name: String,
    /// Desired number of running tasks
    pub count: u32,
    #[arg(long)]
    pub min: Option<u32>,
    #[arg(long)]
    pub max: Option<u32>,
}

pub async fn handle(args: ScaleArgs, platform: &Platform, format: OutputFormat) -> Result<()> {
    super::muppet::require_known(platform, &args.name)?;
    let service =
        platform.deployment.scale_muppet(&args.name, args.count, args.min, args.max).await?;
    match format {
        OutputFormat::Json => print_json(&service)?,
        OutputFormat::Text => println!(
            "Scaled {} to {} (running {}, pending {})",
            args.name, service.desired_count, service.running_count, service.pending_count
        ),
    }
    Ok(())
}
