// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muppet: operator CLI for the Muppet Platform

mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod wiring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use muppet_core::PlatformError;

use commands::{create, delete, muppet, platform, scale};
use exit_error::{ExitError, FAILURE_EXIT};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "muppet",
    version,
    about = "Manage muppets: services with a repository and a Fargate deployment"
)]
struct Cli {
    /// Config file (default: ~/.config/muppet/config.toml when present)
    #[arg(long, global = true, env = env::CONFIG_ENV)]
    config: Option<PathBuf>,

    #[arg(long, short = 'o', global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every known muppet
    List,
    /// Show a muppet's repository, service, Terraform and steering status
    Status { name: String },
    /// Create a muppet from a template
    Create(create::CreateArgs),
    /// Delete a muppet and clean up what it owns
    Delete(delete::DeleteArgs),
    /// Change a muppet's running task count
    Scale(scale::ScaleArgs),
    /// Platform-wide health summary
    Health,
    /// Rebuild state from GitHub, Parameter Store and ECS
    Refresh,
    /// List available templates
    Templates,
}

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(e) = run(Cli::parse()).await {
        let exit = into_exit_error(e);
        if !exit.message.is_empty() {
            eprintln!("Error: {}", exit.message);
        }
        std::process::exit(exit.code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = env::load_config(cli.config.as_deref())?;
    let app = wiring::connect(config).await?;
    let format = cli.output;

    match cli.command {
        Command::List => muppet::list(&app, format),
        Command::Status { name } => muppet::status(&name, &app, format).await,
        Command::Create(args) => create::handle(args, &app, format).await,
        Command::Delete(args) => delete::handle(args, &app, format).await,
        Command::Scale(args) => scale::handle(args, &app, format).await,
        Command::Health => platform::health(&app, format),
        Command::Refresh => platform::refresh(&app, format).await,
        Command::Templates => platform::templates(&app, format).await,
    }
}

fn into_exit_error(e: anyhow::Error) -> ExitError {
    let e = match e.downcast::<ExitError>() {
        Ok(exit) => return exit,
        Err(e) => e,
    };
    match e.downcast::<PlatformError>() {
        Ok(platform) => ExitError::from(platform),
        Err(e) => ExitError::new(FAILURE_EXIT, format!("{e:#}")),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
