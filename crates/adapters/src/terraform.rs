// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Infrastructure-as-code adapter (Terraform CLI subprocess)

use async_trait::async_trait;
use muppet_core::PlatformError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Environment set on every invocation so Terraform never prompts.
pub const AUTOMATION_ENV: [(&str, &str); 2] = [("TF_IN_AUTOMATION", "true"), ("TF_INPUT", "false")];

/// Errors launching or supervising the Terraform process.
///
/// A non-zero exit is not an error here; it is reported through
/// [`CommandOutput::exit_code`].
#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("failed to launch {binary}: {message}")]
    Spawn { binary: String, message: String },
    #[error("terraform {command} timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

impl From<TerraformError> for PlatformError {
    fn from(e: TerraformError) -> Self {
        let command = match &e {
            TerraformError::Spawn { binary, .. } => binary.clone(),
            TerraformError::Timeout { command, .. } => command.clone(),
        };
        PlatformError::infrastructure(e.to_string()).with_detail("command", command)
    }
}

/// Captured result of one Terraform command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best diagnostic text: stderr, or stdout when stderr is empty.
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Adapter that runs Terraform subcommands inside a workspace directory
#[async_trait]
pub trait TerraformRunner: Send + Sync + 'static {
    async fn run(&self, workspace: &Path, args: &[&str]) -> Result<CommandOutput, TerraformError>;
}

#[derive(Debug, Clone)]
pub struct CliTerraformRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl CliTerraformRunner {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { binary: binary.into(), timeout }
    }
}

#[async_trait]
impl TerraformRunner for CliTerraformRunner {
    async fn run(&self, workspace: &Path, args: &[&str]) -> Result<CommandOutput, TerraformError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .current_dir(workspace)
            .envs(AUTOMATION_ENV)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(workspace = %workspace.display(), ?args, "running terraform");
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TerraformError::Spawn {
                    binary: self.binary.display().to_string(),
                    message: e.to_string(),
                })
            }
            // Dropping the future kills the child
            Err(_) => return Err(TerraformError::Timeout { command, timeout: self.timeout }),
        };

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success() {
            tracing::warn!(
                %command,
                exit_code = ?result.exit_code,
                stderr = %result.error_text(),
                "terraform command failed"
            );
        }
        Ok(result)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CommandOutput, TerraformError, TerraformRunner};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded Terraform invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TerraformCall {
        pub workspace: PathBuf,
        pub args: Vec<String>,
    }

    impl TerraformCall {
        pub fn subcommand(&self) -> &str {
            self.args.first().map(String::as_str).unwrap_or_default()
        }
    }

    struct FakeTfState {
        calls: Vec<TerraformCall>,
        failures: HashMap<String, String>,
        timeouts: Vec<String>,
        outputs: serde_json::Value,
    }

    /// Scripted Terraform for testing.
    ///
    /// Succeeds by default. `apply` writes a `terraform.tfstate` into the
    /// workspace so status inference behaves as it would against the real
    /// binary.
    #[derive(Clone)]
    pub struct FakeTerraformRunner {
        inner: Arc<Mutex<FakeTfState>>,
    }

    impl Default for FakeTerraformRunner {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeTfState {
                    calls: Vec::new(),
                    failures: HashMap::new(),
                    timeouts: Vec::new(),
                    outputs: serde_json::json!({}),
                })),
            }
        }
    }

    impl FakeTerraformRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Exit 1 with `stderr` whenever `subcommand` runs.
        pub fn fail_on(&self, subcommand: &str, stderr: &str) {
            self.inner.lock().failures.insert(subcommand.to_string(), stderr.to_string());
        }

        pub fn timeout_on(&self, subcommand: &str) {
            self.inner.lock().timeouts.push(subcommand.to_string());
        }

        pub fn clear_failures(&self) {
            let mut state = self.inner.lock();
            state.failures.clear();
            state.timeouts.clear();
        }

        /// Set outputs as `terraform output -json` reports them.
        pub fn set_outputs(&self, outputs: serde_json::Value) {
            self.inner.lock().outputs = outputs;
        }

        pub fn calls(&self) -> Vec<TerraformCall> {
            self.inner.lock().calls.clone()
        }

        pub fn subcommands(&self) -> Vec<String> {
            self.inner.lock().calls.iter().map(|c| c.subcommand().to_string()).collect()
        }
    }

    #[async_trait]
    impl TerraformRunner for FakeTerraformRunner {
        async fn run(
            &self,
            workspace: &Path,
            args: &[&str],
        ) -> Result<CommandOutput, TerraformError> {
            let subcommand = args.first().copied().unwrap_or_default().to_string();
            let (failure, timed_out, outputs) = {
                let mut state = self.inner.lock();
                state.calls.push(TerraformCall {
                    workspace: workspace.to_path_buf(),
                    args: args.iter().map(|a| a.to_string()).collect(),
                });
                (
                    state.failures.get(&subcommand).cloned(),
                    state.timeouts.contains(&subcommand),
                    state.outputs.clone(),
                )
            };

            if timed_out {
                return Err(TerraformError::Timeout {
                    command: subcommand,
                    timeout: Duration::from_secs(1),
                });
            }
            if let Some(stderr) = failure {
                return Ok(CommandOutput { exit_code: Some(1), stdout: String::new(), stderr });
            }

            let stdout = match subcommand.as_str() {
                "apply" => {
                    let _ = std::fs::write(workspace.join("terraform.tfstate"), "{}");
                    "Apply complete!".to_string()
                }
                "output" => outputs.to_string(),
                _ => String::new(),
            };
            Ok(CommandOutput { exit_code: Some(0), stdout, stderr: String::new() })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTerraformRunner, TerraformCall};

#[cfg(test)]
#[path = "terraform_tests.rs"]
mod tests;
