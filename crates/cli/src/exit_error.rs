// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of exiting directly so `main()`
//! owns process termination.

use std::fmt;

use muppet_core::PlatformError;

/// Caller mistakes (bad input, unknown muppet, conflicting state)
pub const USAGE_EXIT: i32 = 2;
pub const FAILURE_EXIT: i32 = 1;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<PlatformError> for ExitError {
    fn from(e: PlatformError) -> Self {
        let code = if e.is_client_error() { USAGE_EXIT } else { FAILURE_EXIT };
        let mut message = e.to_string();
        for (key, value) in e.details() {
            message.push_str(&format!("\n  {key}: {value}"));
        }
        Self::new(code, message)
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
