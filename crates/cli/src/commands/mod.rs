// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod create;
pub mod delete;
pub mod muppet;
pub mod platform;
pub mod scale;

/// Parse a `key=value` argument. The value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) =
        s.split_once('=').ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
