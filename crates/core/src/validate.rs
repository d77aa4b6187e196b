// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input validation shared by every entry point.

use crate::error::PlatformError;

/// GitHub's repository name limit.
pub const MAX_NAME_LEN: usize = 100;

/// GitHub topics are at most 50 characters, less the `template-` prefix.
pub const MAX_TEMPLATE_LEN: usize = 41;

/// Muppet names double as repository and ECS service names: ASCII
/// alphanumerics plus `.`, `-`, `_`, at most 100 characters.
pub fn validate_muppet_name(name: &str) -> Result<(), PlatformError> {
    if name.is_empty() {
        return Err(PlatformError::validation("muppet name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(PlatformError::validation(format!(
            "muppet name must be at most {MAX_NAME_LEN} characters"
        ))
        .with_detail("length", name.len().to_string()));
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(PlatformError::validation(format!(
            "muppet name contains invalid character '{bad}'"
        ))
        .with_detail("name", name));
    }
    if name.starts_with('.') {
        return Err(PlatformError::validation("muppet name must not start with '.'"));
    }
    Ok(())
}

/// Template names are written verbatim into a `template-<name>` repository
/// topic, so they follow GitHub's topic rules: lowercase ASCII alphanumerics
/// and `-`, starting with an alphanumeric, the whole topic at most 50
/// characters.
pub fn validate_template_name(template: &str) -> Result<(), PlatformError> {
    if template.is_empty() {
        return Err(PlatformError::validation("template must not be empty"));
    }
    if template.len() > MAX_TEMPLATE_LEN {
        return Err(PlatformError::validation(format!(
            "template name must be at most {MAX_TEMPLATE_LEN} characters"
        ))
        .with_detail("template", template));
    }
    if template.starts_with('-') || !template.chars().all(is_template_char) {
        return Err(PlatformError::validation(
            "template name must be lowercase letters, digits and '-'",
        )
        .with_detail("template", template));
    }
    Ok(())
}

fn is_template_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
