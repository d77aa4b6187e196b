// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository topics as the durable muppet record.
//!
//! GitHub topics are lowercase, alphanumeric and hyphenated, so values are
//! written as `template-<name>`, `status-<value>` and `port-<n>`. The reader
//! also accepts `template:<name>`.

use crate::muppet::MuppetStatus;

/// Marker topic identifying a repository as a muppet.
pub const MUPPET_TOPIC: &str = "muppet";

const TEMPLATE_PREFIXES: [&str; 2] = ["template-", "template:"];
const STATUS_PREFIX: &str = "status-";
const PORT_PREFIX: &str = "port-";

pub fn is_muppet(topics: &[String]) -> bool {
    topics.iter().any(|t| t == MUPPET_TOPIC)
}

pub fn parse_template(topics: &[String]) -> Option<String> {
    topics.iter().find_map(|t| {
        TEMPLATE_PREFIXES
            .iter()
            .find_map(|prefix| t.strip_prefix(prefix))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

/// Status recorded in topics.
///
/// A missing or unparseable status yields `Error` so a broken record shows up
/// instead of passing as healthy.
pub fn parse_status(topics: &[String]) -> MuppetStatus {
    topics
        .iter()
        .find_map(|t| t.strip_prefix(STATUS_PREFIX))
        .and_then(|s| s.parse().ok())
        .unwrap_or(MuppetStatus::Error)
}

pub fn parse_port(topics: &[String]) -> Option<u16> {
    topics.iter().find_map(|t| t.strip_prefix(PORT_PREFIX)).and_then(|p| p.parse().ok())
}

/// Topic set for a muppet repository. `template` must already have passed
/// [`validate_template_name`](crate::validate_template_name) so it reads back unchanged.
pub fn muppet_topics(template: &str, status: MuppetStatus, port: u16) -> Vec<String> {
    vec![
        MUPPET_TOPIC.to_string(),
        format!("{}{template}", TEMPLATE_PREFIXES[0]),
        format!("{STATUS_PREFIX}{status}"),
        format!("{PORT_PREFIX}{port}"),
    ]
}

#[cfg(test)]
#[path = "topics_tests.rs"]
mod tests;
