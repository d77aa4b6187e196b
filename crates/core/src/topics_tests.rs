// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn topics(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn marker_topic_identifies_muppets() {
    assert!(is_muppet(&topics(&["rust", "muppet"])));
    assert!(!is_muppet(&topics(&["muppets", "platform"])));
}

#[yare::parameterized(
    hyphen = { &["muppet", "template-java-micronaut"], Some("java-micronaut") },
    colon  = { &["template:node-express", "muppet"],   Some("node-express") },
    empty  = { &["template-"],                         None },
    absent = { &["muppet"],                            None },
)]
fn template_topic_forms(items: &[&str], expected: Option<&str>) {
    assert_eq!(parse_template(&topics(items)).as_deref(), expected);
}

#[yare::parameterized(
    running   = { &["status-running"],  MuppetStatus::Running },
    stopped   = { &["status-stopped"],  MuppetStatus::Stopped },
    creating  = { &["status-creating"], MuppetStatus::Creating },
    garbage   = { &["status-dancing"],  MuppetStatus::Error },
    missing   = { &["muppet"],          MuppetStatus::Error },
)]
fn status_topic_defaults_to_error(items: &[&str], expected: MuppetStatus) {
    assert_eq!(parse_status(&topics(items)), expected);
}

#[test]
fn port_topic_is_optional() {
    assert_eq!(parse_port(&topics(&["port-8080"])), Some(8080));
    assert_eq!(parse_port(&topics(&["port-http"])), None);
    assert_eq!(parse_port(&topics(&[])), None);
}

#[test]
fn written_topics_read_back() {
    let written = muppet_topics("java-micronaut", MuppetStatus::Stopped, 8080);
    assert!(is_muppet(&written));
    assert_eq!(parse_template(&written).as_deref(), Some("java-micronaut"));
    assert_eq!(parse_status(&written), MuppetStatus::Stopped);
    assert_eq!(parse_port(&written), Some(8080));
}

#[test]
fn every_valid_template_reads_back_unchanged() {
    for template in ["java-micronaut", "node20-express", "go", "a1-b2-c3"] {
        crate::validate_template_name(template).unwrap();
        let written = muppet_topics(template, MuppetStatus::Running, 3000);
        assert_eq!(parse_template(&written).as_deref(), Some(template));
    }
}

#[test]
fn templates_that_would_not_read_back_are_rejected_up_front() {
    for template in ["java_micronaut", "Java-Micronaut"] {
        assert!(crate::validate_template_name(template).is_err());
    }
}
