// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    simple = { "LOG_LEVEL=debug", "LOG_LEVEL", "debug" },
    empty_value = { "FLAG=", "FLAG", "" },
    value_with_equals = { "JAVA_OPTS=-Xmx=512m", "JAVA_OPTS", "-Xmx=512m" },
)]
fn parses_pairs(input: &str, key: &str, value: &str) {
    assert_eq!(parse_key_value(input), Ok((key.to_string(), value.to_string())));
}

#[yare::parameterized(
    no_equals = { "LOG_LEVEL" },
    empty_key = { "=debug" },
)]
fn rejects_malformed_pairs(input: &str) {
    assert!(parse_key_value(input).is_err());
}
