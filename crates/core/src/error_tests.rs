// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    validation     = { PlatformError::validation("bad"),     "validation_error",     400 },
    not_found      = { PlatformError::not_found("gone"),     "not_found",            404 },
    conflict       = { PlatformError::conflict("busy"),      "conflict",             409 },
    github         = { PlatformError::github("boom"),        "github_error",         502 },
    aws            = { PlatformError::aws("boom"),           "aws_error",            502 },
    infrastructure = { PlatformError::infrastructure("tf"),  "infrastructure_error", 500 },
    deployment     = { PlatformError::deployment("ecs"),     "deployment_error",     500 },
    uninitialized  = { PlatformError::NotInitialized,        "state_not_initialized", 503 },
    internal       = { PlatformError::internal("oops"),      "internal_error",       500 },
)]
fn error_kind_maps_to_type_and_status(err: PlatformError, error_type: &str, status: u16) {
    assert_eq!(err.error_type(), error_type);
    assert_eq!(err.status_code(), status);
}

#[test]
fn details_survive_into_body() {
    let err = PlatformError::github("repository create failed")
        .with_detail("status", "422")
        .with_detail("repo", "svc-a");

    let body = err.to_body();
    assert_eq!(body.error_type, "github_error");
    assert_eq!(body.message, "repository create failed");
    assert_eq!(body.details.get("status").map(String::as_str), Some("422"));
    assert_eq!(body.details.get("repo").map(String::as_str), Some("svc-a"));
}

#[test]
fn not_initialized_ignores_details() {
    let err = PlatformError::NotInitialized.with_detail("k", "v");
    assert!(err.details().is_empty());
    assert!(!err.is_client_error());
}

#[test]
fn client_errors_are_4xx() {
    assert!(PlatformError::validation("x").is_client_error());
    assert!(PlatformError::conflict("x").is_client_error());
    assert!(!PlatformError::deployment("x").is_client_error());
}

#[test]
fn body_serializes_with_snake_case_fields() {
    let body = PlatformError::validation("name too long").to_body();
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["error_type"], "validation_error");
    assert_eq!(json["message"], "name too long");
    assert!(json["details"].as_object().unwrap().is_empty());
}
