// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::collections::BTreeMap;

const SOURCE: &str = "git::https://example.com/modules.git";

fn config() -> InfrastructureConfig {
    InfrastructureConfig::new("billing", "eu-west-1", "production")
}

#[test]
fn module_address_is_unpinned_without_version() {
    assert_eq!(module_address(&config(), SOURCE), format!("{SOURCE}//fargate-service"));
}

#[test]
fn module_address_pins_known_version() {
    let config = config()
        .module_versions(BTreeMap::from([(SERVICE_MODULE.to_string(), "1.4.0".to_string())]));
    assert_eq!(
        module_address(&config, &format!("{SOURCE}/")),
        format!("{SOURCE}//fargate-service?ref=1.4.0")
    );
}

#[test]
fn main_wires_every_variable_into_the_module() {
    let files = render(&config(), SOURCE).unwrap();
    for name in config().terraform_variables().keys() {
        assert!(files.main.contains(&format!("var.{name}")), "{name} not wired");
    }
    for output in OUTPUTS {
        assert!(files.main.contains(&format!("module.service.{output}")), "{output} missing");
    }
    assert!(files.main.contains("hashicorp/aws"));
}

#[test]
fn variables_declare_types() {
    let files = render(&config(), SOURCE).unwrap();
    assert!(files.variables.contains("variable \"muppet_name\""));
    assert!(files.variables.contains("map(string)"));
    assert!(files.variables.contains("sensitive = true"));
}

#[test]
fn tfvars_carry_values_and_overrides() {
    let config = config().with_variable("desired_count", 3).with_variable("team", "payments");
    let files = render(&config, SOURCE).unwrap();
    assert!(files.tfvars.contains("\"billing\""));
    assert!(files.tfvars.contains("\"eu-west-1\""));
    assert!(files.tfvars.contains("\"payments\""));
    assert!(files.variables.contains("variable \"team\""));
}

#[test]
fn entries_name_all_three_files() {
    let files = render(&config(), SOURCE).unwrap();
    let names: Vec<_> = files.entries().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec![MAIN_FILE, VARIABLES_FILE, TFVARS_FILE]);
}

#[yare::parameterized(
    boolean  = { json!(true), "bool" },
    number   = { json!(3), "number" },
    string   = { json!("x"), "string" },
    strings  = { json!(["a", "b"]), "list(string)" },
    mixed    = { json!([1, "b"]), "list(any)" },
    map      = { json!({"k": "v"}), "map(string)" },
    nested   = { json!({"k": {"n": 1}}), "map(any)" },
    null     = { json!(null), "any" },
)]
fn type_constraints(value: Value, expected: &str) {
    assert_eq!(type_of(&value), expected);
}
