// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of the three Terraform files each workspace holds.

use hcl::expr::RawExpression;
use hcl::{Block, Body};
use muppet_core::InfrastructureConfig;
use serde_json::Value;

use super::TFVARS_FILE;

pub(crate) const MAIN_FILE: &str = "main.tf";
pub(crate) const VARIABLES_FILE: &str = "variables.tf";

/// Module every muppet's infrastructure is built from
pub(crate) const SERVICE_MODULE: &str = "fargate-service";

/// Outputs re-exported from the service module
pub(crate) const OUTPUTS: [&str; 5] =
    ["service_arn", "service_url", "cluster_name", "load_balancer_dns", "log_group_name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeneratedFiles {
    pub main: String,
    pub variables: String,
    pub tfvars: String,
}

impl GeneratedFiles {
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [(MAIN_FILE, &self.main), (VARIABLES_FILE, &self.variables), (TFVARS_FILE, &self.tfvars)]
    }
}

pub(crate) fn render(
    config: &InfrastructureConfig,
    module_source: &str,
) -> Result<GeneratedFiles, hcl::Error> {
    let vars = config.terraform_variables();
    Ok(GeneratedFiles {
        main: hcl::to_string(&main_body(config, module_source, vars.keys()))?,
        variables: hcl::to_string(&variables_body(&vars))?,
        tfvars: hcl::to_string(&vars)?,
    })
}

fn raw(expr: impl Into<String>) -> RawExpression {
    RawExpression::new(expr.into())
}

/// `<source>//fargate-service`, pinned with `?ref=` when a version is known.
pub(crate) fn module_address(config: &InfrastructureConfig, module_source: &str) -> String {
    let base = format!("{}//{SERVICE_MODULE}", module_source.trim_end_matches('/'));
    match config.module_versions.get(SERVICE_MODULE) {
        Some(version) => format!("{base}?ref={version}"),
        None => base,
    }
}

fn main_body<'a>(
    config: &InfrastructureConfig,
    module_source: &str,
    var_names: impl Iterator<Item = &'a String>,
) -> Body {
    let terraform = Block::builder("terraform")
        .add_attribute(("required_version", ">= 1.5.0"))
        .add_block(
            Block::builder("required_providers")
                .add_attribute(("aws", raw(r#"{ source = "hashicorp/aws", version = "~> 5.0" }"#)))
                .build(),
        )
        .build();

    let provider = Block::builder("provider")
        .add_label("aws")
        .add_attribute(("region", raw("var.aws_region")))
        .build();

    let mut module = Block::builder("module")
        .add_label("service")
        .add_attribute(("source", module_address(config, module_source)));
    for name in var_names {
        module = module.add_attribute((name.as_str(), raw(format!("var.{name}"))));
    }

    let mut body =
        Body::builder().add_block(terraform).add_block(provider).add_block(module.build());
    for output in OUTPUTS {
        body = body.add_block(
            Block::builder("output")
                .add_label(output)
                .add_attribute(("value", raw(format!("module.service.{output}"))))
                .build(),
        );
    }
    body.build()
}

fn variables_body(vars: &indexmap::IndexMap<String, Value>) -> Body {
    let mut body = Body::builder();
    for (name, value) in vars {
        let mut block = Block::builder("variable")
            .add_label(name.as_str())
            .add_attribute(("type", raw(type_of(value))));
        if name == "secrets" {
            block = block.add_attribute(("sensitive", true));
        }
        body = body.add_block(block.build());
    }
    body.build()
}

/// Terraform type constraint for a variable value.
pub(crate) fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(items) if items.iter().all(Value::is_string) => "list(string)",
        Value::Array(_) => "list(any)",
        Value::Object(fields) if fields.values().all(Value::is_string) => "map(string)",
        Value::Object(_) => "map(any)",
        Value::Null => "any",
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
