// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input parameters for one Terraform run.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::muppet::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpcConfig {
    pub cidr_block: String,
    pub availability_zones: Vec<String>,
    pub enable_nat_gateway: bool,
}

impl Default for VpcConfig {
    fn default() -> Self {
        Self {
            cidr_block: "10.0.0.0/16".to_string(),
            availability_zones: Vec::new(),
            enable_nat_gateway: true,
        }
    }
}

/// Fargate task and service sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FargateConfig {
    pub image: String,
    /// CPU units
    pub cpu: u32,
    /// MiB
    pub memory: u32,
    pub port: u16,
    pub desired_count: u32,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub health_check_path: String,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    /// Name → secret ARN / parameter path
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
}

impl Default for FargateConfig {
    fn default() -> Self {
        Self {
            image: String::new(),
            cpu: 256,
            memory: 512,
            port: DEFAULT_PORT,
            desired_count: 1,
            min_capacity: 1,
            max_capacity: 10,
            health_check_path: "/health".to_string(),
            environment_variables: BTreeMap::new(),
            secrets: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enable_logging: bool,
    pub log_retention_days: u32,
    pub enable_alarms: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { enable_logging: true, log_retention_days: 7, enable_alarms: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    pub muppet_name: String,
    pub region: String,
    pub environment: String,
    /// Module name → version (git ref) to pin in the generated config.
    #[serde(default)]
    pub module_versions: BTreeMap<String, String>,
    #[serde(default)]
    pub vpc: VpcConfig,
    #[serde(default)]
    pub fargate: FargateConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Extra Terraform variables; these win over the explicit fields above.
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
}

impl InfrastructureConfig {
    pub fn new(
        muppet_name: impl Into<String>,
        region: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            muppet_name: muppet_name.into(),
            region: region.into(),
            environment: environment.into(),
            module_versions: BTreeMap::new(),
            vpc: VpcConfig::default(),
            fargate: FargateConfig::default(),
            monitoring: MonitoringConfig::default(),
            variables: IndexMap::new(),
        }
    }

    crate::setters! {
        set {
            module_versions: BTreeMap<String, String>,
            vpc: VpcConfig,
            fargate: FargateConfig,
            monitoring: MonitoringConfig,
        }
    }

    /// Add an extra variable that overrides any explicit field of the same name.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Flatten into the Terraform variable set, explicit fields first and
    /// `variables` applied on top.
    pub fn terraform_variables(&self) -> IndexMap<String, Value> {
        let mut vars = IndexMap::new();
        vars.insert("muppet_name".to_string(), json!(self.muppet_name));
        vars.insert("aws_region".to_string(), json!(self.region));
        vars.insert("environment".to_string(), json!(self.environment));

        vars.insert("vpc_cidr".to_string(), json!(self.vpc.cidr_block));
        vars.insert("availability_zones".to_string(), json!(self.vpc.availability_zones));
        vars.insert("enable_nat_gateway".to_string(), json!(self.vpc.enable_nat_gateway));

        let f = &self.fargate;
        vars.insert("container_image".to_string(), json!(f.image));
        vars.insert("cpu".to_string(), json!(f.cpu));
        vars.insert("memory".to_string(), json!(f.memory));
        vars.insert("container_port".to_string(), json!(f.port));
        vars.insert("desired_count".to_string(), json!(f.desired_count));
        vars.insert("min_capacity".to_string(), json!(f.min_capacity));
        vars.insert("max_capacity".to_string(), json!(f.max_capacity));
        vars.insert("health_check_path".to_string(), json!(f.health_check_path));
        vars.insert("environment_variables".to_string(), json!(f.environment_variables));
        vars.insert("secrets".to_string(), json!(f.secrets));

        let m = &self.monitoring;
        vars.insert("enable_logging".to_string(), json!(m.enable_logging));
        vars.insert("log_retention_days".to_string(), json!(m.log_retention_days));
        vars.insert("enable_alarms".to_string(), json!(m.enable_alarms));

        for (key, value) in &self.variables {
            vars.insert(key.clone(), value.clone());
        }
        vars
    }
}

#[cfg(test)]
#[path = "infra_tests.rs"]
mod tests;
