// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS settings for a muppet's load balancer, read from Parameter Store.

use std::sync::Arc;

use muppet_adapters::ParameterStore;
use muppet_core::PlatformError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::PlatformConfig;

const CERTIFICATE_KEY: &str = "certificate-arn";
const HOSTED_ZONE_KEY: &str = "hosted-zone-id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsConfig {
    pub certificate_arn: String,
    pub hosted_zone_id: String,
    pub domain_name: String,
}

impl TlsConfig {
    /// Terraform variables that switch the service module to HTTPS.
    pub fn terraform_variables(&self) -> [(&'static str, Value); 4] {
        [
            ("enable_https", Value::Bool(true)),
            ("certificate_arn", Value::from(self.certificate_arn.as_str())),
            ("hosted_zone_id", Value::from(self.hosted_zone_id.as_str())),
            ("domain_name", Value::from(self.domain_name.as_str())),
        ]
    }
}

pub struct TlsConfigurator {
    config: Arc<PlatformConfig>,
    params: Arc<dyn ParameterStore>,
}

impl TlsConfigurator {
    pub fn new(config: Arc<PlatformConfig>, params: Arc<dyn ParameterStore>) -> Self {
        Self { config, params }
    }

    pub async fn configure(&self, muppet_name: &str) -> Result<TlsConfig, PlatformError> {
        let (certificate_arn, hosted_zone_id) =
            tokio::join!(self.required(CERTIFICATE_KEY), self.required(HOSTED_ZONE_KEY));
        let tls = TlsConfig {
            certificate_arn: certificate_arn?,
            hosted_zone_id: hosted_zone_id?,
            domain_name: format!("{muppet_name}.{}", self.config.base_domain),
        };
        debug!(muppet = %muppet_name, domain = %tls.domain_name, "tls configured");
        Ok(tls)
    }

    async fn required(&self, key: &str) -> Result<String, PlatformError> {
        let path = format!("{}/{key}", self.config.tls_param_prefix.trim_end_matches('/'));
        match self.params.get(&path).await? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(PlatformError::not_found(format!("TLS parameter {path} is not set"))
                .with_detail("parameter", path)),
        }
    }
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;
