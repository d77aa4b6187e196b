// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter store adapter (AWS Systems Manager Parameter Store)

use crate::aws::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::types::ParameterType;
use std::collections::BTreeMap;

const SERVICE: &str = "ssm";

/// Adapter for hierarchical key/value configuration
#[async_trait]
pub trait ParameterStore: Send + Sync + 'static {
    /// All parameters under `prefix`, keyed by full parameter name.
    async fn get_by_path(
        &self,
        prefix: &str,
        recursive: bool,
    ) -> Result<BTreeMap<String, String>, AwsError>;

    /// `Ok(None)` when the parameter does not exist.
    async fn get(&self, name: &str) -> Result<Option<String>, AwsError>;

    /// Create or overwrite a plain string parameter.
    async fn put(&self, name: &str, value: &str) -> Result<(), AwsError>;

    /// Returns `false` when the parameter did not exist.
    async fn delete(&self, name: &str) -> Result<bool, AwsError>;
}

#[derive(Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_ssm::Client::new(config) }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_by_path(
        &self,
        prefix: &str,
        recursive: bool,
    ) -> Result<BTreeMap<String, String>, AwsError> {
        let mut params = BTreeMap::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .get_parameters_by_path()
                .path(prefix)
                .recursive(recursive)
                .with_decryption(true)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::request(SERVICE, "GetParametersByPath", e))?;

            for param in output.parameters() {
                if let (Some(name), Some(value)) = (param.name(), param.value()) {
                    params.insert(name.to_string(), value.to_string());
                }
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        tracing::debug!(%prefix, count = params.len(), "read parameters by path");
        Ok(params)
    }

    async fn get(&self, name: &str) -> Result<Option<String>, AwsError> {
        let result = self.client.get_parameter().name(name).with_decryption(true).send().await;
        match result {
            Ok(output) => Ok(output.parameter().and_then(|p| p.value()).map(str::to_string)),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_parameter_not_found()) => {
                Ok(None)
            }
            Err(e) => Err(AwsError::request(SERVICE, "GetParameter", e)),
        }
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), AwsError> {
        self.client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| AwsError::request(SERVICE, "PutParameter", e))?;
        tracing::debug!(%name, "wrote parameter");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, AwsError> {
        match self.client.delete_parameter().name(name).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_parameter_not_found()) => {
                Ok(false)
            }
            Err(e) => Err(AwsError::request(SERVICE, "DeleteParameter", e)),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AwsError, ParameterStore, SERVICE};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeParamState {
        params: BTreeMap<String, String>,
        fail: bool,
    }

    /// In-memory parameter store for testing
    #[derive(Clone, Default)]
    pub struct FakeParameterStore {
        inner: Arc<Mutex<FakeParamState>>,
    }

    impl FakeParameterStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, name: &str, value: &str) {
            self.inner.lock().params.insert(name.to_string(), value.to_string());
        }

        pub fn value(&self, name: &str) -> Option<String> {
            self.inner.lock().params.get(name).cloned()
        }

        /// Make every subsequent call fail.
        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        fn check(&self, operation: &'static str) -> Result<(), AwsError> {
            if self.inner.lock().fail {
                return Err(AwsError::Request {
                    service: SERVICE,
                    operation,
                    message: "injected failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ParameterStore for FakeParameterStore {
        async fn get_by_path(
            &self,
            prefix: &str,
            recursive: bool,
        ) -> Result<BTreeMap<String, String>, AwsError> {
            self.check("GetParametersByPath")?;
            let base = format!("{}/", prefix.trim_end_matches('/'));
            Ok(self
                .inner
                .lock()
                .params
                .iter()
                .filter(|(k, _)| {
                    k.strip_prefix(&base)
                        .is_some_and(|rest| !rest.is_empty() && (recursive || !rest.contains('/')))
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }

        async fn get(&self, name: &str) -> Result<Option<String>, AwsError> {
            self.check("GetParameter")?;
            Ok(self.value(name))
        }

        async fn put(&self, name: &str, value: &str) -> Result<(), AwsError> {
            self.check("PutParameter")?;
            self.insert(name, value);
            Ok(())
        }

        async fn delete(&self, name: &str) -> Result<bool, AwsError> {
            self.check("DeleteParameter")?;
            Ok(self.inner.lock().params.remove(name).is_some())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeParameterStore;

#[cfg(test)]
#[path = "param_store_tests.rs"]
mod tests;
