// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container orchestration adapter (ECS on Fargate)

use crate::aws::AwsError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SERVICE: &str = "ecs";
/// DescribeServices accepts at most 10 services per call.
const DESCRIBE_BATCH: usize = 10;

/// Snapshot of one ECS service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub arn: String,
    /// ACTIVE, DRAINING or INACTIVE
    pub status: String,
    pub running_count: i32,
    pub desired_count: i32,
    pub pending_count: i32,
    pub deployment_count: usize,
    pub task_definition: Option<String>,
}

impl ServiceInfo {
    /// Serving traffic: ACTIVE with at least one task wanted and running.
    pub fn is_active_deployment(&self) -> bool {
        self.status == "ACTIVE" && self.running_count > 0 && self.desired_count > 0
    }

    /// Settled on a single deployment with every desired task running.
    pub fn is_stable(&self) -> bool {
        self.deployment_count <= 1 && self.running_count == self.desired_count
    }
}

/// Adapter for the cluster that runs muppet services
#[async_trait]
pub trait ContainerOrchestrator: Send + Sync + 'static {
    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceInfo>, AwsError>;

    /// `Ok(None)` when the service does not exist.
    async fn get_service(&self, cluster: &str, name: &str)
        -> Result<Option<ServiceInfo>, AwsError>;

    async fn update_service(
        &self,
        cluster: &str,
        name: &str,
        desired_count: i32,
    ) -> Result<ServiceInfo, AwsError>;

    /// Service name to ARN for every service that is actively serving.
    async fn get_active_deployments(
        &self,
        cluster: &str,
    ) -> Result<BTreeMap<String, String>, AwsError> {
        Ok(self
            .list_services(cluster)
            .await?
            .into_iter()
            .filter(ServiceInfo::is_active_deployment)
            .map(|s| (s.name, s.arn))
            .collect())
    }
}

#[derive(Clone)]
pub struct EcsOrchestrator {
    client: aws_sdk_ecs::Client,
}

impl EcsOrchestrator {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: aws_sdk_ecs::Client::new(config) }
    }

    async fn describe(
        &self,
        cluster: &str,
        services: Vec<String>,
    ) -> Result<Vec<ServiceInfo>, AwsError> {
        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .set_services(Some(services))
            .send()
            .await
            .map_err(|e| AwsError::request(SERVICE, "DescribeServices", e))?;
        Ok(output.services().iter().map(service_info).collect())
    }
}

fn service_info(service: &aws_sdk_ecs::types::Service) -> ServiceInfo {
    ServiceInfo {
        name: service.service_name().unwrap_or_default().to_string(),
        arn: service.service_arn().unwrap_or_default().to_string(),
        status: service.status().unwrap_or_default().to_string(),
        running_count: service.running_count(),
        desired_count: service.desired_count(),
        pending_count: service.pending_count(),
        deployment_count: service.deployments().len(),
        task_definition: service.task_definition().map(str::to_string),
    }
}

#[async_trait]
impl ContainerOrchestrator for EcsOrchestrator {
    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceInfo>, AwsError> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_services()
                .cluster(cluster)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::request(SERVICE, "ListServices", e))?;
            arns.extend(output.service_arns().iter().cloned());
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        let mut services = Vec::with_capacity(arns.len());
        for batch in arns.chunks(DESCRIBE_BATCH) {
            services.extend(self.describe(cluster, batch.to_vec()).await?);
        }
        tracing::debug!(%cluster, count = services.len(), "listed ECS services");
        Ok(services)
    }

    async fn get_service(
        &self,
        cluster: &str,
        name: &str,
    ) -> Result<Option<ServiceInfo>, AwsError> {
        let services = self.describe(cluster, vec![name.to_string()]).await?;
        Ok(services.into_iter().find(|s| s.status != "INACTIVE"))
    }

    async fn update_service(
        &self,
        cluster: &str,
        name: &str,
        desired_count: i32,
    ) -> Result<ServiceInfo, AwsError> {
        let output = self
            .client
            .update_service()
            .cluster(cluster)
            .service(name)
            .desired_count(desired_count)
            .send()
            .await
            .map_err(|e| AwsError::request(SERVICE, "UpdateService", e))?;
        let service = output.service().ok_or_else(|| AwsError::Response {
            service: SERVICE,
            message: format!("UpdateService returned no service for {name}"),
        })?;
        tracing::info!(%cluster, service = %name, desired_count, "updated ECS desired count");
        Ok(service_info(service))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AwsError, ContainerOrchestrator, ServiceInfo, SERVICE};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeEcsState {
        services: BTreeMap<String, ServiceInfo>,
        updates: Vec<(String, i32)>,
        fail: bool,
    }

    /// In-memory cluster for testing. The cluster argument is ignored.
    #[derive(Clone, Default)]
    pub struct FakeOrchestrator {
        inner: Arc<Mutex<FakeEcsState>>,
    }

    impl FakeOrchestrator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed an ACTIVE service with `running` of `desired` tasks up.
        pub fn add_service(&self, name: &str, running: i32, desired: i32) -> ServiceInfo {
            let info = ServiceInfo {
                name: name.to_string(),
                arn: format!("arn:aws:ecs:us-west-2:123456789012:service/cluster/{name}"),
                status: "ACTIVE".to_string(),
                running_count: running,
                desired_count: desired,
                pending_count: (desired - running).max(0),
                deployment_count: 1,
                task_definition: Some(format!("{name}:1")),
            };
            self.inner.lock().services.insert(name.to_string(), info.clone());
            info
        }

        pub fn set_status(&self, name: &str, status: &str) {
            if let Some(s) = self.inner.lock().services.get_mut(name) {
                s.status = status.to_string();
            }
        }

        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// Recorded `(service, desired_count)` updates
        pub fn updates(&self) -> Vec<(String, i32)> {
            self.inner.lock().updates.clone()
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
    impl ContainerOrchestrator for FakeOrchestrator {
        async fn list_services(&self, _cluster: &str) -> Result<Vec<ServiceInfo>, AwsError> {
            self.check("ListServices")?;
            Ok(self.inner.lock().services.values().cloned().collect())
        }

        async fn get_service(
            &self,
            _cluster: &str,
            name: &str,
        ) -> Result<Option<ServiceInfo>, AwsError> {
            self.check("DescribeServices")?;
            Ok(self.inner.lock().services.get(name).cloned())
        }

        async fn update_service(
            &self,
            _cluster: &str,
            name: &str,
            desired_count: i32,
        ) -> Result<ServiceInfo, AwsError> {
            self.check("UpdateService")?;
            let mut state = self.inner.lock();
            state.updates.push((name.to_string(), desired_count));
            let service = state.services.get_mut(name).ok_or_else(|| AwsError::Request {
                service: SERVICE,
                operation: "UpdateService",
                message: format!("ServiceNotFoundException: {name}"),
            })?;
            service.desired_count = desired_count;
            service.running_count = desired_count;
            service.pending_count = 0;
            Ok(service.clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeOrchestrator;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
