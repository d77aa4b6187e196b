// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use muppet_adapters::{FakeOrchestrator, FakeParameterStore, FakeSourceControl};
use proptest::prelude::*;

const PREFIX: &str = "/muppet-platform/terraform/modules";

struct Sources {
    scm: FakeSourceControl,
    params: FakeParameterStore,
    ecs: FakeOrchestrator,
    config: PlatformConfig,
}

impl Sources {
    fn new() -> Self {
        Self {
            scm: FakeSourceControl::new("acme"),
            params: FakeParameterStore::new(),
            ecs: FakeOrchestrator::new(),
            config: PlatformConfig::default(),
        }
    }

    async fn reconstruct(&self) -> Reconstruction {
        reconstruct(&self.scm, &self.params, &self.ecs, &self.config).await
    }
}

#[yare::parameterized(
    versioned  = { "/muppet-platform/terraform/modules/fargate/version", Some("fargate") },
    bare       = { "/muppet-platform/terraform/modules/vpc", Some("vpc") },
    nested     = { "/muppet-platform/terraform/modules/aws/ecr/version", Some("aws/ecr") },
    prefix     = { "/muppet-platform/terraform/modules", None },
    stray      = { "/muppet-platform/terraform/modules/version", None },
    elsewhere  = { "/other/vpc/version", None },
)]
fn module_names_from_parameter_keys(key: &str, expected: Option<&str>) {
    assert_eq!(module_name(PREFIX, key).as_deref(), expected);
}

#[tokio::test]
async fn discovery_filters_to_muppet_repositories() {
    let sources = Sources::new();
    sources.scm.add_repo("billing", &["muppet", "template-java-micronaut", "status-running"]);
    sources.scm.add_repo("website", &["frontend"]);
    sources.scm.add_repo("legacy", &["muppet", "template:node-express", "port-8080"]);

    let mut muppets = discover_muppets(&sources.scm, 3000).await.unwrap();
    muppets.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(muppets.len(), 2);
    assert_eq!(muppets[0].name, "billing");
    assert_eq!(muppets[0].status, MuppetStatus::Running);
    assert_eq!(muppets[0].port, 3000);
    assert_eq!(muppets[0].github_repo_url, "https://github.com/acme/billing");
    assert_eq!(muppets[1].template, "node-express");
    assert_eq!(muppets[1].status, MuppetStatus::Error);
    assert_eq!(muppets[1].port, 8080);
}

#[tokio::test]
async fn repository_without_template_topic_is_kept() {
    let sources = Sources::new();
    sources.scm.add_repo("mystery", &["muppet", "status-stopped"]);
    let muppets = discover_muppets(&sources.scm, 3000).await.unwrap();
    assert_eq!(muppets[0].template, UNKNOWN_TEMPLATE);
}

#[test]
fn enrichment_promotes_creating_muppets_with_live_deployments() {
    let mut muppets = vec![
        Muppet::new("a", "t", "u"),
        Muppet { status: MuppetStatus::Stopped, ..Muppet::new("b", "t", "u") },
        Muppet::new("c", "t", "u"),
    ];
    let active: BTreeMap<_, _> =
        [("a".to_string(), "arn:a".to_string()), ("b".to_string(), "arn:b".to_string())].into();
    let versions: BTreeMap<_, _> = [(FARGATE_MODULE.to_string(), "1.2.3".to_string())].into();

    let promoted = enrich(&mut muppets, &active, &versions);

    assert_eq!(promoted, vec!["a"]);
    assert_eq!(muppets[0].status, MuppetStatus::Running);
    assert_eq!(muppets[1].status, MuppetStatus::Stopped);
    assert_eq!(muppets[1].fargate_service_arn.as_deref(), Some("arn:b"));
    assert_eq!(muppets[2].status, MuppetStatus::Creating);
    assert_eq!(muppets[2].fargate_service_arn, None);
    assert!(muppets.iter().all(|m| m.terraform_version.as_deref() == Some("1.2.3")));
}

#[tokio::test]
async fn parameter_store_failure_degrades_to_empty_versions() {
    let sources = Sources::new();
    sources.scm.add_repo("svc", &["muppet", "status-creating"]);
    sources.ecs.add_service("svc", 1, 1);
    sources.params.set_failing(true);

    let rebuilt = sources.reconstruct().await;

    assert_eq!(rebuilt.failed_sources, vec![StateSource::ParameterStore]);
    assert!(rebuilt.state.terraform_versions.is_empty());
    assert_eq!(rebuilt.state.muppets.len(), 1);
    assert_eq!(rebuilt.state.active_deployments.len(), 1);
    assert_eq!(rebuilt.state.muppets[0].status, MuppetStatus::Running);
}

#[tokio::test]
async fn orchestrator_failure_degrades_to_empty_deployments() {
    let sources = Sources::new();
    sources.scm.add_repo("svc", &["muppet", "status-creating"]);
    sources.params.insert(&format!("{PREFIX}/vpc/version"), "2.0.0");
    sources.ecs.set_failing(true);

    let rebuilt = sources.reconstruct().await;

    assert_eq!(rebuilt.failed_sources, vec![StateSource::Orchestrator]);
    assert!(rebuilt.state.active_deployments.is_empty());
    assert_eq!(rebuilt.state.terraform_versions["vpc"], "2.0.0");
    assert_eq!(rebuilt.state.muppets[0].status, MuppetStatus::Creating);
    assert!(rebuilt.promoted.is_empty());
}

#[tokio::test]
async fn every_source_failing_is_reported() {
    let sources = Sources::new();
    sources.scm.fail_on("discover");
    sources.params.set_failing(true);
    sources.ecs.set_failing(true);

    let rebuilt = sources.reconstruct().await;
    assert!(rebuilt.all_sources_failed());
    assert!(rebuilt.state.muppets.is_empty());
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

proptest! {
    #[test]
    fn reconstruction_is_complete(
        specs in prop::collection::btree_map(
            "[a-z][a-z0-9-]{0,12}",
            (prop::sample::select(vec!["creating", "running", "stopped", "error"]), any::<bool>()),
            0..12,
        )
    ) {
        let sources = Sources::new();
        let mut deployed = 0;
        for (name, (status, live)) in &specs {
            let status_topic = format!("status-{status}");
            sources.scm.add_repo(name, &["muppet", status_topic.as_str()]);
            if *live {
                sources.ecs.add_service(name, 1, 1);
                deployed += 1;
            }
        }

        let rebuilt = runtime().block_on(sources.reconstruct());

        prop_assert_eq!(rebuilt.state.muppets.len(), specs.len());
        let with_arn =
            rebuilt.state.muppets.iter().filter(|m| m.fargate_service_arn.is_some()).count();
        prop_assert_eq!(with_arn, deployed);
        for muppet in &rebuilt.state.muppets {
            let (status, live) = specs[&muppet.name];
            if status == "creating" && live {
                prop_assert_eq!(muppet.status, MuppetStatus::Running);
                prop_assert!(rebuilt.promoted.contains(&muppet.name));
            } else {
                prop_assert_eq!(muppet.status.to_string(), status);
            }
        }
    }
}
