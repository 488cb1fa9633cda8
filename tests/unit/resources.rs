//! Unit tests for replica materialization
//!
//! Covers naming, volume rewriting, claim spec fidelity, labels, and
//! ownership of generated pods and claims.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, PersistentVolumeClaimSpec, PodSpec, PodTemplateSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

use statefulcluster_operator::crd::{ClaimTemplate, StatefulCluster, StatefulClusterSpec};
use statefulcluster_operator::resources::replica::{claim_name, materialize, replica_name};

fn selector(pairs: &[(&str, &str)]) -> LabelSelector {
    LabelSelector {
        match_labels: Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

fn claim_template(name: &str, size: &str) -> ClaimTemplate {
    ClaimTemplate {
        name: name.to_string(),
        spec: PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            storage_class_name: Some("standard".to_string()),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(size.to_string()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

fn test_cluster(name: &str, templates: Vec<ClaimTemplate>) -> StatefulCluster {
    let mut cluster = StatefulCluster::new(
        name,
        StatefulClusterSpec {
            replicas: 1,
            selector: selector(&[("app", name)]),
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "main".to_string(),
                        image: Some("busybox".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
                ..Default::default()
            },
            volume_claim_templates: templates,
        },
    );
    cluster.metadata.namespace = Some("default".to_string());
    cluster.metadata.uid = Some("test-uid-12345".to_string());
    cluster
}

#[test]
fn test_naming_round_trip() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (pod, claims) = materialize(&cluster, "deadbeef");

    assert_eq!(pod.metadata.name, Some(replica_name("db", "deadbeef")));
    assert_eq!(pod.metadata.name, Some("db-deadbeef".to_string()));
    assert_eq!(
        claims[0].metadata.name,
        Some(claim_name("db", "data", "deadbeef"))
    );
    assert_eq!(claims[0].metadata.name, Some("db-data-deadbeef".to_string()));

    // The pod's volume references exactly that claim
    let volumes = pod.spec.as_ref().unwrap().volumes.as_ref().unwrap();
    assert_eq!(
        volumes[0].persistent_volume_claim.as_ref().unwrap().claim_name,
        "db-data-deadbeef"
    );
}

#[test]
fn test_one_claim_per_template_in_order() {
    let cluster = test_cluster(
        "db",
        vec![claim_template("data", "10Gi"), claim_template("wal", "1Gi")],
    );
    let (pod, claims) = materialize(&cluster, "deadbeef");

    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].metadata.name, Some("db-data-deadbeef".to_string()));
    assert_eq!(claims[1].metadata.name, Some("db-wal-deadbeef".to_string()));

    let volumes = pod.spec.as_ref().unwrap().volumes.as_ref().unwrap();
    assert_eq!(volumes.len(), 2);
    assert_eq!(volumes[0].name, "data");
    assert_eq!(volumes[1].name, "wal");
}

#[test]
fn test_claim_spec_copied_verbatim() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (_pod, claims) = materialize(&cluster, "deadbeef");

    let spec = claims[0].spec.as_ref().unwrap();
    assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
    assert_eq!(spec.storage_class_name, Some("standard".to_string()));
    let requests = spec.resources.as_ref().unwrap().requests.as_ref().unwrap();
    assert_eq!(requests.get("storage"), Some(&Quantity("10Gi".to_string())));
}

#[test]
fn test_pod_and_claims_owned_by_cluster() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (pod, claims) = materialize(&cluster, "deadbeef");

    for meta in [&pod.metadata, &claims[0].metadata] {
        let owners = meta.owner_references.as_ref().unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "StatefulCluster");
        assert_eq!(owners[0].name, "db");
        assert_eq!(owners[0].uid, "test-uid-12345");
        assert_eq!(owners[0].controller, Some(true));
    }
}

#[test]
fn test_replicas_carry_selector_labels() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (pod, claims) = materialize(&cluster, "deadbeef");

    for meta in [&pod.metadata, &claims[0].metadata] {
        let labels = meta.labels.as_ref().unwrap();
        assert_eq!(labels.get("app"), Some(&"db".to_string()));
    }
}

#[test]
fn test_pod_template_spec_preserved() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (pod, _claims) = materialize(&cluster, "deadbeef");

    let containers = &pod.spec.as_ref().unwrap().containers;
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].name, "main");
    assert_eq!(containers[0].image, Some("busybox".to_string()));
}

#[test]
fn test_distinct_suffixes_distinct_identities() {
    let cluster = test_cluster("db", vec![claim_template("data", "10Gi")]);
    let (pod_a, claims_a) = materialize(&cluster, "aaaaaaaa");
    let (pod_b, claims_b) = materialize(&cluster, "bbbbbbbb");

    assert_ne!(pod_a.metadata.name, pod_b.metadata.name);
    assert_ne!(claims_a[0].metadata.name, claims_b[0].metadata.name);
}
