//! Replica materialization for StatefulClusters.
//!
//! Given a cluster and one fresh suffix, synthesizes the pod and the claim
//! set for a new replica:
//! - one claim per claim template, named `{cluster}-{template}-{suffix}`,
//!   carrying the template's spec verbatim
//! - one pod named `{cluster}-{suffix}` using the cluster's pod template,
//!   with its volume list rewritten to reference the generated claims
//!
//! Pure apart from the caller-supplied suffix, so it is unit-testable
//! without a store.

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimVolumeSource, Pod, Volume,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use crate::crd::StatefulCluster;
use crate::resources::common::{owner_reference, replica_labels};

/// Name of a replica pod
pub fn replica_name(cluster_name: &str, suffix: &str) -> String {
    format!("{}-{}", cluster_name, suffix)
}

/// Name of one claim for a replica
pub fn claim_name(cluster_name: &str, template_name: &str, suffix: &str) -> String {
    format!("{}-{}-{}", cluster_name, template_name, suffix)
}

/// Materialize one new replica: its pod and its claims.
///
/// Claims are owned by the cluster, not the pod: storage outlives the
/// replica that first mounted it.
pub fn materialize(cluster: &StatefulCluster, suffix: &str) -> (Pod, Vec<PersistentVolumeClaim>) {
    let cluster_name = cluster.name_any();
    let namespace = cluster.namespace();
    let labels = replica_labels(cluster);

    let mut volumes = Vec::with_capacity(cluster.spec.volume_claim_templates.len());
    let mut claims = Vec::with_capacity(cluster.spec.volume_claim_templates.len());

    for template in &cluster.spec.volume_claim_templates {
        let claim_name = claim_name(&cluster_name, &template.name, suffix);

        claims.push(PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(claim_name.clone()),
                namespace: namespace.clone(),
                labels: Some(labels.clone()),
                owner_references: Some(vec![owner_reference(cluster)]),
                ..Default::default()
            },
            spec: Some(template.spec.clone()),
            ..Default::default()
        });

        // The volume keeps the template name so volumeMounts in the pod
        // template resolve unchanged
        volumes.push(Volume {
            name: template.name.clone(),
            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                claim_name,
                read_only: Some(false),
            }),
            ..Default::default()
        });
    }

    let mut pod_spec = cluster.spec.template.spec.clone().unwrap_or_default();
    pod_spec.volumes = if volumes.is_empty() {
        None
    } else {
        Some(volumes)
    };

    let pod = Pod {
        metadata: ObjectMeta {
            name: Some(replica_name(&cluster_name, suffix)),
            namespace,
            labels: Some(labels),
            owner_references: Some(vec![owner_reference(cluster)]),
            ..Default::default()
        },
        spec: Some(pod_spec),
        ..Default::default()
    };

    (pod, claims)
}
