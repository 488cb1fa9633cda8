//! Common utilities for Kubernetes resource generation
//!
//! Shared labels and owner references used by everything the controller
//! creates on behalf of a StatefulCluster.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;

use crate::crd::StatefulCluster;

/// API version for the StatefulCluster CRD
pub const API_VERSION: &str = "enge.dev/v1alpha1";

/// Kind for the StatefulCluster CRD
pub const KIND: &str = "StatefulCluster";

/// Operator field manager name for server-side apply
pub const FIELD_MANAGER: &str = "statefulcluster-operator";

/// Generate an owner reference for a StatefulCluster.
///
/// Pods and claims are both owned by the cluster, never by each other, so
/// deleting a pod leaves its claims behind and deleting the cluster garbage
/// collects everything.
pub fn owner_reference(cluster: &StatefulCluster) -> OwnerReference {
    OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: KIND.to_string(),
        name: cluster.name_any(),
        uid: cluster.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Generate standard operator labels for resources belonging to a cluster
pub fn standard_labels(cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "app.kubernetes.io/name".to_string(),
            cluster_name.to_string(),
        ),
        (
            "app.kubernetes.io/managed-by".to_string(),
            FIELD_MANAGER.to_string(),
        ),
        ("enge.dev/cluster".to_string(), cluster_name.to_string()),
    ])
}

/// Labels for replica pods and claims.
///
/// The spec's selector labels are merged over the standard labels and win on
/// conflict: the selector is the membership contract, the snapshot reader
/// lists by exactly these pairs.
pub fn replica_labels(cluster: &StatefulCluster) -> BTreeMap<String, String> {
    let mut labels = standard_labels(&cluster.name_any());
    if let Some(match_labels) = &cluster.spec.selector.match_labels {
        for (key, value) in match_labels {
            labels.insert(key.clone(), value.clone());
        }
    }
    labels
}
