//! State snapshot reader.
//!
//! Every reconciliation pass re-reads the full state from the store: the
//! cluster resource by name, then the pods that belong to it by label
//! selector. There is no cross-pass cache; the store is the single source of
//! truth and read-before-act bounds staleness to one pass.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client};

use crate::controller::decision::{creation_order, ObservedReplica};
use crate::controller::error::{Error, Result};
use crate::crd::StatefulCluster;

/// The desired spec plus the observed replica set for one cluster
pub struct Snapshot {
    pub cluster: StatefulCluster,
    /// Observed replicas, ordered by creation time
    pub replicas: Vec<ObservedReplica>,
}

/// Read the snapshot for one cluster identity.
///
/// Returns `Ok(None)` when the cluster resource no longer exists; that is
/// not an error, the pass simply stops and cascade deletion cleans up the
/// owned objects.
pub async fn read(client: &Client, name: &str, namespace: &str) -> Result<Option<Snapshot>> {
    let clusters: Api<StatefulCluster> = Api::namespaced(client.clone(), namespace);
    let Some(cluster) = clusters.get_opt(name).await? else {
        return Ok(None);
    };

    let match_labels = cluster
        .spec
        .selector
        .match_labels
        .clone()
        .unwrap_or_default();
    if match_labels.is_empty() {
        // An empty selector would claim every pod in the namespace
        return Err(Error::MissingObjectKey("spec.selector.matchLabels"));
    }

    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let list = pods
        .list(&ListParams::default().labels(&selector_string(&match_labels)))
        .await?;

    // Never trust the query alone: re-check the labels on every returned
    // item so a misbehaving store cannot make us act on foreign pods
    let mut replicas: Vec<ObservedReplica> = list
        .items
        .iter()
        .filter(|pod| labels_match(&match_labels, pod.metadata.labels.as_ref()))
        .filter_map(ObservedReplica::from_pod)
        .collect();
    replicas.sort_by(creation_order);

    Ok(Some(Snapshot { cluster, replicas }))
}

/// Render match labels as a list query selector (`k=v,k2=v2`)
pub fn selector_string(match_labels: &BTreeMap<String, String>) -> String {
    match_labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// True when every selector pair is present on the object's labels
pub fn labels_match(
    selector: &BTreeMap<String, String>,
    labels: Option<&BTreeMap<String, String>>,
) -> bool {
    let Some(labels) = labels else {
        return false;
    };
    selector
        .iter()
        .all(|(k, v)| labels.get(k).is_some_and(|value| value == v))
}
