//! Reconciliation loop for StatefulCluster resources
//!
//! One pass: re-read the snapshot, decide exactly one corrective action,
//! execute it, publish status. Further progress is driven by the watch
//! re-triggering on the change the action produced.

use std::sync::Arc;
use std::time::Instant;

use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::{debug, error, instrument, warn};

use crate::controller::context::Context;
use crate::controller::decision::{self, ReplicaAction};
use crate::controller::error::{BackoffConfig, Error, Result};
use crate::controller::executor;
use crate::controller::snapshot;
use crate::controller::status::StatusManager;
use crate::controller::validation;
use crate::crd::StatefulCluster;

/// Main reconciliation function
#[instrument(skip(cluster, ctx), fields(name = %cluster.name_any(), namespace = cluster.namespace().unwrap_or_default()))]
pub async fn reconcile(cluster: Arc<StatefulCluster>, ctx: Arc<Context>) -> Result<Action> {
    let start = Instant::now();
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    debug!("Reconciling StatefulCluster");

    // A cluster with a deletion timestamp is left alone; cascade deletion
    // through owner references cleans up the replicas and claims
    if cluster.metadata.deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    // The triggering object may be stale; re-read the world before acting
    let Some(snap) = snapshot::read(&ctx.client, &name, &ns).await? else {
        debug!("StatefulCluster no longer exists, nothing to do");
        return Ok(Action::await_change());
    };
    let cluster = &snap.cluster;

    let status = StatusManager::new(cluster, &ctx, &ns);

    if let Err(e) = validation::validate_spec(cluster) {
        error!(error = %e, "Spec validation failed");
        let _ = status.set_failed("InvalidSpec", &e.to_string()).await;
        return Err(e);
    }

    let desired = cluster.spec.replicas;
    let observed = snap.replicas.len() as i32;
    let ready = snap
        .replicas
        .iter()
        .filter(|r| r.ready == Some(true))
        .count() as i32;

    let action = decision::decide(desired, &snap.replicas);
    debug!(desired, observed, ready, action = ?action, "Decided corrective action");

    let requeue = executor::execute(&action, cluster, &ctx, &ns).await?;

    // One status write per pass; replica objects are never mutated in place
    match &action {
        ReplicaAction::None => status.set_running(observed, ready).await?,
        ReplicaAction::CreateReplica => {
            let message = format!("Creating replica {}/{}", observed + 1, desired);
            status.set_converging(observed, ready, &message).await?;
        }
        ReplicaAction::DeleteReplica { name: pod } if observed > desired => {
            let message = format!("Deleting excess replica {}", pod);
            status.set_converging(observed, ready, &message).await?;
        }
        ReplicaAction::DeleteReplica { name: pod } => {
            let message = format!("Replacing unhealthy replica {}", pod);
            status.set_degraded(observed, ready, &message).await?;
        }
        ReplicaAction::WaitForPending { .. } => {
            status
                .set_converging(observed, ready, "Waiting for a pending replica to schedule")
                .await?;
        }
    }

    if let Some(ref health_state) = ctx.health_state {
        let duration = start.elapsed().as_secs_f64();
        health_state.metrics.record_reconcile(&ns, &name, duration);
        health_state.metrics.record_decision(action_label(&action));
        health_state.metrics.set_cluster_replicas(
            &ns,
            &name,
            i64::from(desired),
            i64::from(observed),
        );
    }

    Ok(requeue)
}

/// Stable label for the decision metric
fn action_label(action: &ReplicaAction) -> &'static str {
    match action {
        ReplicaAction::None => "none",
        ReplicaAction::CreateReplica => "create",
        ReplicaAction::DeleteReplica { .. } => "delete",
        ReplicaAction::WaitForPending { .. } => "wait",
    }
}

/// Error policy for the controller with exponential backoff
pub fn error_policy(cluster: Arc<StatefulCluster>, error: &Error, ctx: Arc<Context>) -> Action {
    let name = cluster.name_any();
    let ns = cluster.namespace().unwrap_or_default();

    if let Some(ref health_state) = ctx.health_state {
        health_state.metrics.record_error(&ns, &name);
    }

    if error.is_not_found() {
        debug!(name = %name, "Resource not found (likely deleted)");
        return Action::await_change();
    }

    let backoff = BackoffConfig::default();
    let delay = backoff.delay_for_error(error, 0);

    if error.is_retryable() {
        warn!(name = %name, error = %error, "Retryable error, requeuing in {:?}", delay);
    } else {
        error!(name = %name, error = %error, "Non-retryable error, parking for {:?}", delay);
    }

    Action::requeue(delay)
}
