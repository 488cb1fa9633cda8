//! Action executor.
//!
//! Applies the one action chosen by the decision engine against the store.
//! Any store failure aborts the pass immediately; every intermediate state
//! this can leave behind (claims without a pod, a deleted pod awaiting
//! recreation) is a valid input to the next pass.

use std::time::Duration;

use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::api::{DeleteParams, PostParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use tracing::{debug, info};

use crate::controller::context::Context;
use crate::controller::decision::ReplicaAction;
use crate::controller::error::Result;
use crate::crd::StatefulCluster;
use crate::resources::replica;

/// Pause after a successful create so the next pass observes the new pod
/// instead of racing the store
pub const CREATE_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Execute one action and return the requeue directive for the pass
pub async fn execute(
    action: &ReplicaAction,
    cluster: &StatefulCluster,
    ctx: &Context,
    namespace: &str,
) -> Result<Action> {
    let name = cluster.name_any();

    match action {
        ReplicaAction::CreateReplica => {
            let suffix = ctx.suffixes.next();
            let (pod, claims) = replica::materialize(cluster, &suffix);

            // Claims are persisted before the pod: a claim set without a pod
            // self-heals via the under-provisioned rule, a pod referencing
            // absent claims would not schedule
            let claims_api: Api<PersistentVolumeClaim> =
                Api::namespaced(ctx.client.clone(), namespace);
            for claim in &claims {
                info!(name = %name, claim = %claim.name_any(), "Creating claim");
                claims_api.create(&PostParams::default(), claim).await?;
            }

            let pods_api: Api<Pod> = Api::namespaced(ctx.client.clone(), namespace);
            info!(name = %name, pod = %pod.name_any(), "Creating replica pod");
            pods_api.create(&PostParams::default(), &pod).await?;

            tokio::time::sleep(CREATE_SETTLE_DELAY).await;
            Ok(Action::await_change())
        }
        ReplicaAction::DeleteReplica { name: pod_name } => {
            // The pod's claims are deliberately left in place: they are
            // owned by the cluster and reclaimed only on cluster deletion
            let pods_api: Api<Pod> = Api::namespaced(ctx.client.clone(), namespace);
            match pods_api.delete(pod_name, &DeleteParams::default()).await {
                Ok(_) => {
                    info!(name = %name, pod = %pod_name, "Deleted replica pod");
                }
                Err(kube::Error::Api(e)) if e.code == 404 => {
                    debug!(name = %name, pod = %pod_name, "Replica pod already gone");
                }
                Err(e) => return Err(e.into()),
            }
            Ok(Action::await_change())
        }
        ReplicaAction::WaitForPending { delay } => Ok(Action::requeue(*delay)),
        ReplicaAction::None => Ok(Action::await_change()),
    }
}
