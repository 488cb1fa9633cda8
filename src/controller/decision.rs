//! Reconciliation decision engine.
//!
//! `decide` is a pure function from one observed snapshot to at most one
//! corrective action. The loop is level-triggered: every pass re-reads the
//! world, picks a single action, and relies on being re-invoked on the change
//! that action produces. Replaying `decide` on an unchanged snapshot yields
//! the same action.

use std::cmp::Ordering;
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Fixed delay before re-checking a cluster with a Pending replica
pub const PENDING_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Lifecycle phase of an observed replica pod
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicaPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl ReplicaPhase {
    fn parse(phase: &str) -> Self {
        match phase {
            "Pending" => ReplicaPhase::Pending,
            "Running" => ReplicaPhase::Running,
            "Succeeded" => ReplicaPhase::Succeeded,
            "Failed" => ReplicaPhase::Failed,
            _ => ReplicaPhase::Unknown,
        }
    }
}

/// One live replica as seen in the snapshot
#[derive(Clone, Debug)]
pub struct ObservedReplica {
    pub name: String,
    pub phase: ReplicaPhase,
    /// Ready condition; `None` when the condition is absent or Unknown
    pub ready: Option<bool>,
    pub created_at: Option<Time>,
}

impl ObservedReplica {
    /// Extract the decision-relevant view of a pod.
    ///
    /// Returns `None` for a pod without a name, which the store cannot
    /// produce but the types allow.
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let name = pod.metadata.name.clone()?;
        let phase = pod
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map(ReplicaPhase::parse)
            .unwrap_or(ReplicaPhase::Unknown);
        let ready = pod
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
            .and_then(|c| match c.status.as_str() {
                "True" => Some(true),
                "False" => Some(false),
                _ => None,
            });
        Some(Self {
            name,
            phase,
            ready,
            created_at: pod.metadata.creation_timestamp.clone(),
        })
    }
}

/// Creation order of two replicas: timestamp first, name as tiebreak
pub fn creation_order(a: &ObservedReplica, b: &ObservedReplica) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.name.cmp(&b.name))
}

/// The single corrective action for one reconciliation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplicaAction {
    /// Converged; nothing to do
    None,
    /// Materialize and persist one new replica with its claims
    CreateReplica,
    /// Delete exactly this replica pod, preserving its claims
    DeleteReplica { name: String },
    /// A replica is still scheduling; check again after the delay
    WaitForPending { delay: Duration },
}

/// Choose the next corrective action. First matching rule wins.
///
/// 1. Over-provisioned: delete the most recently created replica. Keeping
///    the oldest replicas bounds churn to one excess per pass and favors
///    retaining whatever state they have accumulated.
/// 2. Pending replica: wait. Creation is asynchronous; acting again before
///    a just-created pod schedules risks runaway duplicate creation.
/// 3. Unhealthy replica (Ready explicitly False): delete it. The next
///    pass's under-provisioned rule recreates it with fresh claims.
/// 4. Under-provisioned: create one replica.
pub fn decide(desired: i32, observed: &[ObservedReplica]) -> ReplicaAction {
    let desired = desired.max(0);
    let count = observed.len() as i32;

    if count > desired {
        if let Some(newest) = observed.iter().max_by(|a, b| creation_order(a, b)) {
            return ReplicaAction::DeleteReplica {
                name: newest.name.clone(),
            };
        }
    }

    if observed.iter().any(|r| r.phase == ReplicaPhase::Pending) {
        return ReplicaAction::WaitForPending {
            delay: PENDING_RETRY_DELAY,
        };
    }

    if let Some(unhealthy) = observed.iter().find(|r| r.ready == Some(false)) {
        return ReplicaAction::DeleteReplica {
            name: unhealthy.name.clone(),
        };
    }

    if count < desired {
        return ReplicaAction::CreateReplica;
    }

    ReplicaAction::None
}
