// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for the reconciliation decision engine
//!
//! These tests use proptest to generate random observed replica sets and
//! verify that:
//! 1. The decision is deterministic (same snapshot = same action)
//! 2. Every action is consistent with the snapshot that produced it
//! 3. Repeated decide+apply against a mocked store always converges

use chrono::{TimeZone, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use proptest::prelude::*;

use statefulcluster_operator::controller::decision::{
    decide, ObservedReplica, ReplicaAction, ReplicaPhase,
};

fn ts(secs: i64) -> Time {
    Time(Utc.timestamp_opt(secs, 0).unwrap())
}

fn phase_strategy() -> impl Strategy<Value = ReplicaPhase> {
    prop_oneof![
        Just(ReplicaPhase::Pending),
        Just(ReplicaPhase::Running),
        Just(ReplicaPhase::Succeeded),
        Just(ReplicaPhase::Failed),
        Just(ReplicaPhase::Unknown),
    ]
}

fn replica_set_strategy() -> impl Strategy<Value = Vec<ObservedReplica>> {
    proptest::collection::vec(
        (phase_strategy(), proptest::option::of(any::<bool>()), 0i64..1_000),
        0..8,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (phase, ready, created))| ObservedReplica {
                name: format!("db-{:04}", i),
                phase,
                ready,
                created_at: Some(ts(created)),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn decide_is_deterministic(desired in 0i32..10, observed in replica_set_strategy()) {
        prop_assert_eq!(decide(desired, &observed), decide(desired, &observed));
    }

    #[test]
    fn action_is_consistent_with_snapshot(desired in 0i32..10, observed in replica_set_strategy()) {
        let count = observed.len() as i32;
        let any_pending = observed.iter().any(|r| r.phase == ReplicaPhase::Pending);
        let any_unhealthy = observed.iter().any(|r| r.ready == Some(false));

        match decide(desired, &observed) {
            ReplicaAction::CreateReplica => {
                prop_assert!(count < desired);
                prop_assert!(!any_pending);
                prop_assert!(!any_unhealthy);
            }
            ReplicaAction::DeleteReplica { name } => {
                prop_assert!(observed.iter().any(|r| r.name == name));
                prop_assert!(count > desired || any_unhealthy);
            }
            ReplicaAction::WaitForPending { delay } => {
                prop_assert!(any_pending);
                prop_assert!(count <= desired);
                prop_assert!(delay > std::time::Duration::ZERO);
            }
            ReplicaAction::None => {
                prop_assert_eq!(count, desired);
                prop_assert!(!any_pending);
                prop_assert!(!any_unhealthy);
            }
        }
    }

    /// Mock the store: creates land as healthy pods, deletes remove exactly
    /// the target, a wait pass lets pending pods schedule. From any starting
    /// set the loop must reach the desired count with no unhealthy replica,
    /// one mutation per pass, within a linear bound.
    #[test]
    fn convergence_within_linear_bound(desired in 0i32..6, observed in replica_set_strategy()) {
        let mut store = observed;
        let mut next_id = 0u32;
        let bound = store.len() + desired as usize + 4;
        let mut converged = false;

        for _pass in 0..bound {
            match decide(desired, &store) {
                ReplicaAction::None => {
                    converged = true;
                    break;
                }
                ReplicaAction::CreateReplica => {
                    store.push(ObservedReplica {
                        name: format!("db-new-{:04}", next_id),
                        phase: ReplicaPhase::Running,
                        ready: Some(true),
                        created_at: Some(ts(1_000 + i64::from(next_id))),
                    });
                    next_id += 1;
                }
                ReplicaAction::DeleteReplica { name } => {
                    let before = store.len();
                    store.retain(|r| r.name != name);
                    prop_assert_eq!(store.len(), before - 1);
                }
                ReplicaAction::WaitForPending { .. } => {
                    for replica in &mut store {
                        if replica.phase == ReplicaPhase::Pending {
                            replica.phase = ReplicaPhase::Running;
                            replica.ready = Some(true);
                        }
                    }
                }
            }
        }

        prop_assert!(converged, "did not converge within {} passes", bound);
        prop_assert_eq!(store.len() as i32, desired);
        prop_assert!(store.iter().all(|r| r.ready != Some(false)));
    }
}
