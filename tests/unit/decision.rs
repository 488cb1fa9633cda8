//! Unit tests for the reconciliation decision engine
//!
//! The engine is a pure function from (desired count, observed replicas) to
//! one corrective action, so these tests mock the store as a plain vector.

use chrono::{TimeZone, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use statefulcluster_operator::controller::decision::{
    decide, ObservedReplica, ReplicaAction, ReplicaPhase, PENDING_RETRY_DELAY,
};

fn ts(secs: i64) -> Time {
    Time(Utc.timestamp_opt(secs, 0).unwrap())
}

fn replica(name: &str, phase: ReplicaPhase, ready: Option<bool>, created: i64) -> ObservedReplica {
    ObservedReplica {
        name: name.to_string(),
        phase,
        ready,
        created_at: Some(ts(created)),
    }
}

fn healthy(name: &str, created: i64) -> ObservedReplica {
    replica(name, ReplicaPhase::Running, Some(true), created)
}

#[test]
fn test_converged_returns_none() {
    let observed = vec![healthy("db-a", 1), healthy("db-b", 2)];
    assert_eq!(decide(2, &observed), ReplicaAction::None);
}

#[test]
fn test_none_is_idempotent() {
    let observed = vec![healthy("db-a", 1)];
    assert_eq!(decide(1, &observed), ReplicaAction::None);
    assert_eq!(decide(1, &observed), ReplicaAction::None);
}

#[test]
fn test_under_provisioned_creates() {
    assert_eq!(decide(1, &[]), ReplicaAction::CreateReplica);

    let observed = vec![healthy("db-a", 1)];
    assert_eq!(decide(3, &observed), ReplicaAction::CreateReplica);
}

#[test]
fn test_over_provision_deletes_newest() {
    let observed = vec![healthy("db-a", 1), healthy("db-b", 2), healthy("db-c", 3)];
    assert_eq!(
        decide(2, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-c".to_string()
        }
    );
}

#[test]
fn test_over_provision_newest_by_name_on_timestamp_tie() {
    let observed = vec![healthy("db-a", 1), healthy("db-b", 1)];
    assert_eq!(
        decide(1, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-b".to_string()
        }
    );
}

#[test]
fn test_missing_timestamp_sorts_oldest() {
    let mut no_ts = healthy("db-a", 0);
    no_ts.created_at = None;
    let observed = vec![no_ts, healthy("db-b", 1)];
    assert_eq!(
        decide(1, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-b".to_string()
        }
    );
}

#[test]
fn test_over_provision_wins_over_pending() {
    // Rule order is the crux: an excess replica is removed even while
    // another replica is still scheduling
    let observed = vec![
        healthy("db-a", 1),
        replica("db-b", ReplicaPhase::Pending, None, 2),
    ];
    assert_eq!(
        decide(1, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-b".to_string()
        }
    );
}

#[test]
fn test_pending_waits_with_positive_delay() {
    let observed = vec![
        healthy("db-a", 1),
        replica("db-b", ReplicaPhase::Pending, None, 2),
    ];
    let action = decide(3, &observed);
    assert_eq!(
        action,
        ReplicaAction::WaitForPending {
            delay: PENDING_RETRY_DELAY
        }
    );
    match action {
        ReplicaAction::WaitForPending { delay } => assert!(!delay.is_zero()),
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn test_pending_wins_over_unhealthy() {
    let observed = vec![
        replica("db-a", ReplicaPhase::Running, Some(false), 1),
        replica("db-b", ReplicaPhase::Pending, None, 2),
    ];
    assert_eq!(
        decide(2, &observed),
        ReplicaAction::WaitForPending {
            delay: PENDING_RETRY_DELAY
        }
    );
}

#[test]
fn test_unhealthy_replica_deleted_then_recreated() {
    let observed = vec![replica("db-a", ReplicaPhase::Running, Some(false), 1)];
    assert_eq!(
        decide(1, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-a".to_string()
        }
    );

    // The next pass sees the deletion and refills
    assert_eq!(decide(1, &[]), ReplicaAction::CreateReplica);
}

#[test]
fn test_unhealthy_targets_the_specific_replica() {
    let observed = vec![
        healthy("db-a", 1),
        replica("db-b", ReplicaPhase::Running, Some(false), 2),
        healthy("db-c", 3),
    ];
    assert_eq!(
        decide(3, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-b".to_string()
        }
    );
}

#[test]
fn test_unknown_ready_is_not_unhealthy() {
    // An absent Ready condition is not evidence of failure
    let observed = vec![replica("db-a", ReplicaPhase::Running, None, 1)];
    assert_eq!(decide(1, &observed), ReplicaAction::None);
}

#[test]
fn test_scale_to_zero() {
    let observed = vec![healthy("db-a", 1), healthy("db-b", 2)];
    assert_eq!(
        decide(0, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-b".to_string()
        }
    );
    assert_eq!(decide(0, &[]), ReplicaAction::None);
}

#[test]
fn test_negative_desired_treated_as_zero() {
    assert_eq!(decide(-3, &[]), ReplicaAction::None);
    let observed = vec![healthy("db-a", 1)];
    assert_eq!(
        decide(-3, &observed),
        ReplicaAction::DeleteReplica {
            name: "db-a".to_string()
        }
    );
}

/// Convergence: from an empty store, repeated decide+apply reaches exactly
/// `desired` healthy replicas in `desired` creating passes, never producing
/// more than one mutating action per pass.
#[test]
fn test_convergence_from_empty_store() {
    for desired in 0..=5 {
        let mut store: Vec<ObservedReplica> = Vec::new();
        let mut creates = 0;
        let mut passes = 0;

        loop {
            passes += 1;
            assert!(passes <= 20, "desired={} did not converge", desired);

            match decide(desired, &store) {
                ReplicaAction::None => break,
                ReplicaAction::CreateReplica => {
                    creates += 1;
                    let n = store.len() as i64;
                    store.push(healthy(&format!("db-{:08}", n), n));
                }
                other => panic!("unexpected action while scaling up: {:?}", other),
            }
        }

        assert_eq!(store.len() as i32, desired);
        assert_eq!(creates, desired);
    }
}
