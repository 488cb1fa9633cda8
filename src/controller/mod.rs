pub mod context;
pub mod decision;
pub mod error;
pub mod executor;
pub mod reconciler;
pub mod snapshot;
pub mod status;
pub mod validation;

pub use context::Context;
pub use decision::{decide, ObservedReplica, ReplicaAction, ReplicaPhase, PENDING_RETRY_DELAY};
pub use error::{BackoffConfig, Error, Result};
pub use executor::CREATE_SETTLE_DELAY;
pub use reconciler::{error_policy, reconcile};
pub use snapshot::Snapshot;
pub use status::{ConditionBuilder, StatusManager};
pub use validation::{validate_spec, MAX_REPLICAS, MIN_REPLICAS};
