//! Status and conditions management for StatefulCluster resources
//!
//! The status subresource is the only mutation ever applied to the cluster
//! object; replica pods and claims are exclusively created or deleted.

use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, ResourceExt};

use crate::controller::context::Context;
use crate::controller::error::Result;
use crate::crd::{ClusterPhase, Condition, StatefulCluster, StatefulClusterStatus};
use crate::resources::common::FIELD_MANAGER;

/// Standard condition types following Kubernetes conventions
pub mod condition_types {
    /// Observed replicas match the desired count and all are ready
    pub const READY: &str = "Ready";
    /// The controller is converging toward the desired count
    pub const PROGRESSING: &str = "Progressing";
    /// An observed replica is not ready
    pub const DEGRADED: &str = "Degraded";
}

/// Condition status values
pub mod condition_status {
    pub const TRUE: &str = "True";
    pub const FALSE: &str = "False";
    pub const UNKNOWN: &str = "Unknown";
}

/// Builder for creating and updating status conditions
pub struct ConditionBuilder {
    conditions: Vec<Condition>,
    generation: Option<i64>,
}

impl ConditionBuilder {
    /// Create a new condition builder
    pub fn new(generation: Option<i64>) -> Self {
        Self {
            conditions: Vec::new(),
            generation,
        }
    }

    /// Create from existing conditions
    pub fn from_existing(existing: Vec<Condition>, generation: Option<i64>) -> Self {
        Self {
            conditions: existing,
            generation,
        }
    }

    /// Set a condition, updating if it exists or adding if it doesn't
    pub fn set_condition(mut self, type_: &str, status: &str, reason: &str, message: &str) -> Self {
        let now = Utc::now().to_rfc3339();

        if let Some(existing) = self.conditions.iter_mut().find(|c| c.type_ == type_) {
            // The transition time only moves when the status actually flips
            if existing.status != status {
                existing.status = status.to_string();
                existing.last_transition_time = now;
            }
            existing.reason = reason.to_string();
            existing.message = message.to_string();
            existing.observed_generation = self.generation;
        } else {
            self.conditions.push(Condition {
                type_: type_.to_string(),
                status: status.to_string(),
                reason: reason.to_string(),
                message: message.to_string(),
                last_transition_time: now,
                observed_generation: self.generation,
            });
        }
        self
    }

    /// Set the Ready condition
    pub fn ready(self, is_ready: bool, reason: &str, message: &str) -> Self {
        let status = if is_ready {
            condition_status::TRUE
        } else {
            condition_status::FALSE
        };
        self.set_condition(condition_types::READY, status, reason, message)
    }

    /// Set the Progressing condition
    pub fn progressing(self, is_progressing: bool, reason: &str, message: &str) -> Self {
        let status = if is_progressing {
            condition_status::TRUE
        } else {
            condition_status::FALSE
        };
        self.set_condition(condition_types::PROGRESSING, status, reason, message)
    }

    /// Set the Degraded condition
    pub fn degraded(self, is_degraded: bool, reason: &str, message: &str) -> Self {
        let status = if is_degraded {
            condition_status::TRUE
        } else {
            condition_status::FALSE
        };
        self.set_condition(condition_types::DEGRADED, status, reason, message)
    }

    /// Build the conditions list
    pub fn build(self) -> Vec<Condition> {
        self.conditions
    }
}

/// Status manager for StatefulCluster resources
pub struct StatusManager<'a> {
    cluster: &'a StatefulCluster,
    ctx: &'a Context,
    ns: &'a str,
}

impl<'a> StatusManager<'a> {
    /// Create a new status manager
    pub fn new(cluster: &'a StatefulCluster, ctx: &'a Context, ns: &'a str) -> Self {
        Self { cluster, ctx, ns }
    }

    /// Patch the status subresource with a full status object
    pub async fn update(&self, status: StatefulClusterStatus) -> Result<()> {
        let api: Api<StatefulCluster> = Api::namespaced(self.ctx.client.clone(), self.ns);
        let name = self.cluster.name_any();

        let patch = serde_json::json!({
            "status": status
        });

        api.patch_status(
            &name,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&patch),
        )
        .await?;

        Ok(())
    }

    fn builder(&self) -> ConditionBuilder {
        let existing = self
            .cluster
            .status
            .as_ref()
            .map(|s| s.conditions.clone())
            .unwrap_or_default();
        ConditionBuilder::from_existing(existing, self.cluster.metadata.generation)
    }

    /// Status for a converged cluster
    pub async fn set_running(&self, replicas: i32, ready_replicas: i32) -> Result<()> {
        let conditions = self
            .builder()
            .ready(true, "Converged", "Observed replicas match the desired count")
            .progressing(false, "Converged", "No corrective action required")
            .degraded(false, "AllReplicasReady", "All observed replicas are ready")
            .build();

        self.update(StatefulClusterStatus {
            phase: ClusterPhase::Running,
            replicas,
            ready_replicas,
            observed_generation: self.cluster.metadata.generation,
            conditions,
        })
        .await
    }

    /// Status for a cluster the controller is still driving toward its
    /// desired count
    pub async fn set_converging(
        &self,
        replicas: i32,
        ready_replicas: i32,
        message: &str,
    ) -> Result<()> {
        let conditions = self
            .builder()
            .ready(false, "Converging", message)
            .progressing(true, "Reconciling", message)
            .build();

        self.update(StatefulClusterStatus {
            phase: ClusterPhase::Converging,
            replicas,
            ready_replicas,
            observed_generation: self.cluster.metadata.generation,
            conditions,
        })
        .await
    }

    /// Status for a cluster with an unhealthy replica being replaced
    pub async fn set_degraded(
        &self,
        replicas: i32,
        ready_replicas: i32,
        message: &str,
    ) -> Result<()> {
        let conditions = self
            .builder()
            .ready(false, "UnhealthyReplica", message)
            .degraded(true, "UnhealthyReplica", message)
            .build();

        self.update(StatefulClusterStatus {
            phase: ClusterPhase::Degraded,
            replicas,
            ready_replicas,
            observed_generation: self.cluster.metadata.generation,
            conditions,
        })
        .await
    }

    /// Status for a cluster whose spec was rejected by validation
    pub async fn set_failed(&self, reason: &str, message: &str) -> Result<()> {
        let existing = self.cluster.status.clone().unwrap_or_default();
        let conditions = self.builder().ready(false, reason, message).build();

        self.update(StatefulClusterStatus {
            phase: ClusterPhase::Failed,
            replicas: existing.replicas,
            ready_replicas: existing.ready_replicas,
            observed_generation: self.cluster.metadata.generation,
            conditions,
        })
        .await
    }
}
