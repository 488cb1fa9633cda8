use k8s_openapi::api::core::v1::{PersistentVolumeClaimSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// StatefulCluster is the Schema for the statefulclusters API
///
/// A StatefulCluster describes a set of directly-managed replica pods, each
/// with its own set of persistent volume claims stamped out from the claim
/// templates. The controller converges the live pod set toward
/// `spec.replicas`, one corrective action per reconciliation pass.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "enge.dev",
    version = "v1alpha1",
    kind = "StatefulCluster",
    plural = "statefulclusters",
    shortname = "sc",
    namespaced,
    status = "StatefulClusterStatus",
    printcolumn = r#"{"name":"Desired", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".status.replicas"}"#,
    printcolumn = r#"{"name":"Ready", "type":"integer", "jsonPath":".status.readyReplicas"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct StatefulClusterSpec {
    /// Desired number of replica pods (defaults to 1 when unset)
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Label selector identifying the pods that belong to this cluster.
    /// Every pod and claim the controller creates carries these labels.
    #[schemars(schema_with = "opaque_object_schema")]
    pub selector: LabelSelector,

    /// Pod template used as the runtime spec of each replica. The volume
    /// list is rewritten at creation time to reference the replica's claims.
    #[schemars(schema_with = "opaque_object_schema")]
    pub template: PodTemplateSpec,

    /// Claim templates, one claim per template per replica
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<ClaimTemplate>,
}

fn default_replicas() -> i32 {
    1
}

/// A named blueprint for one persistent volume claim per replica
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTemplate {
    /// Template name, used both in the claim name and as the pod volume name
    pub name: String,

    /// Claim spec copied verbatim into each generated claim
    #[schemars(schema_with = "opaque_object_schema")]
    pub spec: PersistentVolumeClaimSpec,
}

/// Schema for embedded Kubernetes types: an opaque object that preserves
/// unknown fields, since the API server already validates the real schema.
fn opaque_object_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
    let mut schema = schemars::schema::SchemaObject {
        instance_type: Some(schemars::schema::InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_owned(),
        serde_json::Value::Bool(true),
    );
    schemars::schema::Schema::Object(schema)
}

/// Status of the StatefulCluster
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatefulClusterStatus {
    /// Current phase of the cluster lifecycle
    #[serde(default)]
    pub phase: ClusterPhase,

    /// Number of replica pods currently observed
    #[serde(default)]
    pub replicas: i32,

    /// Number of observed replicas reporting Ready
    #[serde(default)]
    pub ready_replicas: i32,

    /// Observed generation of the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Kubernetes-style conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Cluster lifecycle phase
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
pub enum ClusterPhase {
    /// Cluster has not been reconciled yet
    #[default]
    Pending,
    /// Observed replicas differ from the desired count
    Converging,
    /// Observed replicas match the desired count and all are ready
    Running,
    /// At least one observed replica is not ready
    Degraded,
    /// Spec rejected by validation; manual intervention required
    Failed,
}

impl std::fmt::Display for ClusterPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterPhase::Pending => write!(f, "Pending"),
            ClusterPhase::Converging => write!(f, "Converging"),
            ClusterPhase::Running => write!(f, "Running"),
            ClusterPhase::Degraded => write!(f, "Degraded"),
            ClusterPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Kubernetes-style condition
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition: True, False, or Unknown
    pub status: String,

    /// Reason for the condition's last transition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Last time the condition transitioned
    pub last_transition_time: String,

    /// Generation observed when condition was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
