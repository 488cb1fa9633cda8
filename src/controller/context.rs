use std::sync::Arc;

use kube::Client;

use crate::health::HealthState;
use crate::resources::naming::{RandomSuffixes, SuffixSource};

/// Shared context for the controller.
///
/// Holds only process-wide capabilities; all per-cluster state is re-read
/// from the store on every pass.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Optional health state for metrics and readiness
    pub health_state: Option<Arc<HealthState>>,
    /// Suffix source for replica identity
    pub suffixes: Arc<dyn SuffixSource>,
}

impl Context {
    pub fn new(client: Client, health_state: Option<Arc<HealthState>>) -> Self {
        Self {
            client,
            health_state,
            suffixes: Arc::new(RandomSuffixes),
        }
    }

    /// Replace the suffix source, used by tests to make naming deterministic
    pub fn with_suffix_source(mut self, suffixes: Arc<dyn SuffixSource>) -> Self {
        self.suffixes = suffixes;
        self
    }
}
