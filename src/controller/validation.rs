//! Validation logic for StatefulCluster specs
//!
//! A spec that fails validation would produce malformed blueprints, so it is
//! rejected before any action is taken and never retried blindly.

use std::collections::BTreeSet;

use crate::controller::error::{Error, Result};
use crate::crd::StatefulCluster;

/// Minimum number of replicas; zero is a valid desired state
pub const MIN_REPLICAS: i32 = 0;

/// Maximum number of replicas (arbitrary limit for safety)
pub const MAX_REPLICAS: i32 = 100;

/// Validate the cluster spec
pub fn validate_spec(cluster: &StatefulCluster) -> Result<()> {
    validate_replicas(cluster)?;
    validate_selector(cluster)?;
    validate_claim_templates(cluster)?;
    Ok(())
}

/// Validate replica count
fn validate_replicas(cluster: &StatefulCluster) -> Result<()> {
    let replicas = cluster.spec.replicas;

    if replicas < MIN_REPLICAS {
        return Err(Error::ValidationError(format!(
            "replica count {} is below minimum {}",
            replicas, MIN_REPLICAS
        )));
    }

    if replicas > MAX_REPLICAS {
        return Err(Error::ValidationError(format!(
            "replica count {} exceeds maximum {}",
            replicas, MAX_REPLICAS
        )));
    }

    Ok(())
}

/// Validate the label selector.
///
/// An empty selector would match every pod in the namespace, so membership
/// must be pinned down by at least one label pair.
fn validate_selector(cluster: &StatefulCluster) -> Result<()> {
    let has_labels = cluster
        .spec
        .selector
        .match_labels
        .as_ref()
        .is_some_and(|labels| !labels.is_empty());

    if !has_labels {
        return Err(Error::ValidationError(
            "selector must carry at least one matchLabels pair".to_string(),
        ));
    }

    Ok(())
}

/// Validate claim template names: unique DNS labels, since they are embedded
/// in claim names and used as pod volume names
fn validate_claim_templates(cluster: &StatefulCluster) -> Result<()> {
    let mut seen = BTreeSet::new();

    for template in &cluster.spec.volume_claim_templates {
        if !is_dns_label(&template.name) {
            return Err(Error::ValidationError(format!(
                "claim template name {:?} is not a valid DNS label",
                template.name
            )));
        }
        if !seen.insert(template.name.as_str()) {
            return Err(Error::ValidationError(format!(
                "duplicate claim template name {:?}",
                template.name
            )));
        }
    }

    Ok(())
}

/// RFC 1123 DNS label: lowercase alphanumerics and dashes, starting and
/// ending alphanumeric, at most 63 characters
fn is_dns_label(name: &str) -> bool {
    if name.is_empty() || name.len() > 63 {
        return false;
    }
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_ends = !name.starts_with('-') && !name.ends_with('-');
    valid_chars && valid_ends
}
