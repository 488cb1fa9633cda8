//! Unit tests for the StatefulCluster operator
//!
//! This module contains unit tests for:
//! - The reconciliation decision engine
//! - Replica materialization (pod + claim generation)
//! - Status and condition management
//! - Spec validation

mod decision;
mod resources;
