//! Exit readiness assessment scoring and report pipeline.
//!
//! The `assessment` module holds the deterministic scoring engine together with the
//! intake, narrative, rendering, and storage seams the HTTP service wires up.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
