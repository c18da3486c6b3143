//! Integration tests module
//!
//! End-to-end tests for the feedpulse pipeline, including:
//! - Complete load -> compute -> save -> render flow
//! - Error handling at the ingest boundary

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
