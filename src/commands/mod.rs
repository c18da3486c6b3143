pub mod metrics;
pub mod report;

// Re-export command functions for convenience
pub use metrics::{metrics, run};
pub use report::{dashboard, report};
