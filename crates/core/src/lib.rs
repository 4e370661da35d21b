//! # AppChains Core
//!
//! Pure pipeline logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the chains and beacon services
//! - The job submission / polling / report-building pipeline
//! - Beacon pass-through service
//!
//! ## Architecture Principles
//! - Only depends on `appchains-domain`
//! - No HTTP, filesystem, or platform code
//! - All external dependencies via traits
//! - Pure, testable pipeline logic

pub mod beacons;
pub mod reports;

// Re-export specific items to avoid ambiguity
pub use beacons::{BeaconLookup, BeaconService};
pub use reports::builder::build_report;
pub use reports::poller::JobPoller;
pub use reports::ports::{ChainsBackend, FileStore};
pub use reports::ReportService;
