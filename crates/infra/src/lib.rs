//! # AppChains Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP transport with retry and file download
//! - The SQAPI chains-service client (`ChainsBackend` adapter)
//! - The beacon HTTP client (`BeaconLookup` adapter)
//! - The configuration loader (environment + TOML files)

pub mod beacons;
pub mod config;
pub mod errors;
pub mod http;
pub mod sqapi;

pub use beacons::BeaconClient;
pub use errors::InfraError;
pub use http::HttpClient;
pub use sqapi::SqApiClient;
