//! Domain constants
//!
//! Centralized location for all domain-level constants used throughout the
//! SDK.

// Protocol constants
pub const PROTOCOL_VERSION: &str = "v2";
pub const DATA_SOURCE_PARAMETER: &str = "dataSourceId";

// Default service locations
pub const DEFAULT_BEACONS_URL: &str = "https://beacon.sequencing.com";

// Polling configuration defaults
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

// Transport configuration defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BACKOFF_MS: u64 = 200;

// Result property type tags recognized by the report builder
pub const PROPERTY_TYPE_PLAINTEXT: &str = "plaintext";
pub const PROPERTY_TYPE_PDF: &str = "pdf";
