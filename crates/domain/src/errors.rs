//! Error types used throughout the SDK

use std::time::Duration;

use thiserror::Error;

/// Main error type for AppChains operations
#[derive(Error, Debug)]
pub enum AppChainsError {
    /// The service answered a call with a non-success HTTP status.
    #[error("service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// A response body did not carry the fields the protocol requires.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A failure while polling a specific job, wrapping the cause.
    #[error("error processing job {id_job}: {source}")]
    Job {
        id_job: i64,
        #[source]
        source: Box<AppChainsError>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Returned only when a caller opted into a polling deadline.
    #[error("deadline of {0:?} exceeded while waiting for job completion")]
    Timeout(Duration),

    /// Returned only when a caller-supplied cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(String),
}

impl AppChainsError {
    /// Wrap this error with the job it occurred for.
    pub fn for_job(self, id_job: i64) -> Self {
        Self::Job { id_job, source: Box::new(self) }
    }
}

/// Result type alias for AppChains operations
pub type Result<T> = std::result::Result<T, AppChainsError>;
