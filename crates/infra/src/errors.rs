//! Infrastructure error types and conversions into the domain taxonomy

use appchains_domain::AppChainsError;
use thiserror::Error;

/// Errors arising in the HTTP adapter layer before they are mapped into
/// [`AppChainsError`].
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("http error: {0}")]
    Http(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<InfraError> for AppChainsError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Http(msg) | InfraError::Timeout(msg) => Self::Network(msg),
            InfraError::Io(msg) => Self::Io(msg),
        }
    }
}
