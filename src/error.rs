//! Error types for videos-dl
//!
//! This module provides the error taxonomy for the library:
//! - Resolution errors raised by a [`StreamResolver`](crate::resolver::StreamResolver)
//! - Transfer errors carrying the HTTP status and reason
//! - Run-level errors (no input found, invalid configuration)
//!
//! Whether an error is retried is decided by [`IsRetryable`](crate::retry::IsRetryable),
//! not by the call sites that raise it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for videos-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for videos-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The resolver could not turn a link into a stream descriptor
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Transport-level HTTP failure while transferring bytes
    #[error("HTTP Error {status}: {reason}")]
    Transfer {
        /// HTTP status code (e.g. 503)
        status: u16,
        /// Reason phrase or short description of the failure
        reason: String,
    },

    /// No link list files matched the naming pattern
    #[error("no link files matching '{pattern}' found in {dir}")]
    NoInputFound {
        /// The pattern that was searched for
        pattern: String,
        /// The directory that was searched
        dir: PathBuf,
    },

    /// The link file naming pattern is malformed
    #[error("invalid link file pattern '{0}': expected exactly one '*'")]
    InvalidPattern(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_attempts")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised while resolving a link into a stream descriptor
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The remote resource cannot be resolved (removed, private, region-locked)
    #[error("Video {link} is unavailable: {reason}")]
    Unavailable {
        /// The link that could not be resolved
        link: String,
        /// Why the resolver gave up
        reason: String,
    },

    /// The resolver could not find a metadata field it needs for this link
    #[error("KeyError on {key} for video {link}")]
    MissingKey {
        /// The link being resolved
        link: String,
        /// Name of the missing metadata field
        key: String,
    },
}

impl Error {
    /// Build a transfer error from an HTTP status code
    pub fn transfer(status: reqwest::StatusCode) -> Self {
        Error::Transfer {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        }
    }

    /// Process exit code for a run that terminated with this error
    ///
    /// `1` is reserved for "no input found"; every other fatal error maps to `2`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::NoInputFound { .. } => 1,
            _ => 2,
        }
    }
}
