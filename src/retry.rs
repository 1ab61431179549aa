//! Retry classification and linear backoff
//!
//! Whether a failure is worth another attempt is decided by [`IsRetryable`];
//! how long to wait before each attempt is decided by [`LinearBackoff`].
//! The orchestrator combines the two, so neither knows about concrete error
//! sources.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use videos_dl::retry::LinearBackoff;
//!
//! let backoff = LinearBackoff::new(3, Duration::from_secs(2));
//! assert_eq!(backoff.delay_before(1), Duration::ZERO);
//! assert_eq!(backoff.delay_before(3), Duration::from_secs(4));
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (unavailable stream, missing metadata, HTTP errors during
/// transfer) should return `true`. Anything else is treated as fatal by the caller.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Both resolution failures are retried the same way
            Error::Resolve(_) => true,
            // HTTP failures during the byte transfer
            Error::Transfer { .. } => true,
            // Network errors are retryable when the connection itself failed
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_body(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
                    // Body ended before the announced size
                    | std::io::ErrorKind::UnexpectedEof
            ),
            Error::NoInputFound { .. } => false,
            Error::InvalidPattern(_) => false,
            Error::Config { .. } => false,
            Error::Serialization(_) => false,
            Error::Other(_) => false,
        }
    }
}

/// Linear backoff: the delay before attempt `k` is `increment * (k - 1)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearBackoff {
    max_attempts: u32,
    increment: Duration,
}

impl LinearBackoff {
    /// Create a schedule of at most `max_attempts` attempts
    pub fn new(max_attempts: u32, increment: Duration) -> Self {
        Self {
            max_attempts,
            increment,
        }
    }

    /// Maximum number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay added after each failed attempt
    pub fn increment(&self) -> Duration {
        self.increment
    }

    /// Delay before the given 1-based attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.increment * attempt.saturating_sub(1)
    }
}

impl From<&RetryConfig> for LinearBackoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_increment)
    }
}
