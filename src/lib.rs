//! # videos-dl
//!
//! Batch downloader for lists of video links.
//!
//! Link lists are text files named after a pattern such as `videos-*.txt`, one
//! link per line. Each list downloads into its own subdirectory of the output
//! directory, named after the wildcard part of the file name
//! (`videos-nature.txt` → `downloads/nature/`). Links whose file is already on
//! disk are skipped, so a run can be repeated safely.
//!
//! ## Quick Start
//!
//! ```no_run
//! use videos_dl::{Config, ConsoleReporter, RunDriver};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let driver = RunDriver::with_http_resolver(&config)?;
//!
//!     let mut reporter = ConsoleReporter::stdout();
//!     let summary = driver.run(&mut reporter).await?;
//!     println!("{} links failed", summary.failed());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Custom resolvers
//!
//! Resolving a watch-page link into a media stream is site specific. Implement
//! [`StreamResolver`] and pass it to [`RunDriver::new`]; the built-in
//! [`HttpResolver`](resolver::HttpResolver) handles direct media URLs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Top-level run loop
pub mod driver;
/// Error types
pub mod error;
/// Per-link download orchestration
pub mod orchestrator;
/// Progress reporting
pub mod reporter;
/// Stream resolution
pub mod resolver;
/// Retry classification and linear backoff
pub mod retry;
/// Link list discovery and loading
pub mod source;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, ResolverConfig, RetryConfig, SkipPolicy};
pub use driver::RunDriver;
pub use error::{Error, ResolveError, Result};
pub use orchestrator::DownloadOrchestrator;
pub use reporter::{ConsoleReporter, EventLog, Reporter};
pub use resolver::StreamResolver;
pub use retry::{IsRetryable, LinearBackoff};
pub use source::{LinkListSource, LinkPattern};
pub use types::{
    DownloadTask, Event, LinkList, ListSummary, Outcome, Position, RunSummary, StreamDescriptor,
};
