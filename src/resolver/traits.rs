//! Traits for stream resolution and byte transfer

use crate::types::StreamDescriptor;
use async_trait::async_trait;

/// Trait for turning links into downloadable streams
///
/// # Errors
///
/// Implementations report a stream that cannot be resolved as
/// [`ResolveError::Unavailable`](crate::error::ResolveError::Unavailable) and
/// missing metadata as [`ResolveError::MissingKey`](crate::error::ResolveError::MissingKey).
/// HTTP failures while opening or reading the stream are
/// [`Error::Transfer`](crate::Error::Transfer). All of these are retried by the
/// orchestrator; any other error aborts the run.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Resolve a link into a stream descriptor without transferring the body
    async fn resolve(&self, link: &str) -> crate::Result<StreamDescriptor>;

    /// Open the byte stream for a previously resolved descriptor
    async fn open(&self, descriptor: &StreamDescriptor) -> crate::Result<Box<dyn ByteStream>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// A body being transferred, pulled one chunk at a time
#[async_trait]
pub trait ByteStream: Send {
    /// Next chunk of bytes, or `None` at the end of the stream
    async fn next_chunk(&mut self) -> crate::Result<Option<Vec<u8>>>;
}
