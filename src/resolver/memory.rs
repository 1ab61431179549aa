//! In-memory resolver with scripted failures

use super::traits::{ByteStream, StreamResolver};
use crate::error::{Error, ResolveError};
use crate::types::StreamDescriptor;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Failure injected into the next call for a link
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// `resolve` fails with [`ResolveError::Unavailable`]
    Unavailable,
    /// `resolve` fails with [`ResolveError::MissingKey`] for the given key
    MissingKey(String),
    /// `resolve` fails with a non-retryable [`Error::Other`]
    Fatal(String),
    /// `open` fails with [`Error::Transfer`] carrying this status
    Http(u16),
    /// The stream ends after this many bytes
    Truncate(usize),
}

impl ScriptedFailure {
    fn applies_to_resolve(&self) -> bool {
        matches!(
            self,
            ScriptedFailure::Unavailable | ScriptedFailure::MissingKey(_) | ScriptedFailure::Fatal(_)
        )
    }
}

#[derive(Debug, Default)]
struct Entry {
    filename: String,
    data: Vec<u8>,
    failures: VecDeque<ScriptedFailure>,
    resolves: usize,
    opens: usize,
}

/// Resolver serving byte buffers from memory
///
/// Each link maps to a file name and its content. Failures queued with
/// [`fail`](Self::fail) are consumed in order by the calls they apply to, which
/// makes retry behaviour reproducible. Links that were never registered
/// resolve as unavailable.
///
/// # Examples
///
/// ```
/// use videos_dl::resolver::{MemoryResolver, ScriptedFailure, StreamResolver};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = MemoryResolver::new()
///     .with_stream("https://example/a", "a.mp4", b"abc".to_vec())
///     .fail("https://example/a", ScriptedFailure::Unavailable);
///
/// assert!(resolver.resolve("https://example/a").await.is_err());
/// assert_eq!(resolver.resolve("https://example/a").await?.size, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryResolver {
    entries: Mutex<HashMap<String, Entry>>,
    chunk_size: usize,
}

impl Default for MemoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResolver {
    /// Create an empty resolver that yields 4 KiB chunks
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            chunk_size: 4096,
        }
    }

    /// Set the chunk size used by opened streams (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Register a stream for a link
    pub fn with_stream(self, link: &str, filename: &str, data: Vec<u8>) -> Self {
        {
            let mut entries = self.lock();
            let entry = entries.entry(link.to_string()).or_default();
            entry.filename = filename.to_string();
            entry.data = data;
        }
        self
    }

    /// Queue a failure for a link
    pub fn fail(self, link: &str, failure: ScriptedFailure) -> Self {
        self.lock()
            .entry(link.to_string())
            .or_default()
            .failures
            .push_back(failure);
        self
    }

    /// Number of `resolve` calls made for a link
    pub fn resolves(&self, link: &str) -> usize {
        self.lock().get(link).map_or(0, |e| e.resolves)
    }

    /// Number of `open` calls made for a link
    pub fn opens(&self, link: &str) -> usize {
        self.lock().get(link).map_or(0, |e| e.opens)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StreamResolver for MemoryResolver {
    async fn resolve(&self, link: &str) -> crate::Result<StreamDescriptor> {
        let mut entries = self.lock();
        let entry = entries.entry(link.to_string()).or_default();
        entry.resolves += 1;

        if entry
            .failures
            .front()
            .is_some_and(ScriptedFailure::applies_to_resolve)
        {
            let failure = entry.failures.pop_front();
            return Err(match failure {
                Some(ScriptedFailure::MissingKey(key)) => ResolveError::MissingKey {
                    link: link.to_string(),
                    key,
                }
                .into(),
                Some(ScriptedFailure::Fatal(message)) => Error::Other(message),
                _ => ResolveError::Unavailable {
                    link: link.to_string(),
                    reason: "scripted failure".to_string(),
                }
                .into(),
            });
        }

        if entry.filename.is_empty() {
            return Err(ResolveError::Unavailable {
                link: link.to_string(),
                reason: "no such stream".to_string(),
            }
            .into());
        }

        Ok(StreamDescriptor {
            link: link.to_string(),
            url: link.to_string(),
            filename: entry.filename.clone(),
            size: entry.data.len() as u64,
        })
    }

    async fn open(&self, descriptor: &StreamDescriptor) -> crate::Result<Box<dyn ByteStream>> {
        let mut entries = self.lock();
        let entry = entries.entry(descriptor.link.clone()).or_default();
        entry.opens += 1;

        let mut data = entry.data.clone();
        match entry.failures.front() {
            Some(ScriptedFailure::Http(status)) => {
                let status = reqwest::StatusCode::from_u16(*status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                entry.failures.pop_front();
                return Err(Error::transfer(status));
            }
            Some(ScriptedFailure::Truncate(len)) => {
                data.truncate(*len);
                entry.failures.pop_front();
            }
            _ => {}
        }

        let chunks = data
            .chunks(self.chunk_size)
            .map(<[u8]>::to_vec)
            .collect::<VecDeque<_>>();
        Ok(Box::new(MemoryStream { chunks }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryStream {
    chunks: VecDeque<Vec<u8>>,
}

#[async_trait]
impl ByteStream for MemoryStream {
    async fn next_chunk(&mut self) -> crate::Result<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://example/a";

    async fn drain(mut stream: Box<dyn ByteStream>) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next_chunk().await.unwrap() {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn unknown_link_is_unavailable() {
        let resolver = MemoryResolver::new();
        let err = resolver.resolve(LINK).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolve(ResolveError::Unavailable { .. })
        ));
        assert_eq!(resolver.resolves(LINK), 1);
    }

    #[tokio::test]
    async fn failures_are_consumed_in_order() {
        let resolver = MemoryResolver::new()
            .with_stream(LINK, "a.mp4", vec![0; 10])
            .fail(LINK, ScriptedFailure::MissingKey("streamingData".into()))
            .fail(LINK, ScriptedFailure::Http(503));

        let err = resolver.resolve(LINK).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolve(ResolveError::MissingKey { ref key, .. }) if key == "streamingData"
        ));

        let descriptor = resolver.resolve(LINK).await.unwrap();
        assert_eq!(descriptor.size, 10);

        assert!(matches!(
            resolver.open(&descriptor).await,
            Err(Error::Transfer { status: 503, .. })
        ));
        assert!(resolver.open(&descriptor).await.is_ok());
        assert_eq!(resolver.opens(LINK), 2);
    }

    #[tokio::test]
    async fn streams_are_split_into_chunks() {
        let resolver = MemoryResolver::new()
            .with_chunk_size(4)
            .with_stream(LINK, "a.mp4", (0u8..10).collect());

        let descriptor = resolver.resolve(LINK).await.unwrap();
        let chunks = drain(resolver.open(&descriptor).await.unwrap()).await;
        assert_eq!(chunks.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn truncate_shortens_one_stream() {
        let resolver = MemoryResolver::new()
            .with_stream(LINK, "a.mp4", vec![1; 8])
            .fail(LINK, ScriptedFailure::Truncate(3));

        let descriptor = resolver.resolve(LINK).await.unwrap();
        assert_eq!(descriptor.size, 8);

        let first = drain(resolver.open(&descriptor).await.unwrap()).await;
        assert_eq!(first.concat().len(), 3);
        let second = drain(resolver.open(&descriptor).await.unwrap()).await;
        assert_eq!(second.concat().len(), 8);
    }
}
