//! Stream resolution
//!
//! A resolver turns a link into a [`StreamDescriptor`](crate::types::StreamDescriptor)
//! (canonical file name and size) and later opens the byte stream for it.
//! Resolution and transfer are separate calls so the orchestrator can decide to
//! skip a link before any bytes move.
//!
//! ## Architecture
//!
//! The core abstraction is the [`StreamResolver`] trait. Two implementations are
//! provided:
//!
//! - [`HttpResolver`]: Treats each link as a direct media URL fetched over HTTP
//! - [`MemoryResolver`]: Scripted in-memory streams for tests and embedding
//!
//! Site-specific resolvers (extracting a media URL from a watch page) plug in by
//! implementing [`StreamResolver`].

mod http;
mod memory;
mod traits;

pub use http::HttpResolver;
pub use memory::{MemoryResolver, ScriptedFailure};
pub use traits::{ByteStream, StreamResolver};
