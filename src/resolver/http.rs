//! HTTP resolver for direct media links

use super::traits::{ByteStream, StreamResolver};
use crate::config::ResolverConfig;
use crate::error::{Error, ResolveError};
use crate::types::StreamDescriptor;
use crate::utils::canonical_filename;
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use std::time::Duration;

/// Resolver that treats every link as a direct media URL
///
/// `resolve` issues a HEAD request and reads the file name and size from the
/// response headers; `open` issues a GET and streams the body.
///
/// # Examples
///
/// ```no_run
/// use videos_dl::config::ResolverConfig;
/// use videos_dl::resolver::{HttpResolver, StreamResolver};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = HttpResolver::new(&ResolverConfig::default())?;
/// let descriptor = resolver.resolve("https://example.com/media/clip.mp4").await?;
/// println!("{} ({} bytes)", descriptor.filename, descriptor.size);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpResolver {
    client: reqwest::Client,
    resolve_timeout: Duration,
}

impl HttpResolver {
    /// Build a resolver with the configured timeouts and User-Agent
    ///
    /// `timeout` bounds the HEAD request only; body transfers run for as long
    /// as bytes keep arriving.
    pub fn new(config: &ResolverConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            resolve_timeout: config.timeout,
        })
    }
}

#[async_trait]
impl StreamResolver for HttpResolver {
    async fn resolve(&self, link: &str) -> crate::Result<StreamDescriptor> {
        let unavailable = |reason: String| ResolveError::Unavailable {
            link: link.to_string(),
            reason,
        };

        let url = url::Url::parse(link).map_err(|e| unavailable(format!("invalid URL: {e}")))?;

        let response = self
            .client
            .head(url)
            .timeout(self.resolve_timeout)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")).into());
        }

        // Read the header directly; a HEAD response carries no body to size
        let size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            // A zero length cannot be told apart from a server that omits the size
            .filter(|&size| size > 0)
            .ok_or_else(|| ResolveError::MissingKey {
                link: link.to_string(),
                key: "content-length".to_string(),
            })?;

        let filename = canonical_filename(response.headers(), link);

        tracing::debug!(
            link = %link,
            url = %response.url(),
            filename = %filename,
            size,
            "Resolved stream"
        );

        Ok(StreamDescriptor {
            link: link.to_string(),
            url: response.url().to_string(),
            filename,
            size,
        })
    }

    async fn open(&self, descriptor: &StreamDescriptor) -> crate::Result<Box<dyn ByteStream>> {
        let response = self.client.get(&descriptor.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transfer(status));
        }

        Ok(Box::new(HttpStream { response }))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

struct HttpStream {
    response: reqwest::Response,
}

#[async_trait]
impl ByteStream for HttpStream {
    async fn next_chunk(&mut self) -> crate::Result<Option<Vec<u8>>> {
        Ok(self.response.chunk().await?.map(|chunk| chunk.to_vec()))
    }
}
