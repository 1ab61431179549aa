//! Per-link download orchestration
//!
//! [`DownloadOrchestrator::attempt`] drives one link to a final [`Outcome`]:
//!
//! 1. Wait for the current backoff delay (zero before the first attempt)
//! 2. Resolve the link into a [`StreamDescriptor`]
//! 3. Ensure `download_dir/subdirectory` exists
//! 4. Skip if the target file is already on disk, before opening the stream
//! 5. Transfer the stream into the target file, emitting progress events
//!
//! Retryable failures in steps 2 and 5 grow the delay linearly and start the
//! next attempt; once the attempts are used up the link is [`Outcome::Failed`].
//! Non-retryable errors propagate to the caller.

use crate::config::{Config, SkipPolicy};
use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::resolver::StreamResolver;
use crate::retry::{IsRetryable, LinearBackoff};
use crate::types::{DownloadTask, Event, Outcome, Position, StreamDescriptor};
use crate::utils::percent_complete;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Downloads single links with skip detection and linear backoff
#[derive(Clone)]
pub struct DownloadOrchestrator {
    resolver: Arc<dyn StreamResolver>,
    download_dir: PathBuf,
    backoff: LinearBackoff,
    skip_policy: SkipPolicy,
}

impl std::fmt::Debug for DownloadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("resolver", &self.resolver.name())
            .field("download_dir", &self.download_dir)
            .field("backoff", &self.backoff)
            .field("skip_policy", &self.skip_policy)
            .finish()
    }
}

impl DownloadOrchestrator {
    /// Create an orchestrator from the run configuration
    pub fn new(config: &Config, resolver: Arc<dyn StreamResolver>) -> Self {
        Self {
            resolver,
            download_dir: config.download.download_dir.clone(),
            backoff: LinearBackoff::from(&config.retry),
            skip_policy: config.download.skip_policy,
        }
    }

    /// Download one link into `download_dir/subdirectory`
    ///
    /// Returns [`Outcome::Skipped`] without transferring anything when the
    /// target file already exists, [`Outcome::Succeeded`] after a complete
    /// transfer and [`Outcome::Failed`] when every attempt hit a retryable
    /// error.
    ///
    /// # Errors
    ///
    /// Errors that are not retryable (see [`IsRetryable`]) are returned as-is
    /// and stop the attempt cycle immediately. An empty link is rejected.
    pub async fn attempt(
        &self,
        link: &str,
        subdirectory: &str,
        position: Position,
        reporter: &mut dyn Reporter,
    ) -> Result<Outcome> {
        let mut task = DownloadTask::new(link, subdirectory);
        if task.link.is_empty() {
            return Err(Error::Other("cannot download an empty link".to_string()));
        }

        let max_attempts = self.backoff.max_attempts();
        if max_attempts == 0 {
            return Ok(task.finish(Outcome::Failed));
        }

        loop {
            debug_assert_eq!(task.delay, self.backoff.delay_before(task.attempt));
            if !task.delay.is_zero() {
                tokio::time::sleep(task.delay).await;
            }

            reporter.report(&Event::Trying {
                link: task.link.clone(),
            });

            let error = match self.try_once(&task, position, reporter).await {
                Ok(outcome) => {
                    tracing::info!(link = %task.link, attempt = task.attempt, ?outcome, "Link finished");
                    return Ok(task.finish(outcome));
                }
                Err(e) if e.is_retryable() => e,
                Err(e) => {
                    tracing::error!(link = %task.link, error = %e, "Non-retryable error");
                    return Err(e);
                }
            };

            let failed_attempt = task.attempt;
            let will_retry = task.record_failure(max_attempts, self.backoff.increment());

            if will_retry {
                tracing::warn!(
                    link = %task.link,
                    error = %error,
                    attempt = failed_attempt,
                    max_attempts,
                    delay_secs = task.delay.as_secs(),
                    "Attempt failed, retrying"
                );
            } else {
                tracing::error!(
                    link = %task.link,
                    error = %error,
                    attempts = failed_attempt,
                    "Attempt failed, retries exhausted"
                );
            }

            reporter.report(&Event::AttemptFailed {
                link: task.link.clone(),
                reason: failure_reason(&error),
                attempt: failed_attempt,
                max_attempts,
                will_retry,
            });

            if !will_retry {
                return Ok(Outcome::Failed);
            }
        }
    }

    async fn try_once(
        &self,
        task: &DownloadTask,
        position: Position,
        reporter: &mut dyn Reporter,
    ) -> Result<Outcome> {
        let descriptor = self.resolver.resolve(&task.link).await?;

        let target_dir = self.download_dir.join(&task.subdirectory);
        ensure_dir(&target_dir).await?;

        let target = target_dir.join(&descriptor.filename);
        if self.should_skip(&target, &descriptor).await? {
            reporter.report(&Event::Skipped {
                position,
                filename: descriptor.filename.clone(),
                link: task.link.clone(),
            });
            return Ok(Outcome::Skipped);
        }

        self.transfer(&descriptor, &target, position, reporter).await?;
        Ok(Outcome::Succeeded)
    }

    async fn should_skip(&self, target: &Path, descriptor: &StreamDescriptor) -> Result<bool> {
        let metadata = match tokio::fs::metadata(target).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            return Ok(false);
        }

        match self.skip_policy {
            SkipPolicy::Exists => Ok(true),
            SkipPolicy::SizeMatch if metadata.len() == descriptor.size => Ok(true),
            SkipPolicy::SizeMatch => {
                tracing::warn!(
                    path = %target.display(),
                    on_disk = metadata.len(),
                    expected = descriptor.size,
                    "Existing file has the wrong size, downloading again"
                );
                Ok(false)
            }
        }
    }

    async fn transfer(
        &self,
        descriptor: &StreamDescriptor,
        target: &Path,
        position: Position,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        let mut stream = self.resolver.open(descriptor).await?;
        let mut file = tokio::fs::File::create(target).await?;

        let total = descriptor.size;
        let mut written: u64 = 0;
        let mut last_percent = None;

        while let Some(chunk) = stream.next_chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;

            let percent = percent_complete(total, total.saturating_sub(written));
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                reporter.report(&Event::Progress { position, percent });
            }
        }

        file.flush().await?;

        if written < total {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("incomplete body: received {written} of {total} bytes"),
            )));
        }

        tracing::debug!(path = %target.display(), bytes = written, "Transfer complete");
        reporter.report(&Event::Complete {
            position,
            filename: descriptor.filename.clone(),
        });
        Ok(())
    }
}

/// Create `dir` and its parents if nothing exists at that path
///
/// An existing path is left alone even when it is not a directory; writing
/// the target file will then fail on its own.
async fn ensure_dir(dir: &Path) -> Result<()> {
    if tokio::fs::try_exists(dir).await? {
        return Ok(());
    }

    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => {
            tracing::debug!(path = %dir.display(), "Created download directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn failure_reason(error: &Error) -> String {
    match error {
        Error::Resolve(e) => e.to_string(),
        other => other.to_string(),
    }
}
