//! Top-level run loop
//!
//! Discovers link lists, feeds each link to the [`DownloadOrchestrator`] in
//! order and collects per-list summaries. Per-link failures never stop a run;
//! only discovery failures and non-retryable errors do.

use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::DownloadOrchestrator;
use crate::reporter::Reporter;
use crate::resolver::{HttpResolver, StreamResolver};
use crate::source::LinkListSource;
use crate::types::{Event, ListSummary, Position, RunSummary};
use std::path::Path;
use std::sync::Arc;

/// Processes every discovered link list, one list and one link at a time
#[derive(Debug)]
pub struct RunDriver {
    source: LinkListSource,
    orchestrator: DownloadOrchestrator,
}

impl RunDriver {
    /// Create a driver using the given resolver
    pub fn new(config: &Config, resolver: Arc<dyn StreamResolver>) -> Result<Self> {
        config.validate()?;

        let source = LinkListSource::new(
            config.download.input_dir.clone(),
            &config.download.link_file_pattern,
        )?;

        Ok(Self {
            source,
            orchestrator: DownloadOrchestrator::new(config, resolver),
        })
    }

    /// Create a driver that fetches links over HTTP
    pub fn with_http_resolver(config: &Config) -> Result<Self> {
        let resolver = HttpResolver::new(&config.resolver)?;
        Self::new(config, Arc::new(resolver))
    }

    /// Process every link list
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoInputFound`](crate::Error::NoInputFound) before any
    /// processing when no list matches, and propagates non-retryable errors
    /// from loading or downloading.
    pub async fn run(&self, reporter: &mut dyn Reporter) -> Result<RunSummary> {
        let paths = self.source.discover().await?;
        tracing::info!(lists = paths.len(), "Starting run");

        let mut summary = RunSummary::default();
        for path in &paths {
            summary.lists.push(self.run_list(path, reporter).await?);
        }

        tracing::info!(
            lists = summary.lists.len(),
            failed = summary.failed(),
            "Run finished"
        );
        Ok(summary)
    }

    /// Process a single link list file
    pub async fn run_list(&self, path: &Path, reporter: &mut dyn Reporter) -> Result<ListSummary> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        reporter.report(&Event::ListLoading { name: name.clone() });
        let list = self.source.load(path).await?;

        tracing::info!(
            list = %list.name,
            subdirectory = %list.subdirectory,
            links = list.len(),
            "Processing link list"
        );

        let mut summary = ListSummary {
            name: list.name.clone(),
            subdirectory: list.subdirectory.clone(),
            total: list.len(),
            ..ListSummary::default()
        };
        let mut position = Position::start(list.len());

        for link in &list.links {
            let outcome = self
                .orchestrator
                .attempt(link, &list.subdirectory, position, reporter)
                .await?;

            summary.record(outcome);
            if outcome.is_done() {
                position.advance();
            } else {
                reporter.report(&Event::Failed { link: link.clone() });
            }
        }

        reporter.report(&Event::ListFinished { name });
        Ok(summary)
    }
}
