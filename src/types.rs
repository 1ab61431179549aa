//! Core types and events for videos-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One input file: an ordered list of links and the subdirectory they download into
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkList {
    /// Path of the file the links were read from
    pub path: PathBuf,
    /// File name as discovered (e.g. "videos-nature.txt")
    pub name: String,
    /// Output subdirectory derived from the file name (e.g. "nature")
    pub subdirectory: String,
    /// Non-blank links in file order
    pub links: Vec<String>,
}

impl LinkList {
    /// Number of links that will be attempted
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the list holds no links
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// What a resolver knows about a stream before any bytes are transferred
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Link the descriptor was resolved from
    pub link: String,
    /// URL the bytes are fetched from
    pub url: String,
    /// Canonical file name, safe to join onto the target directory
    pub filename: String,
    /// Total size in bytes
    pub size: u64,
}

/// Final result of one link's attempt cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The stream was transferred to disk
    Succeeded,
    /// The target file was already present, nothing was transferred
    Skipped,
    /// Every attempt failed with a retryable error
    Failed,
}

impl Outcome {
    /// Whether the link counts as done for progress display
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Succeeded | Outcome::Skipped)
    }
}

/// State of a [`DownloadTask`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Attempts remain
    Pending,
    /// Finished with an outcome
    Finished(Outcome),
}

/// Attempt bookkeeping for one link within one list
///
/// The retry counter starts at 1 and never exceeds `max_attempts`; the
/// backoff delay starts at zero and grows by a fixed increment per failure.
#[derive(Clone, Debug)]
pub struct DownloadTask {
    /// The link being downloaded
    pub link: String,
    /// Output subdirectory of the owning list
    pub subdirectory: String,
    /// Current 1-based attempt number
    pub attempt: u32,
    /// Delay to wait before the current attempt
    pub delay: Duration,
    /// Pending until an outcome is recorded
    pub status: TaskStatus,
}

impl DownloadTask {
    /// Create a pending task; the link is trimmed of surrounding whitespace
    pub fn new(link: &str, subdirectory: &str) -> Self {
        Self {
            link: link.trim().to_string(),
            subdirectory: subdirectory.to_string(),
            attempt: 1,
            delay: Duration::ZERO,
            status: TaskStatus::Pending,
        }
    }

    /// Record a retryable failure: grow the delay and move to the next attempt
    ///
    /// Returns `false` once `max_attempts` is reached, at which point the task is
    /// finished as [`Outcome::Failed`] and the counter stays at `max_attempts`.
    pub fn record_failure(&mut self, max_attempts: u32, increment: Duration) -> bool {
        if self.attempt >= max_attempts {
            self.status = TaskStatus::Finished(Outcome::Failed);
            return false;
        }
        self.attempt += 1;
        self.delay += increment;
        true
    }

    /// Record a terminal outcome
    pub fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.status = TaskStatus::Finished(outcome);
        outcome
    }
}

/// Display position of the link being processed, e.g. `(2/5)`
///
/// Owned by the driver and passed explicitly to the orchestrator; `current`
/// only advances when a link succeeds or is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 1-based index of the current link
    pub current: usize,
    /// Number of links in the active list
    pub total: usize,
}

impl Position {
    /// Start at the first link of a list with `total` links
    pub fn start(total: usize) -> Self {
        Self { current: 1, total }
    }

    /// Move on to the next link
    pub fn advance(&mut self) {
        self.current += 1;
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}/{})", self.current, self.total)
    }
}

/// Event emitted while processing link lists
///
/// Events are delivered synchronously to a [`Reporter`](crate::reporter::Reporter)
/// in the order they happen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A link list is about to be processed
    ListLoading {
        /// File name of the list
        name: String,
    },

    /// An attempt for a link is starting
    Trying {
        /// The link
        link: String,
    },

    /// Transfer progress, emitted when the rounded percentage changes
    Progress {
        /// Display position
        position: Position,
        /// Rounded percentage complete (0 to 100)
        percent: u8,
    },

    /// The transfer finished
    Complete {
        /// Display position
        position: Position,
        /// Canonical file name written
        filename: String,
    },

    /// The target file already exists, nothing transferred
    Skipped {
        /// Display position
        position: Position,
        /// Canonical file name found on disk
        filename: String,
        /// The link
        link: String,
    },

    /// An attempt failed with a retryable error
    AttemptFailed {
        /// The link
        link: String,
        /// Human-readable failure reason
        reason: String,
        /// Attempt that failed (1-based)
        attempt: u32,
        /// Maximum attempts
        max_attempts: u32,
        /// Whether another attempt follows
        will_retry: bool,
    },

    /// All attempts failed for a link
    Failed {
        /// The link
        link: String,
    },

    /// A link list has been fully processed
    ListFinished {
        /// File name of the list
        name: String,
    },
}

/// Per-list counts returned by the driver
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// File name of the list
    pub name: String,
    /// Output subdirectory
    pub subdirectory: String,
    /// Links attempted
    pub total: usize,
    /// Links transferred
    pub succeeded: usize,
    /// Links already present
    pub skipped: usize,
    /// Links that exhausted their attempts
    pub failed: usize,
}

impl ListSummary {
    /// Count an outcome
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Result of a whole run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// One entry per processed list, in processing order
    pub lists: Vec<ListSummary>,
}

impl RunSummary {
    /// Total failed links across every list
    pub fn failed(&self) -> usize {
        self.lists.iter().map(|l| l.failed).sum()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_starts_at_attempt_one_with_no_delay() {
        let task = DownloadTask::new("  https://example/a \n", "nature");
        assert_eq!(task.link, "https://example/a");
        assert_eq!(task.attempt, 1);
        assert_eq!(task.delay, Duration::ZERO);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn task_counter_never_exceeds_max_attempts() {
        let mut task = DownloadTask::new("https://example/a", "nature");
        let step = Duration::from_secs(2);

        assert!(task.record_failure(3, step));
        assert_eq!((task.attempt, task.delay), (2, Duration::from_secs(2)));
        assert!(task.record_failure(3, step));
        assert_eq!((task.attempt, task.delay), (3, Duration::from_secs(4)));
        assert!(!task.record_failure(3, step));

        assert_eq!(task.attempt, 3);
        assert_eq!(task.status, TaskStatus::Finished(Outcome::Failed));
    }

    #[test]
    fn position_displays_as_fraction() {
        let mut position = Position::start(5);
        assert_eq!(position.to_string(), "(1/5)");
        position.advance();
        assert_eq!(position.to_string(), "(2/5)");
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = ListSummary::default();
        summary.record(Outcome::Succeeded);
        summary.record(Outcome::Skipped);
        summary.record(Outcome::Failed);
        summary.record(Outcome::Failed);

        assert_eq!((summary.succeeded, summary.skipped, summary.failed), (1, 1, 2));
        let run = RunSummary {
            lists: vec![summary.clone(), summary],
        };
        assert_eq!(run.failed(), 4);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::Progress {
            position: Position::start(2),
            percent: 50,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 50);
        assert_eq!(json["position"]["total"], 2);
    }
}
