//! Configuration types for videos-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Download behavior configuration (directories, input discovery, skip detection)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root output directory; one subdirectory per link list (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Directory searched for link list files (default: ".")
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Naming pattern for link list files with a single `*` wildcard (default: "videos-*.txt")
    ///
    /// The wildcard portion of each matching file name becomes the output subdirectory.
    #[serde(default = "default_link_file_pattern")]
    pub link_file_pattern: String,

    /// How an existing target file is recognised as already downloaded
    #[serde(default)]
    pub skip_policy: SkipPolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            input_dir: default_input_dir(),
            link_file_pattern: default_link_file_pattern(),
            skip_policy: SkipPolicy::default(),
        }
    }
}

/// Rule for deciding that a link has already been downloaded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Skip when a non-directory file exists at the target path
    Exists,
    /// Skip only when the existing file's length equals the announced size (default)
    ///
    /// A truncated file left behind by an interrupted transfer is downloaded again.
    #[default]
    SizeMatch,
}

/// Retry configuration for retryable resolution and transfer failures
///
/// Backoff is linear: the delay before attempt `k` is `backoff_increment * (k - 1)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per link (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay added after each failed attempt (default: 2 seconds)
    #[serde(default = "default_backoff_increment", with = "duration_serde")]
    pub backoff_increment: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_increment: default_backoff_increment(),
        }
    }
}

/// HTTP resolver configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Timeout for resolving a link (default: 300 seconds)
    ///
    /// Applies to the HEAD request only. Body transfers have no overall
    /// deadline; a stalled connection surfaces as a network error instead.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Connection timeout (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for a videos-dl run
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directories, input discovery and skip detection
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retry behaviour
    #[serde(default)]
    pub retry: RetryConfig,

    /// HTTP resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load a configuration from a JSON file
    ///
    /// The result is not validated, so callers can apply overrides first and
    /// then call [`validate`](Self::validate) once.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check the configuration for values the run cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::Config {
                message: "max_attempts must be at least 1".to_string(),
                key: Some("max_attempts".to_string()),
            });
        }

        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".to_string(),
                key: Some("download_dir".to_string()),
            });
        }

        if self.download.link_file_pattern.matches('*').count() != 1 {
            return Err(Error::InvalidPattern(
                self.download.link_file_pattern.clone(),
            ));
        }

        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_link_file_pattern() -> String {
    "videos-*.txt".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_increment() -> Duration {
    Duration::from_secs(2)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("videos-dl/{}", env!("CARGO_PKG_VERSION"))
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_observed_tool() {
        let config = Config::default();
        assert_eq!(config.download.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.download.link_file_pattern, "videos-*.txt");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_increment, Duration::from_secs(2));
        assert_eq!(config.download.skip_policy, SkipPolicy::SizeMatch);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn empty_json_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse failed");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.download.input_dir, PathBuf::from("."));
    }

    #[test]
    fn durations_serialize_as_integer_seconds() {
        let config = RetryConfig {
            backoff_increment: Duration::from_secs(5),
            ..RetryConfig::default()
        };

        let json = serde_json::to_value(&config).expect("serialize failed");
        assert_eq!(json["backoff_increment"], 5);
    }

    #[test]
    fn skip_policy_uses_snake_case() {
        let json = r#"{"download": {"skip_policy": "exists"}}"#;
        let config: Config = serde_json::from_str(json).expect("parse failed");
        assert_eq!(config.download.skip_policy, SkipPolicy::Exists);

        let json = r#"{"download": {"skip_policy": "size_match"}}"#;
        let config: Config = serde_json::from_str(json).expect("parse failed");
        assert_eq!(config.download.skip_policy, SkipPolicy::SizeMatch);
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("max_attempts")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn pattern_needs_exactly_one_wildcard() {
        let mut config = Config::default();
        config.download.link_file_pattern = "videos.txt".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidPattern(_))));

        config.download.link_file_pattern = "*-*.txt".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn from_file_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"retry": {"max_attempts": 5, "backoff_increment": 1}, "download": {"download_dir": "out"}}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_increment, Duration::from_secs(1));
        assert_eq!(config.download.download_dir, PathBuf::from("out"));
        config.validate().unwrap();
    }

    #[test]
    fn from_file_leaves_validation_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"retry": {"max_attempts": 0}}"#).unwrap();

        let mut config = Config::from_file(&path).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        config.retry.max_attempts = 3;
        config.validate().unwrap();
    }

    #[test]
    fn from_file_reports_missing_file_as_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Config { key: None, .. })));
    }
}
