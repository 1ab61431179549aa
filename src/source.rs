//! Link list discovery and loading
//!
//! Link lists are plain text files whose names match a pattern with a single
//! `*` wildcard, e.g. `videos-*.txt`. The wildcard portion of a matching file
//! name names the output subdirectory: `videos-nature.txt` downloads into
//! `nature/`.

use crate::error::{Error, Result};
use crate::types::LinkList;
use std::path::{Path, PathBuf};

/// A file name pattern with exactly one `*` wildcard
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPattern {
    prefix: String,
    suffix: String,
}

impl LinkPattern {
    /// Parse a pattern such as `videos-*.txt`
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parts = pattern.split('*');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(suffix), None) => Ok(Self {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            }),
            _ => Err(Error::InvalidPattern(pattern.to_string())),
        }
    }

    /// Return the wildcard portion of `name`, or `None` if it does not match
    ///
    /// Only the leading prefix and trailing suffix are removed, so
    /// `videos-cats-and-dogs.txt` yields `cats-and-dogs`.
    pub fn wildcard<'a>(&self, name: &'a str) -> Option<&'a str> {
        if name.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        name.strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }

    /// Whether `name` matches the pattern
    pub fn matches(&self, name: &str) -> bool {
        self.wildcard(name).is_some()
    }
}

impl std::fmt::Display for LinkPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.prefix, self.suffix)
    }
}

/// Finds link list files in a directory and loads them
#[derive(Clone, Debug)]
pub struct LinkListSource {
    dir: PathBuf,
    pattern: LinkPattern,
}

impl LinkListSource {
    /// Create a source searching `dir` for files matching `pattern`
    pub fn new(dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        Ok(Self {
            dir: dir.into(),
            pattern: LinkPattern::parse(pattern)?,
        })
    }

    /// List matching files, sorted by name
    ///
    /// Returns [`Error::NoInputFound`] when nothing matches, including when the
    /// directory itself does not exist. Directories whose names happen to
    /// match are ignored.
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(self.no_input_found());
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !self.pattern.matches(&name) {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                continue;
            }
            found.push(entry.path());
        }

        if found.is_empty() {
            return Err(self.no_input_found());
        }

        found.sort();
        tracing::debug!(count = found.len(), dir = %self.dir.display(), "Discovered link lists");
        Ok(found)
    }

    fn no_input_found(&self) -> Error {
        Error::NoInputFound {
            pattern: self.pattern.to_string(),
            dir: self.dir.clone(),
        }
    }

    /// Read a link list, dropping blank and whitespace-only lines
    pub async fn load(&self, path: &Path) -> Result<LinkList> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Other(format!("invalid link list path {}", path.display())))?
            .to_string();

        let subdirectory = self
            .pattern
            .wildcard(&name)
            .ok_or_else(|| {
                Error::Other(format!("{} does not match pattern {}", name, self.pattern))
            })?
            .to_string();

        let content = tokio::fs::read_to_string(path).await?;

        Ok(LinkList {
            path: path.to_path_buf(),
            name,
            subdirectory,
            links: parse_links(&content),
        })
    }
}

/// Split file content into links, one per line, skipping blank lines
///
/// Links are trimmed of surrounding whitespace and line terminators; order is kept.
pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_strips_prefix_and_suffix() {
        let pattern = LinkPattern::parse("videos-*.txt").unwrap();
        assert_eq!(pattern.wildcard("videos-cats.txt"), Some("cats"));
        assert_eq!(pattern.wildcard("videos-nature.txt"), Some("nature"));
        assert_eq!(
            pattern.wildcard("videos-cats-and-dogs.txt"),
            Some("cats-and-dogs")
        );
    }

    #[test]
    fn wildcard_keeps_inner_occurrences_of_the_literals() {
        let pattern = LinkPattern::parse("videos-*.txt").unwrap();
        assert_eq!(
            pattern.wildcard("videos-my-videos-.txt.txt"),
            Some("my-videos-.txt")
        );
    }

    #[test]
    fn wildcard_rejects_non_matching_names() {
        let pattern = LinkPattern::parse("videos-*.txt").unwrap();
        assert_eq!(pattern.wildcard("music-cats.txt"), None);
        assert_eq!(pattern.wildcard("videos-cats.md"), None);
        assert_eq!(pattern.wildcard("videos.txt"), None);
        assert_eq!(pattern.wildcard("videos-.txt"), Some(""));
    }

    #[test]
    fn wildcard_does_not_overlap_prefix_and_suffix() {
        let pattern = LinkPattern::parse("ab*ba").unwrap();
        assert_eq!(pattern.wildcard("aba"), None);
        assert_eq!(pattern.wildcard("abba"), Some(""));
    }

    #[test]
    fn parse_requires_exactly_one_wildcard() {
        assert!(matches!(
            LinkPattern::parse("videos.txt"),
            Err(Error::InvalidPattern(_))
        ));
        assert!(matches!(
            LinkPattern::parse("*-*.txt"),
            Err(Error::InvalidPattern(_))
        ));
        assert_eq!(
            LinkPattern::parse("videos-*.txt").unwrap().to_string(),
            "videos-*.txt"
        );
    }

    #[test]
    fn parse_links_drops_blank_lines_and_keeps_order() {
        let content = "https://example/a\r\n\n   \nhttps://example/b\n\t\nhttps://example/c";
        assert_eq!(
            parse_links(content),
            vec!["https://example/a", "https://example/b", "https://example/c"]
        );
    }

    #[tokio::test]
    async fn discover_finds_sorted_matches_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("videos-zoo.txt"), "a").unwrap();
        std::fs::write(dir.path().join("videos-cats.txt"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "a").unwrap();
        std::fs::create_dir(dir.path().join("videos-dir.txt")).unwrap();

        let source = LinkListSource::new(dir.path(), "videos-*.txt").unwrap();
        let found = source.discover().await.unwrap();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["videos-cats.txt", "videos-zoo.txt"]);
    }

    #[tokio::test]
    async fn discover_with_no_matches_is_no_input_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "a").unwrap();

        let source = LinkListSource::new(dir.path(), "videos-*.txt").unwrap();
        match source.discover().await {
            Err(Error::NoInputFound { pattern, .. }) => assert_eq!(pattern, "videos-*.txt"),
            other => panic!("expected NoInputFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn discover_in_missing_directory_is_no_input_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let source = LinkListSource::new(&missing, "videos-*.txt").unwrap();
        match source.discover().await {
            Err(Error::NoInputFound { dir, .. }) => assert_eq!(dir, missing),
            other => panic!("expected NoInputFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_derives_subdirectory_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos-demo.txt");
        std::fs::write(&path, "https://example/a\n\nhttps://example/b\n").unwrap();

        let source = LinkListSource::new(dir.path(), "videos-*.txt").unwrap();
        let list = source.load(&path).await.unwrap();

        assert_eq!(list.name, "videos-demo.txt");
        assert_eq!(list.subdirectory, "demo");
        assert_eq!(list.links, vec!["https://example/a", "https://example/b"]);
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn load_of_whitespace_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos-empty.txt");
        std::fs::write(&path, "\n  \n\t\n").unwrap();

        let source = LinkListSource::new(dir.path(), "videos-*.txt").unwrap();
        let list = source.load(&path).await.unwrap();
        assert!(list.is_empty());
    }
}
