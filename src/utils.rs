//! Utility functions for file names and progress math

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

/// File name used when neither the headers nor the URL provide one
const FALLBACK_FILENAME: &str = "video.mp4";

/// Extract the canonical file name for a stream
///
/// Tries the Content-Disposition header first, then the last segment of the
/// URL path, then falls back to `video.mp4`. The result is passed through
/// [`sanitize_filename`] and keeps its extension.
///
/// # Examples
///
/// ```
/// use reqwest::header::HeaderMap;
/// use videos_dl::utils::canonical_filename;
///
/// let headers = HeaderMap::new();
/// assert_eq!(
///     canonical_filename(&headers, "https://example.com/media/Big%20Buck%20Bunny.mp4"),
///     "Big Buck Bunny.mp4"
/// );
/// ```
pub fn canonical_filename(headers: &HeaderMap, url: &str) -> String {
    if let Some(name) = filename_from_disposition(headers) {
        let name = sanitize_filename(&name);
        if !name.is_empty() {
            return name;
        }
    }

    if let Ok(parsed_url) = url::Url::parse(url)
        && let Some(mut segments) = parsed_url.path_segments()
        && let Some(last_segment) = segments.next_back()
        && !last_segment.is_empty()
    {
        let decoded = urlencoding::decode(last_segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| last_segment.to_string());
        let name = sanitize_filename(&decoded);
        if !name.is_empty() {
            return name;
        }
    }

    FALLBACK_FILENAME.to_string()
}

// Format: attachment; filename="file.mp4" or filename*=UTF-8''file.mp4
fn filename_from_disposition(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;

    let mut plain = None;
    for part in value.split(';') {
        let part = part.trim();
        if let Some(encoded) = part.strip_prefix("filename*=") {
            // RFC 5987 takes precedence over the plain form
            if let Some(idx) = encoded.rfind('\'')
                && let Ok(decoded) = urlencoding::decode(&encoded[idx + 1..])
            {
                return Some(decoded.into_owned());
            }
        } else if let Some(name) = part.strip_prefix("filename=") {
            plain = Some(name.trim_matches('"').to_string());
        }
    }
    plain
}

/// Make a file name safe to join onto a directory
///
/// Path separators, control characters and characters reserved on common
/// filesystems are removed; leading dots and surrounding whitespace are trimmed
/// so the name can never escape the target directory.
///
/// # Examples
///
/// ```
/// use videos_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize_filename("What? A \"video\".mp4"), "What A video.mp4");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !RESERVED.contains(c))
        .collect();

    cleaned.trim().trim_start_matches('.').trim().to_string()
}

/// Rounded percentage of a transfer that has completed
///
/// `percent = round((total - remaining) / total * 100)`, clamped to 0..=100.
/// An empty stream counts as complete.
#[must_use]
pub fn percent_complete(total: u64, remaining: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = total.saturating_sub(remaining) as f64;
    let percent = (done / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
