//! Single classifier translating a finished subprocess invocation into a
//! [`CoreErrorCode`]. Nothing downstream re-derives a code from stderr text;
//! every other layer
//! pattern-matches on what this module produces.

use ytsize_core::CoreErrorCode;

/// Substrings that identify a rate-limited response from yt-dlp/YouTube.
const RATE_LIMIT_PATTERNS: &[&str] = &["http 429", "too many requests"];

/// Substrings that identify a video the upstream will never serve.
const VIDEO_UNAVAILABLE_PATTERNS: &[&str] = &[
    "private video",
    "video unavailable",
    "video is unavailable",
    "not available in your country",
    "this video is not available",
    "age-restricted",
    "sign in to confirm your age",
    "members-only",
];

/// Substrings that identify a transient network failure surfaced by the
/// subprocess rather than a yt-dlp/YouTube-level rejection.
const NETWORK_ERROR_PATTERNS: &[&str] = &[
    "connection reset",
    "connection refused",
    "connection timed out",
    "temporary failure in name resolution",
    "network is unreachable",
];

/// Classifies a completed (non-timeout, non-spawn-failure) subprocess
/// invocation by exit status and stderr content. Spawn failures (executable
/// missing) and deadline kills are classified directly by their callers,
/// which already know the precise cause without needing stderr heuristics.
pub fn classify_exit(exit_code: Option<i32>, stderr: &str) -> CoreErrorCode {
    let haystack = stderr.to_ascii_lowercase();

    if RATE_LIMIT_PATTERNS.iter().any(|p| haystack.contains(p)) {
        return CoreErrorCode::RateLimited;
    }
    if VIDEO_UNAVAILABLE_PATTERNS.iter().any(|p| haystack.contains(p)) {
        return CoreErrorCode::VideoUnavailable;
    }
    if NETWORK_ERROR_PATTERNS.iter().any(|p| haystack.contains(p)) {
        return CoreErrorCode::NetworkError;
    }

    match exit_code {
        Some(0) => CoreErrorCode::Unknown,
        _ => CoreErrorCode::Unknown,
    }
}

/// Classifies a failure to spawn the child process at all. A `NotFound` I/O
/// error kind means the executable could not be located; anything else is
/// folded into `Unknown` rather than guessed at.
pub fn classify_spawn_error(error: &std::io::Error) -> CoreErrorCode {
    match error.kind() {
        std::io::ErrorKind::NotFound => CoreErrorCode::NotFound,
        _ => CoreErrorCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_stderr_is_classified() {
        assert_eq!(
            classify_exit(Some(1), "ERROR: HTTP Error 429: Too Many Requests"),
            CoreErrorCode::RateLimited
        );
        assert_eq!(
            classify_exit(Some(1), "too many requests from this IP"),
            CoreErrorCode::RateLimited
        );
    }

    #[test]
    fn video_unavailable_patterns_are_classified() {
        assert_eq!(
            classify_exit(Some(1), "ERROR: Private video. Sign in if you've been invited."),
            CoreErrorCode::VideoUnavailable
        );
        assert_eq!(
            classify_exit(Some(1), "ERROR: Video unavailable. This video is not available"),
            CoreErrorCode::VideoUnavailable
        );
    }

    #[test]
    fn network_errors_are_classified() {
        assert_eq!(
            classify_exit(Some(1), "urlopen error [Errno 104] Connection reset by peer"),
            CoreErrorCode::NetworkError
        );
    }

    #[test]
    fn unrecognized_stderr_is_unknown() {
        assert_eq!(
            classify_exit(Some(1), "some unrelated failure"),
            CoreErrorCode::Unknown
        );
    }

    #[test]
    fn spawn_not_found_maps_to_not_found_code() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert_eq!(classify_spawn_error(&err), CoreErrorCode::NotFound);
    }

    #[test]
    fn other_spawn_errors_are_unknown() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(classify_spawn_error(&err), CoreErrorCode::Unknown);
    }
}
