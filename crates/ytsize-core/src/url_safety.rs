//! URL-safety contract enforced before a URL is allowed anywhere near the
//! subprocess boundary. Lives in the core crate (rather than only at the
//! HTTP edge) so `ytsize-executor` can re-check it right before the string
//! crosses the process boundary into `yt-dlp`'s argv.

use crate::error::CoreErrorCode;
use thiserror::Error;
use url::Url;

const MAX_URL_LENGTH: usize = 200;
const ALLOWED_HOSTS: &[&str] = &[
    "www.youtube.com",
    "youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];
const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '\\',
];

#[derive(Debug, Clone, Error)]
pub enum UrlValidationError {
    #[error("url exceeds the {MAX_URL_LENGTH}-byte limit")]
    TooLong,
    #[error("url contains a disallowed character")]
    DisallowedCharacter,
    #[error("url could not be parsed")]
    Unparseable,
    #[error("url scheme must be https")]
    WrongScheme,
    #[error("url host is not a recognized YouTube host")]
    DisallowedHost,
    #[error("url path traverses directories")]
    PathTraversal,
    #[error("url path is not a recognized video path")]
    DisallowedPath,
    #[error("url is missing the required v= query parameter")]
    MissingVideoId,
}

impl UrlValidationError {
    pub fn code(&self) -> CoreErrorCode {
        CoreErrorCode::InvalidUrl
    }
}

/// Validates that `raw` is a `https://` URL pointing at a recognized
/// YouTube host and a plausible video path, free of shell metacharacters
/// and directory traversal, before it is ever passed to a subprocess.
pub fn validate_youtube_url(raw: &str) -> Result<(), UrlValidationError> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }
    if raw.chars().any(|c| SHELL_METACHARACTERS.contains(&c)) {
        return Err(UrlValidationError::DisallowedCharacter);
    }
    if raw.contains("../") {
        return Err(UrlValidationError::PathTraversal);
    }

    let url = Url::parse(raw).map_err(|_| UrlValidationError::Unparseable)?;

    if url.scheme() != "https" {
        return Err(UrlValidationError::WrongScheme);
    }

    let host = url.host_str().ok_or(UrlValidationError::DisallowedHost)?;
    if !ALLOWED_HOSTS.contains(&host) {
        return Err(UrlValidationError::DisallowedHost);
    }

    let path = url.path();
    if host == "youtu.be" {
        return Ok(());
    }

    if !(path == "/watch" || path.starts_with("/watch/") || path.starts_with("/shorts/")) {
        return Err(UrlValidationError::DisallowedPath);
    }

    if path == "/watch" || path.starts_with("/watch/") {
        let has_video_id = url.query_pairs().any(|(key, value)| key == "v" && !value.is_empty());
        if !has_video_id {
            return Err(UrlValidationError::MissingVideoId);
        }
    }

    Ok(())
}
