//! Configuration for the subprocess executor, sourced from `YTDLP_*` environment
//! variables at startup.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SubprocessConfig {
    /// Path to the `yt-dlp` executable, or bare `"yt-dlp"` to resolve via `PATH`.
    pub ytdlp_path: String,
    /// Default subprocess timeout, before the worker pool's `TASK_BUFFER` is added.
    pub default_timeout: Duration,
    /// Maximum bytes read from stdout before the child is killed.
    pub max_output_bytes: usize,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            default_timeout: Duration::from_secs(30),
            max_output_bytes: 10 * 1024 * 1024,
        }
    }
}

impl SubprocessConfig {
    pub fn builder() -> SubprocessConfigBuilder {
        SubprocessConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubprocessConfigBuilder {
    config: SubprocessConfig,
}

impl SubprocessConfigBuilder {
    pub fn ytdlp_path(mut self, path: impl Into<String>) -> Self {
        self.config.ytdlp_path = path.into();
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.config.max_output_bytes = bytes;
        self
    }

    pub fn build(self) -> SubprocessConfig {
        self.config
    }
}
