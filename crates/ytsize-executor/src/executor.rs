//! Subprocess executor: invokes `yt-dlp`, enforces the timeout and output
//! cap, and returns parsed JSON metadata or a classified [`ExecutorError`].

use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::classifier::{classify_exit, classify_spawn_error};
use crate::config::SubprocessConfig;
use crate::error::ExecutorError;
use ytsize_core::CoreErrorCode;

/// Arguments for one `execute` call. Cookies, when present, are written
/// verbatim to a private temp file and passed to yt-dlp via `--cookies`.
pub struct ExecuteRequest<'a> {
    pub url: &'a str,
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub cookies: Option<&'a str>,
}

/// Parsed result of a successful invocation: the raw JSON document yt-dlp
/// wrote to stdout. Parsing into the size-computation caller's own type
/// happens outside this crate.
#[derive(Debug, Clone)]
pub struct ExecutorOutput {
    pub metadata_json: serde_json::Value,
}

/// Removes the cookie temp file on every exit path (success, failure,
/// timeout, panic), mirroring the process-group drop-guard idiom the
/// CLI-dispatch reference uses for its own child-process cleanup.
struct CookieFileGuard {
    path: Option<std::path::PathBuf>,
}

impl Drop for CookieFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    config: SubprocessConfig,
}

impl SubprocessExecutor {
    pub fn new(config: SubprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubprocessConfig {
        &self.config
    }

    /// Runs `yt-dlp -J --skip-download --no-playlist <url>`, optionally with
    /// `--cookies <path>`, under the given timeout and output cap.
    ///
    /// Re-validates the URL before building the command: the caller already
    /// checked it once at the HTTP edge, but this crate crosses a process
    /// boundary with it and does not trust that the caller is the only path
    /// that reaches `execute`.
    pub async fn execute(&self, req: ExecuteRequest<'_>) -> Result<ExecutorOutput, ExecutorError> {
        if let Err(err) = ytsize_core::validate_youtube_url(req.url) {
            return Err(ExecutorError::new(err.code(), err.to_string()));
        }

        let start = Instant::now();

        let cookie_guard = match req.cookies {
            Some(cookies) => Some(write_cookie_file(cookies).await?),
            None => None,
        };
        let cookie_path = cookie_guard.as_ref().and_then(|g| g.path.clone());

        let mut cmd = Command::new(&self.config.ytdlp_path);
        cmd.arg("-J")
            .arg("--skip-download")
            .arg("--no-playlist")
            .arg(req.url)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        if let Some(path) = &cookie_path {
            cmd.arg("--cookies").arg(path);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, ytdlp_path = %self.config.ytdlp_path, "failed to spawn yt-dlp");
                return Err(ExecutorError::new(
                    classify_spawn_error(&err),
                    format!("failed to spawn {}: {err}", self.config.ytdlp_path),
                ));
            }
        };

        let stdout_pipe = child.stdout.take().expect("stdout was piped");
        let stderr_pipe = child.stderr.take().expect("stderr was piped");

        // Read limit is one byte past the cap: the extra byte is what lets us
        // tell "wrote exactly max_output_bytes" from "wrote more".
        let read_limit = req.max_output_bytes as u64 + 1;

        let read_future = async {
            let stdout_handle = tokio::spawn(read_capped(stdout_pipe, read_limit));
            let stderr_handle = tokio::spawn(read_capped(stderr_pipe, read_limit));

            let stdout_buf = stdout_handle.await.unwrap_or_default();
            let stderr_buf = stderr_handle.await.unwrap_or_default();
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((stdout_buf, stderr_buf, status, child))
        };

        let (stdout, stderr_raw, status, mut child) = match tokio::time::timeout(req.timeout, read_future).await
        {
            Ok(Ok(data)) => data,
            Ok(Err(io_err)) => {
                return Err(ExecutorError::new(
                    CoreErrorCode::Unknown,
                    format!("failed to read yt-dlp output: {io_err}"),
                ));
            }
            Err(_elapsed) => {
                let elapsed_ms = start.elapsed().as_millis();
                #[cfg(feature = "tracing")]
                tracing::warn!(elapsed_ms, url = req.url, "yt-dlp invocation timed out");
                return Err(ExecutorError::new(
                    CoreErrorCode::Timeout,
                    format!("yt-dlp did not complete within {:?}", req.timeout),
                ));
            }
        };

        if stdout.len() > req.max_output_bytes || stderr_raw.len() > req.max_output_bytes {
            let _ = child.kill().await;
            return Err(ExecutorError::new(
                CoreErrorCode::Unknown,
                format!(
                    "yt-dlp output exceeded the {}-byte limit",
                    req.max_output_bytes
                ),
            ));
        }

        let stderr_text = String::from_utf8_lossy(&stderr_raw).to_string();
        let exit_code = status.code();

        if !status.success() {
            let code = classify_exit(exit_code, &stderr_text);
            #[cfg(feature = "tracing")]
            tracing::warn!(exit_code, code = %code, "yt-dlp exited with failure");
            return Err(ExecutorError::new(code, "yt-dlp exited with a non-zero status")
                .with_stderr(truncate_excerpt(&stderr_text)));
        }

        let metadata_json: serde_json::Value = serde_json::from_slice(&stdout).map_err(|err| {
            ExecutorError::new(
                CoreErrorCode::Unknown,
                format!("failed to parse yt-dlp JSON output: {err}"),
            )
        })?;

        Ok(ExecutorOutput { metadata_json })
    }
}

async fn read_capped<R>(pipe: R, read_limit: u64) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut capped = pipe.take(read_limit);
    let _ = capped.read_to_end(&mut buf).await;
    buf
}

fn truncate_excerpt(stderr: &str) -> String {
    const MAX_EXCERPT_BYTES: usize = 2048;
    if stderr.len() <= MAX_EXCERPT_BYTES {
        stderr.to_string()
    } else {
        let mut boundary = MAX_EXCERPT_BYTES;
        while boundary > 0 && !stderr.is_char_boundary(boundary) {
            boundary -= 1;
        }
        format!("{}…", &stderr[..boundary])
    }
}

async fn write_cookie_file(cookies: &str) -> Result<CookieFileGuard, ExecutorError> {
    let path = std::env::temp_dir().join(format!("ytsize-cookies-{}.txt", uuid_like_suffix()));

    tokio::fs::write(&path, cookies).await.map_err(|err| {
        ExecutorError::new(
            CoreErrorCode::Unknown,
            format!("failed to write cookie file: {err}"),
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        if let Err(err) = tokio::fs::set_permissions(&path, permissions).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ExecutorError::new(
                CoreErrorCode::Unknown,
                format!("failed to set cookie file permissions: {err}"),
            ));
        }
    }

    Ok(CookieFileGuard { path: Some(path) })
}

/// Cheap unique suffix for the cookie temp filename; collisions are
/// harmless (the write would simply overwrite a same-named, already-
/// consumed file) but we still want distinct names across concurrent tasks.
fn uuid_like_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let pid = std::process::id();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{pid}-{seq}")
}
