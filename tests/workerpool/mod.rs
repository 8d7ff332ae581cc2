mod idle_decay;
mod queue_bounds;
mod recycling;

fn missing_executable() -> ytsize_executor::SubprocessExecutor {
    ytsize_executor::SubprocessExecutor::new(
        ytsize_executor::SubprocessConfig::builder()
            .ytdlp_path("/nonexistent/definitely-not-yt-dlp")
            .build(),
    )
}
