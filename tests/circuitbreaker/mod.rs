mod critical_fast_path;
mod half_open;
mod thresholds;

use ytsize_core::CoreErrorCode;

async fn fail(code: CoreErrorCode) -> Result<(), CoreErrorCode> {
    Err(code)
}

async fn succeed() -> Result<(), CoreErrorCode> {
    Ok(())
}

fn classify(code: &CoreErrorCode) -> CoreErrorCode {
    *code
}
