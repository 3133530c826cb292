use std::path::{Path, PathBuf};

use anyhow::Context;
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use once_cell::sync::OnceCell;

// Held for the life of the process; dropping the handle stops file output.
static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Start file logging under `NARRATOR_LOG_DIR` (default `logs/`). The level
/// comes from `RUST_LOG`, falling back to `info`. Later calls are no-ops.
pub fn init() -> anyhow::Result<()> {
    init_in(&log_dir())
}

pub fn init_in(log_dir: &Path) -> anyhow::Result<()> {
    LOGGER.get_or_try_init(|| -> anyhow::Result<LoggerHandle> {
        std::fs::create_dir_all(log_dir).with_context(|| {
            format!("unable to create log directory {}", log_dir.display())
        })?;
        let handle = Logger::try_with_env_or_str("info")?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename("narrator")
                    .suffix("log")
                    .suppress_timestamp(),
            )
            .rotate(
                Criterion::AgeOrSize(Age::Day, 5_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(5),
            )
            .duplicate_to_stderr(Duplicate::Info)
            .start()?;
        Ok(handle)
    })?;
    Ok(())
}

fn log_dir() -> PathBuf {
    std::env::var("NARRATOR_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"))
}
