use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, LevelFilter};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}] {m}{n}";

pub fn init_file_logging(log_dir: &Path, keep_log_files: usize) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create the log directory at {}", log_dir.display()))?;
    prune_old_logs(log_dir, keep_log_files.saturating_sub(1))?;

    let log_path = log_dir.join(format!("run-{}.log", Local::now().format("%Y%m%d-%H%M%S")));

    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&log_path)
        .with_context(|| format!("failed to create the log file at {}", log_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(LevelFilter::Info))
        .context("failed to build the logging configuration")?;

    log4rs::init_config(config).context("failed to initialize logging")?;

    let env_filter = std::env::var("PHOTO_RENAMER_LOG").unwrap_or_else(|_| "info".to_string());
    if let Ok(level) = env_filter.parse::<LevelFilter>() {
        log::set_max_level(level);
    }

    info!("logging to file: {}", log_path.display());
    Ok(log_path)
}

/// Run files carry their start time in the name; a plain sort is oldest
/// first.
fn prune_old_logs(log_dir: &Path, keep: usize) -> Result<()> {
    let mut logs: Vec<PathBuf> = fs::read_dir(log_dir)
        .with_context(|| format!("failed to list the log directory at {}", log_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "log").unwrap_or(false))
        .collect();
    if logs.len() <= keep {
        return Ok(());
    }

    logs.sort();
    let excess = logs.len() - keep;
    for path in logs.drain(..excess) {
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove the old log file at {}", path.display()))?;
    }
    Ok(())
}
