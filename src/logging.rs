use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use crate::config::LogConfig;

/// Sends tracing output to the log file; stdout belongs to the terminal UI.
pub fn init(config: &LogConfig) -> Result<(), Box<dyn Error>> {
    let level = config.level()?;
    let path = config.file_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
