//! Logger initialization for the jobsync binaries.
//!
//! Logs go to stderr and are appended to `./jobsync.log`; stdout is kept for
//! the run narrative.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_FILENAME: &str = "jobsync.log";

/// Installs the stderr logger and the `./jobsync.log` file logger.
///
/// The file is opened in append mode so scheduled runs keep their history. If
/// it cannot be opened, logging continues on stderr alone.
pub fn initialize() {
    let _ = CombinedLogger::init(build_loggers(Path::new(LOG_FILENAME)));
}

fn build_loggers(log_path: &Path) -> Vec<Box<dyn SharedLogger>> {
    let level = LevelFilter::Info;
    let config = build_config();

    let mut loggers = vec![terminal_logger(level, config.clone())];
    if let Some(file_logger) = create_file_logger(log_path, level, config) {
        loggers.push(file_logger);
    }
    loggers
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    // Stderr only, so log lines never interleave with the narrative on stdout.
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn create_file_logger(
    log_path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    let file = File::options().create(true).append(true).open(log_path);
    match file {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", log_path, err);
            None
        }
    }
}
