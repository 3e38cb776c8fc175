//! Run logger
//!
//! Severity-prefixed lines mirrored to the console (colored) and to a
//! timestamped file under the log directory. File I/O failures degrade to
//! console-only output; logging never aborts a run.

use chrono::Local;
use colored::Colorize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Log severity, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn label(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

pub struct RunLogger {
    file: Option<Mutex<File>>,
    path: Option<PathBuf>,
}

impl RunLogger {
    /// Open a new log file under `dir` named by the current timestamp
    pub fn new(dir: &Path) -> Self {
        let path = dir.join(format!("run-{}.log", Local::now().format("%Y%m%d-%H%M%S")));
        let file = std::fs::create_dir_all(dir)
            .ok()
            .and_then(|_| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .ok()
            })
            .map(Mutex::new);

        if file.is_none() {
            eprintln!(
                "{} Could not open log file in {}, logging to console only",
                "⚠️".yellow(),
                dir.display()
            );
        }

        Self {
            path: file.as_ref().map(|_| path),
            file,
        }
    }

    /// Console-only logger
    pub fn console_only() -> Self {
        Self {
            file: None,
            path: None,
        }
    }

    /// Path of the open log file, if any
    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn debug(&self, message: &str) {
        self.write(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.write(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }

    fn write(&self, level: Level, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] {} {}", level.label(), timestamp, message);

        match level {
            Level::Debug => {
                log::debug!("{}", message);
                println!("{}", line.dimmed());
            }
            Level::Info => {
                log::info!("{}", message);
                println!("{}", line);
            }
            Level::Warn => {
                log::warn!("{}", message);
                println!("{}", line.yellow());
            }
            Level::Error => {
                log::error!("{}", message);
                eprintln!("{}", line.red());
            }
        }

        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                // Best effort: a full disk should not fail the test run
                let _ = writeln!(f, "{}", line);
            }
        }
    }
}
