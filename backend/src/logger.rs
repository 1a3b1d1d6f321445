use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;

/// How many rotated log.<timestamp>.txt files are kept.
const KEEP_LOG_FILES: usize = 5;

/// Log levels representing increasing verbosity.
///
/// Setting a level enables that level and all less verbose levels below it:
/// `Info` logs Info, Warn and Error, `Silent` logs nothing.
///
/// The level is read from the `LOG_LEVEL` environment variable, default Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "SILENT",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

/// Renames an existing log.txt to log.<mtime>.txt and removes all but the
/// newest rotated files.
fn rotate_log_files(log_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !log_file.try_exists().unwrap_or(false) {
        return Ok(());
    }

    let modified = std::fs::metadata(log_file)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    let parent = log_file.parent().ok_or("No parent directory")?;
    let new_path = parent.join(format!("log.{}.txt", datetime.format("%Y-%m-%dT%H-%M-%S")));
    std::fs::rename(log_file, &new_path)?;

    let mut rotated: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("log.") && n.ends_with(".txt") && n != "log.txt")
                .unwrap_or(false)
        })
        .collect();

    // Timestamped names sort chronologically
    rotated.sort();

    if rotated.len() > KEEP_LOG_FILES {
        for file in &rotated[0..rotated.len() - KEEP_LOG_FILES] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: Option<PathBuf>,
    level: Mutex<Level>,
}

impl Logger {
    /// Reads the configuration from the environment.
    ///
    /// The file log is written to `$CONCORDANCE_LOG_DIR/log.txt` only when
    /// that variable is set and `DISABLE_LOG` is not `true`.
    pub fn from_env() -> Self {
        let disable_log = std::env::var("DISABLE_LOG")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let log_file = match std::env::var("CONCORDANCE_LOG_DIR") {
            Ok(dir) if !disable_log && !dir.trim().is_empty() => {
                let dir = PathBuf::from(dir.trim());
                match std::fs::create_dir_all(&dir) {
                    Ok(_) => {
                        let p = dir.join("log.txt");
                        if let Err(e) = rotate_log_files(&p) {
                            eprintln!("Failed to rotate log files: {}", e);
                        }
                        Some(p)
                    }
                    Err(e) => {
                        eprintln!("Failed to create log directory {:?}: {}", dir, e);
                        None
                    }
                }
            }
            _ => None,
        };

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_name(&v))
            .unwrap_or(Level::Info);

        Logger {
            log_file,
            level: Mutex::new(level),
        }
    }

    pub fn get_level(&self) -> Level {
        self.level.lock().map(|l| *l).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, new_level: Level) {
        if let Ok(mut level) = self.level.lock() {
            *level = new_level;
        }
    }

    fn write_to_file(&self, message: &str) -> std::io::Result<()> {
        let Some(ref log_file) = self.log_file else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())
    }

    pub fn log(&self, level: Level, msg: &str) {
        if level == Level::Silent || self.get_level() < level {
            return;
        }

        match level {
            Level::Error => tracing::error!("{}", msg),
            Level::Warn => tracing::warn!("{}", msg),
            Level::Info => tracing::info!("{}", msg),
            Level::Debug => tracing::debug!("{}", msg),
            Level::Silent => {}
        }

        if let Err(e) = self.write_to_file(&format!("{}: {}", level.as_str(), msg)) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the console subscriber. RUST_LOG filters it, default `info`.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    f(LOGGER.get_or_init(Logger::from_env))
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.log(Level::Info, msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.log(Level::Warn, msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.log(Level::Debug, msg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_from_name() {
        assert_eq!(Level::from_name("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::from_name(" warn "), Some(Level::Warn));
        assert_eq!(Level::from_name("verbose"), None);
        assert!(Level::Error < Level::Info);
    }

    #[test]
    fn test_level_filters_file_output() {
        let dir = TempDir::new().unwrap();
        let logger = Logger {
            log_file: Some(dir.path().join("log.txt")),
            level: Mutex::new(Level::Warn),
        };

        logger.log(Level::Info, "not written");
        logger.log(Level::Warn, "written warning");
        logger.set_level(Level::Silent);
        logger.log(Level::Error, "not written either");

        let content = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert!(content.contains("WARN: written warning"));
        assert!(!content.contains("not written"));
    }

    #[test]
    fn test_rotate_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        for i in 0..7 {
            std::fs::write(dir.path().join(format!("log.2020-01-0{}T00-00-00.txt", i + 1)), "").unwrap();
        }
        let log_file = dir.path().join("log.txt");
        std::fs::write(&log_file, "current").unwrap();

        rotate_log_files(&log_file).unwrap();

        assert!(!log_file.exists());
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, KEEP_LOG_FILES);
        // The oldest ones were removed.
        assert!(!dir.path().join("log.2020-01-01T00-00-00.txt").exists());
    }
}
