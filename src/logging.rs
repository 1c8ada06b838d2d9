use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `~/.local/share/analogsyncrs/logs/app.log`
    File,
    /// stderr via env_logger, filtered by `RUST_LOG`
    Stderr,
}

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("analogsyncrs")
        .join("logs"))
}

pub fn init_logger(target: LogTarget) -> Result<(), Error> {
    let mut setup_error = None;

    INIT.call_once(|| {
        let result = match target {
            LogTarget::File => init_file_logger(),
            LogTarget::Stderr => env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            )
            .try_init()
            .map_err(|e| Error::new(ErrorKind::Other, e)),
        };
        match result {
            Ok(()) => LOGGER_INITIALIZED.store(true, Ordering::SeqCst),
            Err(e) => setup_error = Some(e),
        }
    });

    if let Some(e) = setup_error {
        return Err(e);
    }
    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

fn init_file_logger() -> Result<(), Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .build();

    CombinedLogger::init(vec![WriteLogger::new(LevelFilter::Debug, config, log_file)])
        .map_err(|e| Error::new(ErrorKind::Other, e))
}
