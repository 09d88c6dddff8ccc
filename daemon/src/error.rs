//! Error types shared across the watchdog

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read one process's proportional memory.
///
/// Every variant is soft: the enumerator skips the process and moves on.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("process {pid} no longer exists")]
    NotFound { pid: u32 },

    #[error("failed to read memory report for process {pid}: {source}")]
    Io {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("malformed memory report for process {pid}: {reason}")]
    Parse { pid: u32, reason: String },
}

/// Failure to list the process table. Aborts the current cycle only.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("cannot list process table at {path:?}: {source}")]
    ProcTable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Side-effect failures. Logged by the cycle, never escalated.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("notification failed: {0}")]
    Notify(String),

    #[error("failed to kill PID {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
