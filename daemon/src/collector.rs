//! Process information collector (reads /proc on Linux)

mod linux;

pub use linux::{parse_children, parse_pss, LinuxProcessCollector, PSS_LABEL};

use crate::error::{CollectError, SampleError};

/// Separator between arguments in a raw command line.
pub const ARG_SEPARATOR: char = '\0';

/// Identity of a live process as read from the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    /// Raw NUL-separated argument vector with only the final terminator
    /// removed. Never empty.
    pub cmdline: String,
    /// Short display name (`comm`), trailing newline removed.
    pub name: String,
}

/// How a process's argument vector turns into its grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// The whole raw argument vector.
    #[default]
    CommandLine,
    /// First argument only.
    Executable,
}

impl ProcessIdentity {
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        self.cmdline.split(ARG_SEPARATOR)
    }

    /// Grouping key. Compared byte for byte, so different argument lists
    /// never share a key. Can be empty in `Executable` mode.
    pub fn command_line(&self, mode: IdentityMode) -> String {
        match mode {
            IdentityMode::CommandLine => self.cmdline.clone(),
            IdentityMode::Executable => self.argv().next().unwrap_or_default().to_string(),
        }
    }
}

/// Human-readable form of a grouping key: arguments joined by spaces.
pub fn display_command_line(command_line: &str) -> String {
    command_line.replace(ARG_SEPARATOR, " ")
}

/// One process measured during a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSample {
    pub pid: u32,
    pub command_line: String,
    pub name: String,
    pub pss_kb: u64,
}

pub trait ProcessCollector: Send + Sync {
    /// All pids currently in the process table, in enumeration order.
    fn list_pids(&self) -> Result<Vec<u32>, CollectError>;

    /// `None` when the process is gone, unreadable, or has an empty
    /// command line or name (kernel threads, zombies).
    fn read_identity(&self, pid: u32) -> Option<ProcessIdentity>;

    /// Proportional resident memory in kB.
    fn sample_memory(&self, pid: u32) -> Result<u64, SampleError>;

    /// Direct children of `pid`. Empty when unknown.
    fn children(&self, pid: u32) -> Vec<u32>;
}
