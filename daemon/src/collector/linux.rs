use super::{ProcessCollector, ProcessIdentity, ARG_SEPARATOR};
use crate::error::{CollectError, SampleError};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::trace;

/// Label of the proportional set size line in `smaps_rollup`.
pub const PSS_LABEL: &str = "Pss:";

pub struct LinuxProcessCollector {
    root: PathBuf,
}

impl LinuxProcessCollector {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Reads a directory laid out like `/proc`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn proc_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }
}

impl Default for LinuxProcessCollector {
    fn default() -> Self { Self::new() }
}

impl ProcessCollector for LinuxProcessCollector {
    fn list_pids(&self) -> Result<Vec<u32>, CollectError> {
        let entries = fs::read_dir(&self.root).map_err(|source| CollectError::ProcTable {
            path: self.root.clone(),
            source,
        })?;

        let mut pids: Vec<u32> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn read_identity(&self, pid: u32) -> Option<ProcessIdentity> {
        let proc_dir = self.proc_dir(pid);

        let raw = fs::read(proc_dir.join("cmdline")).ok()?;
        let content = String::from_utf8_lossy(&raw);
        let cmdline = content.strip_suffix(ARG_SEPARATOR).unwrap_or(&content).to_string();
        if cmdline.is_empty() {
            trace!(pid, "empty cmdline, skipping");
            return None;
        }

        let comm = fs::read_to_string(proc_dir.join("comm")).ok()?;
        let name = comm.trim_end_matches('\n').to_string();
        if name.is_empty() {
            trace!(pid, "empty comm, skipping");
            return None;
        }

        Some(ProcessIdentity { pid, cmdline, name })
    }

    fn sample_memory(&self, pid: u32) -> Result<u64, SampleError> {
        let path = self.proc_dir(pid).join("smaps_rollup");
        let report = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SampleError::NotFound { pid },
            _ => SampleError::Io { pid, source },
        })?;
        parse_pss(pid, &report)
    }

    fn children(&self, pid: u32) -> Vec<u32> {
        let path = self
            .proc_dir(pid)
            .join("task")
            .join(pid.to_string())
            .join("children");
        match fs::read_to_string(&path) {
            Ok(content) => parse_children(&content),
            Err(e) => {
                trace!(pid, "no children list: {}", e);
                Vec::new()
            }
        }
    }
}

/// Extracts the `Pss:` value (kB) from an `smaps_rollup` style report.
pub fn parse_pss(pid: u32, report: &str) -> Result<u64, SampleError> {
    let line = report
        .lines()
        .find(|line| line.starts_with(PSS_LABEL))
        .ok_or_else(|| SampleError::Parse {
            pid,
            reason: format!("no {} line", PSS_LABEL),
        })?;

    let value = line.split_whitespace().nth(1).ok_or_else(|| SampleError::Parse {
        pid,
        reason: format!("unexpected format: {:?}", line),
    })?;

    value.parse::<u64>().map_err(|e| SampleError::Parse {
        pid,
        reason: format!("bad value {:?}: {}", value, e),
    })
}

/// Parses a whitespace separated pid list. Tokens that are not pids are dropped.
pub fn parse_children(content: &str) -> Vec<u32> {
    content
        .split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}
