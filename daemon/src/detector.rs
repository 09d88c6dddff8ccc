//! Memory threshold policy

use crate::config::{Config, KillTarget};
use crate::enumerator::LogicalApplication;
use std::collections::HashSet;

/// An application whose aggregated memory went over the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub command_line: String,
    pub name: String,
    pub pids: Vec<u32>,
    pub threshold_mb: u64,
    pub usage_kb: u64,
    /// Set when the command line is a kill target. Always the
    /// application's first pid.
    pub kill_pid: Option<u32>,
}

impl Alert {
    pub fn usage_mb(&self) -> u64 {
        self.usage_kb / 1024
    }
}

pub trait Detector: Send + Sync {
    fn check(&self, app: &LogicalApplication) -> Option<Alert>;

    fn evaluate(&self, apps: &[LogicalApplication]) -> Vec<Alert> {
        apps.iter().filter_map(|app| self.check(app)).collect()
    }
}

/// Stateless per-cycle decision: alert above `threshold_mb`, kill the
/// primary pid of listed command lines.
pub struct ThresholdDetector {
    threshold_mb: u64,
    kill_targets: HashSet<String>,
}

impl ThresholdDetector {
    pub fn new(threshold_mb: u64, kill_targets: impl IntoIterator<Item = KillTarget>) -> Self {
        Self {
            threshold_mb,
            kill_targets: kill_targets.into_iter().map(|t| t.identifier).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.memory.threshold_mb, config.kill_targets.iter().cloned())
    }

    pub fn is_kill_target(&self, command_line: &str) -> bool {
        self.kill_targets.contains(command_line)
    }

    fn threshold_kb(&self) -> u64 {
        self.threshold_mb.saturating_mul(1024)
    }
}

impl Detector for ThresholdDetector {
    fn check(&self, app: &LogicalApplication) -> Option<Alert> {
        if app.memory_kb <= self.threshold_kb() {
            return None;
        }
        let kill_pid = if self.is_kill_target(&app.command_line) {
            app.primary_pid()
        } else {
            None
        };
        Some(Alert {
            command_line: app.command_line.clone(),
            name: app.name.clone(),
            pids: app.pids.clone(),
            threshold_mb: self.threshold_mb,
            usage_kb: app.memory_kb,
            kill_pid,
        })
    }
}
