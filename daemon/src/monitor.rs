//! Enumerate, decide, act; once per interval

use crate::collector::{display_command_line, ProcessCollector};
use crate::config::Config;
use crate::detector::{Alert, Detector};
use crate::enumerator::enumerate;
use crate::error::CollectError;
use crate::executor::ActionDispatcher;
use crate::tree::aggregate_tree;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Counts from one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub applications: usize,
    pub processes: usize,
    pub alerts: Vec<Alert>,
    pub terminated: Vec<u32>,
    pub failed_actions: usize,
}

pub struct Monitor<C, D, A> {
    config: Arc<Config>,
    collector: C,
    detector: D,
    dispatcher: A,
}

impl<C, D, A> Monitor<C, D, A>
where
    C: ProcessCollector,
    D: Detector,
    A: ActionDispatcher,
{
    pub fn new(config: Arc<Config>, collector: C, detector: D, dispatcher: A) -> Self {
        Self { config, collector, detector, dispatcher }
    }

    /// One pass over the process table. Only a failure to list the table
    /// is returned; everything else is logged.
    pub fn run_cycle(&self) -> Result<CycleReport, CollectError> {
        let apps = enumerate(&self.collector, self.config.memory.identity)?;
        let mut report = CycleReport {
            applications: apps.len(),
            processes: apps.iter().map(|app| app.pids.len()).sum(),
            ..Default::default()
        };

        for alert in self.detector.evaluate(&apps) {
            let command_line = display_command_line(&alert.command_line);
            warn!(
                command_line = %command_line,
                pids = ?alert.pids,
                "ALERT: {} is using {} MB RAM (threshold {} MB)",
                alert.name,
                alert.usage_mb(),
                alert.threshold_mb
            );

            let body = self.alert_body(&alert, &command_line);
            if let Err(e) = self.dispatcher.notify(&self.config.general.notification_summary, &body) {
                warn!("{}", e);
                report.failed_actions += 1;
            }

            if let Some(pid) = alert.kill_pid {
                match self.dispatcher.terminate(pid) {
                    Ok(()) => {
                        info!(pid, command_line = %command_line, "killed process");
                        report.terminated.push(pid);
                    }
                    Err(e) => {
                        error!("{}", e);
                        report.failed_actions += 1;
                    }
                }
            }

            report.alerts.push(alert);
        }

        info!(
            applications = report.applications,
            processes = report.processes,
            alerts = report.alerts.len(),
            terminated = report.terminated.len(),
            "cycle complete"
        );
        Ok(report)
    }

    fn alert_body(&self, alert: &Alert, command_line: &str) -> String {
        let mut body = format!(
            "Application {} exceeded threshold {} MB. It consumes {} MB",
            command_line,
            alert.threshold_mb,
            alert.usage_mb()
        );
        if self.config.memory.report_process_tree {
            if let Some(&root) = alert.pids.first() {
                let tree_kb = aggregate_tree(&self.collector, root);
                body.push_str(&format!(" (process tree of PID {}: {} MB)", root, tree_kb / 1024));
            }
        }
        body
    }

    /// Runs cycles forever. Cycle starts are evenly spaced by the sample
    /// interval; a cycle that overruns delays the next start instead of
    /// overlapping it. A cycle that cannot list the process table is
    /// reported and the next one runs on schedule.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.sample_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.run_cycle() {
                error!("cycle skipped: {}", e);
            }
        }
    }
}
