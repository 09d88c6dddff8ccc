//! Groups the live process table into logical applications

use crate::collector::{IdentityMode, ProcessCollector, ProcessSample};
use crate::error::CollectError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// One or more processes sharing an identical command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalApplication {
    pub command_line: String,
    /// Short name of the first process seen.
    pub name: String,
    /// Member pids in discovery order.
    pub pids: Vec<u32>,
    pub memory_kb: u64,
}

impl LogicalApplication {
    fn seeded(sample: ProcessSample) -> Self {
        Self {
            command_line: sample.command_line,
            name: sample.name,
            pids: vec![sample.pid],
            memory_kb: sample.pss_kb,
        }
    }

    pub fn memory_mb(&self) -> u64 {
        self.memory_kb / 1024
    }

    /// The pid a termination decision targets.
    pub fn primary_pid(&self) -> Option<u32> {
        self.pids.first().copied()
    }
}

/// Reads every process in the table and measures it. Processes whose
/// identity or memory cannot be read are skipped.
pub fn collect_samples<C: ProcessCollector + ?Sized>(
    collector: &C,
    mode: IdentityMode,
) -> Result<Vec<ProcessSample>, CollectError> {
    let pids = collector.list_pids()?;
    let mut samples = Vec::with_capacity(pids.len());

    for pid in pids {
        let Some(identity) = collector.read_identity(pid) else {
            continue;
        };
        let command_line = identity.command_line(mode);
        if command_line.is_empty() {
            trace!(pid, "empty command line, skipping");
            continue;
        }
        let pss_kb = match collector.sample_memory(pid) {
            Ok(kb) => kb,
            Err(e) => {
                trace!("skipping: {}", e);
                continue;
            }
        };
        samples.push(ProcessSample {
            pid,
            command_line,
            name: identity.name,
            pss_kb,
        });
    }

    Ok(samples)
}

/// Folds samples into applications keyed by exact command line.
/// Applications come out in order of their first member.
pub fn group_samples(samples: impl IntoIterator<Item = ProcessSample>) -> Vec<LogicalApplication> {
    let mut apps: Vec<LogicalApplication> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        match index.get(&sample.command_line) {
            Some(&i) => {
                let app = &mut apps[i];
                app.pids.push(sample.pid);
                app.memory_kb = app.memory_kb.saturating_add(sample.pss_kb);
            }
            None => {
                index.insert(sample.command_line.clone(), apps.len());
                apps.push(LogicalApplication::seeded(sample));
            }
        }
    }

    apps
}

/// Current set of logical applications. Fails only when the process
/// table itself cannot be listed.
pub fn enumerate<C: ProcessCollector + ?Sized>(
    collector: &C,
    mode: IdentityMode,
) -> Result<Vec<LogicalApplication>, CollectError> {
    let samples = collect_samples(collector, mode)?;
    let sampled = samples.len();
    let apps = group_samples(samples);
    debug!(processes = sampled, applications = apps.len(), "enumerated process table");
    Ok(apps)
}
