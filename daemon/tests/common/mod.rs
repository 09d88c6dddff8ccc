//! Shared fixtures: a fake procfs on disk, an in-memory collector and a
//! dispatcher that records instead of acting.

#![allow(dead_code)]

use memguard_daemon::collector::{LinuxProcessCollector, ProcessCollector, ProcessIdentity};
use memguard_daemon::error::{ActionError, CollectError, SampleError};
use memguard_daemon::executor::ActionDispatcher;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn rollup(pss_kb: u64) -> String {
    format!(
        "00400000-7fffd000 ---p 00000000 00:00 0 [rollup]\n\
         Rss:            {} kB\n\
         Pss:            {} kB\n\
         Pss_Anon:       {} kB\n",
        pss_kb * 2,
        pss_kb,
        pss_kb / 2
    )
}

pub struct FakeProc {
    dir: TempDir,
}

impl FakeProc {
    pub fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn collector(&self) -> LinuxProcessCollector {
        LinuxProcessCollector::with_root(self.root())
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        let dir = self.root().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes cmdline (NUL-terminated args), comm and smaps_rollup.
    pub fn add_process(&self, pid: u32, argv: &[&str], comm: &str, pss_kb: u64) {
        let mut cmdline = Vec::new();
        for arg in argv {
            cmdline.extend_from_slice(arg.as_bytes());
            cmdline.push(0);
        }
        self.add_raw(pid, &cmdline, &format!("{}\n", comm), Some(&rollup(pss_kb)));
    }

    pub fn add_raw(&self, pid: u32, cmdline: &[u8], comm: &str, smaps_rollup: Option<&str>) {
        let dir = self.pid_dir(pid);
        fs::write(dir.join("cmdline"), cmdline).unwrap();
        fs::write(dir.join("comm"), comm).unwrap();
        if let Some(report) = smaps_rollup {
            fs::write(dir.join("smaps_rollup"), report).unwrap();
        }
    }

    pub fn set_children(&self, pid: u32, children: &[u32]) {
        let task = self.pid_dir(pid).join("task").join(pid.to_string());
        fs::create_dir_all(&task).unwrap();
        let list: Vec<String> = children.iter().map(|c| c.to_string()).collect();
        fs::write(task.join("children"), format!("{} ", list.join(" "))).unwrap();
    }
}

/// Process table held in memory. While `failures` is non-zero each
/// listing fails and decrements it; `listings` counts every attempt.
#[derive(Default)]
pub struct MapCollector {
    pub order: Vec<u32>,
    pub identities: HashMap<u32, ProcessIdentity>,
    pub memory: HashMap<u32, u64>,
    pub children: HashMap<u32, Vec<u32>>,
    pub failures: Arc<AtomicUsize>,
    pub listings: Arc<AtomicUsize>,
}

impl MapCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_listings(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_memory(mut self, pid: u32, kb: u64) -> Self {
        self.memory.insert(pid, kb);
        self
    }

    pub fn with_children(mut self, pid: u32, children: &[u32]) -> Self {
        self.children.insert(pid, children.to_vec());
        self
    }

    /// `command_line` is the raw key: NUL between arguments.
    pub fn with_process(mut self, pid: u32, command_line: &str, name: &str, kb: u64) -> Self {
        self.order.push(pid);
        self.identities.insert(
            pid,
            ProcessIdentity {
                pid,
                cmdline: command_line.to_string(),
                name: name.to_string(),
            },
        );
        self.memory.insert(pid, kb);
        self
    }
}

impl ProcessCollector for MapCollector {
    fn list_pids(&self) -> Result<Vec<u32>, CollectError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CollectError::ProcTable {
                path: PathBuf::from("/proc"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(self.order.clone())
    }

    fn read_identity(&self, pid: u32) -> Option<ProcessIdentity> {
        self.identities.get(&pid).cloned()
    }

    fn sample_memory(&self, pid: u32) -> Result<u64, SampleError> {
        self.memory.get(&pid).copied().ok_or(SampleError::NotFound { pid })
    }

    fn children(&self, pid: u32) -> Vec<u32> {
        self.children.get(&pid).cloned().unwrap_or_default()
    }
}

/// Clones share the recorded calls, so a test keeps one handle and gives
/// the other to the monitor.
#[derive(Default, Clone)]
pub struct RecordingDispatcher {
    pub notifications: Arc<Mutex<Vec<(String, String)>>>,
    pub kills: Arc<Mutex<Vec<u32>>>,
    pub fail_notify: bool,
    pub fail_kill: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self { fail_notify: true, fail_kill: true, ..Default::default() }
    }

    pub fn kills(&self) -> Vec<u32> {
        self.kills.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn notify(&self, summary: &str, body: &str) -> Result<(), ActionError> {
        self.notifications
            .lock()
            .unwrap()
            .push((summary.to_string(), body.to_string()));
        if self.fail_notify {
            return Err(ActionError::Notify("no notification daemon".into()));
        }
        Ok(())
    }

    fn terminate(&self, pid: u32) -> Result<(), ActionError> {
        self.kills.lock().unwrap().push(pid);
        if self.fail_kill {
            return Err(ActionError::Signal { pid, source: io::Error::from_raw_os_error(libc::ESRCH) });
        }
        Ok(())
    }
}
