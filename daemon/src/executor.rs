//! Side effects decided by the detector (notify, kill)

use crate::error::ActionError;
use crate::notifier::Notifier;
use std::io;

pub trait ActionDispatcher: Send + Sync {
    fn notify(&self, summary: &str, body: &str) -> Result<(), ActionError>;
    fn terminate(&self, pid: u32) -> Result<(), ActionError>;
}

/// Sends SIGKILL to `pid`.
pub fn kill_process(pid: u32) -> Result<(), ActionError> {
    let pid_t = libc::pid_t::try_from(pid).map_err(|_| ActionError::Signal {
        pid,
        source: io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"),
    })?;
    // pid 0 and negative values address process groups
    if pid_t <= 0 {
        return Err(ActionError::Signal {
            pid,
            source: io::Error::new(io::ErrorKind::InvalidInput, "refusing to signal a process group"),
        });
    }
    let result = unsafe { libc::kill(pid_t, libc::SIGKILL) };
    if result != 0 {
        return Err(ActionError::Signal { pid, source: io::Error::last_os_error() });
    }
    Ok(())
}

/// Desktop notifications plus real signal delivery.
pub struct SystemDispatcher {
    notifier: Notifier,
}

impl SystemDispatcher {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }
}

impl ActionDispatcher for SystemDispatcher {
    fn notify(&self, summary: &str, body: &str) -> Result<(), ActionError> {
        self.notifier.send(summary, body)
    }

    fn terminate(&self, pid: u32) -> Result<(), ActionError> {
        kill_process(pid)
    }
}
