//! System notification sender

use crate::config::{GeneralConfig, NotificationMethod};
use crate::error::ActionError;
use notify_rust::Notification;
use std::process::Command;
use tracing::debug;

const APP_NAME: &str = "memguard";

pub struct Notifier {
    method: NotificationMethod,
    command: String,
}

impl Notifier {
    pub fn new(general: &GeneralConfig) -> Self {
        Self {
            method: general.notification_method,
            command: general.notification_command.clone(),
        }
    }

    pub fn send(&self, summary: &str, body: &str) -> Result<(), ActionError> {
        match self.method {
            NotificationMethod::Desktop => send_desktop(summary, body),
            NotificationMethod::Command => send_command(&self.command, summary, body),
            NotificationMethod::None => {
                debug!("notifications disabled: {} - {}", summary, body);
                Ok(())
            }
        }
    }
}

fn send_desktop(summary: &str, body: &str) -> Result<(), ActionError> {
    Notification::new()
        .summary(summary)
        .body(body)
        .appname(APP_NAME)
        .show()
        .map_err(|e| ActionError::Notify(e.to_string()))?;
    Ok(())
}

fn send_command(program: &str, summary: &str, body: &str) -> Result<(), ActionError> {
    let status = Command::new(program)
        .args([summary, body])
        .status()
        .map_err(|e| ActionError::Notify(format!("{}: {}", program, e)))?;
    if !status.success() {
        return Err(ActionError::Notify(format!("{} exited with {}", program, status)));
    }
    Ok(())
}
