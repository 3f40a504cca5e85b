use std::io::Write;
use std::process::Command;

use gosleep_core::{Alert, AlertSink, CoreError, NotificationsConfig};

/// Prints alerts to stderr and optionally hands them to an external
/// notifier such as `notify-send`.
pub struct TerminalAlertSink {
    config: NotificationsConfig,
}

impl TerminalAlertSink {
    pub fn new(config: NotificationsConfig) -> Self {
        Self { config }
    }
}

impl AlertSink for TerminalAlertSink {
    fn raise(&mut self, alert: &Alert) -> gosleep_core::error::Result<()> {
        if !self.config.enabled {
            tracing::debug!(zone = %alert.zone, "notifications disabled, alert dropped");
            return Ok(());
        }

        let mut stderr = std::io::stderr().lock();
        if self.config.bell {
            write!(stderr, "\x07")?;
        }
        writeln!(
            stderr,
            "[{}] {}: {}",
            alert.zone.as_str().to_uppercase(),
            alert.title,
            alert.message
        )?;

        if let Some(program) = &self.config.command {
            let status = Command::new(program)
                .arg(&alert.title)
                .arg(&alert.message)
                .status()?;
            if !status.success() {
                return Err(CoreError::Custom(format!(
                    "notification command '{program}' exited with {status}"
                )));
            }
        }
        Ok(())
    }
}
