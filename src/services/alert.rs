use crate::error::AlertDeliveryError;
use crate::models::config::AlertSettings;
use async_trait::async_trait;
use std::io::Write;
use tokio::process::Command;

/// One alert raised by the monitor
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub outcome: String,
    pub message: String,
}

impl Alert {
    pub fn for_outcome(title: &str, outcome: &str) -> Self {
        Self {
            title: title.to_string(),
            outcome: outcome.to_string(),
            message: format!("Detected: {}", outcome),
        }
    }
}

/// Delivers alerts to the user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), AlertDeliveryError>;
}

/// Logs the alert, rings the terminal bell and runs an optional command
pub struct DesktopNotifier {
    bell: bool,
    command: Option<Vec<String>>,
}

impl DesktopNotifier {
    pub fn new(settings: &AlertSettings) -> Self {
        Self {
            bell: settings.bell,
            command: settings.command.clone(),
        }
    }

    fn ring_bell() -> Result<(), AlertDeliveryError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(AlertDeliveryError::Bell)
    }

    /// Spawn the alert command. Its exit status is checked in the background
    /// so a blocking dialog does not stall the monitor.
    fn run_command(&self, argv: &[String], alert: &Alert) -> Result<(), AlertDeliveryError> {
        let argv = substitute(argv, alert);
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };

        let mut child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|source| AlertDeliveryError::Spawn {
                command: program.clone(),
                source,
            })?;

        let program = program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    let e = AlertDeliveryError::Exit {
                        command: program,
                        status: status.to_string(),
                    };
                    tracing::warn!(phase = "alert", error = %e, "Alert command failed");
                }
                Err(e) => {
                    tracing::warn!(
                        phase = "alert",
                        command = %program,
                        error = %e,
                        "Failed to wait for alert command"
                    );
                }
            }
        });

        Ok(())
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), AlertDeliveryError> {
        tracing::info!(outcome = %alert.outcome, "{}: {}", alert.title, alert.message);

        // Try every channel; report the first failure
        let mut first_error = None;

        if self.bell {
            if let Err(e) = Self::ring_bell() {
                first_error.get_or_insert(e);
            }
        }

        if let Some(argv) = &self.command {
            if let Err(e) = self.run_command(argv, alert) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Replace `{title}`, `{message}` and `{outcome}` in each argument
fn substitute(argv: &[String], alert: &Alert) -> Vec<String> {
    argv.iter()
        .map(|arg| {
            arg.replace("{title}", &alert.title)
                .replace("{message}", &alert.message)
                .replace("{outcome}", &alert.outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(command: Option<Vec<&str>>) -> AlertSettings {
        AlertSettings {
            title: "Craft".to_string(),
            bell: false,
            command: command.map(|c| c.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn test_alert_message() {
        let alert = Alert::for_outcome("PathOfOCR: Desired Craft", "Exalted Orb");
        assert_eq!(alert.message, "Detected: Exalted Orb");
        assert_eq!(alert.outcome, "Exalted Orb");
    }

    #[test]
    fn test_substitute_placeholders() {
        let alert = Alert::for_outcome("Craft", "Divine Orb");
        let argv = vec![
            "notify-send".to_string(),
            "{title}".to_string(),
            "{message} ({outcome})".to_string(),
        ];
        assert_eq!(
            substitute(&argv, &alert),
            vec!["notify-send", "Craft", "Detected: Divine Orb (Divine Orb)"]
        );
    }

    #[tokio::test]
    async fn test_notify_without_channels_succeeds() {
        let notifier = DesktopNotifier::new(&settings(None));
        let alert = Alert::for_outcome("Craft", "Chaos Orb");
        assert!(notifier.notify(&alert).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_command_is_delivery_error() {
        let notifier = DesktopNotifier::new(&settings(Some(vec![
            "/nonexistent/craft-monitor/notify",
            "{message}",
        ])));
        let alert = Alert::for_outcome("Craft", "Chaos Orb");
        assert!(matches!(
            notifier.notify(&alert).await,
            Err(AlertDeliveryError::Spawn { .. })
        ));
    }
}
