// Notification dispatch. The mechanism is picked per call from the detected
// platform; when nothing usable exists a single line goes to stderr instead.
// Nothing in here ever returns an error to the caller.

use crate::environment::{detect, HostProbe, Platform, Probe, CLIPBOARD_PROGRAM, NOTIFICATION_PROGRAM};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const UNAVAILABLE_MESSAGE: &str = "Error: Notifications unavailable!";

/// Why the generic backend could not show a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no notification bridge on this mobile host")]
    NoBridge,
    #[error(transparent)]
    Backend(#[from] notify_rust::error::Error),
}

/// What a `notify` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Shown through the desktop notification service.
    Shown,
    /// Handed to the native notifier command, which ran.
    Spawned,
    /// No mechanism available; a diagnostic went to stderr.
    Unavailable,
}

/// Anything that can put a notification in front of the user.
pub trait NotificationSink {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Delivery;
}

#[derive(Debug, Clone, Default)]
pub struct Notifier<P = HostProbe> {
    probe: P,
}

impl Notifier {
    pub fn new() -> Self {
        Notifier { probe: HostProbe }
    }
}

impl<P: Probe> Notifier<P> {
    pub fn with_probe(probe: P) -> Self {
        Notifier { probe }
    }

    pub fn notify(&self, title: &str, message: &str, timeout: Duration) -> Delivery {
        let platform = detect(&self.probe);
        debug!(?platform, title, "dispatching notification");

        match platform {
            Platform::Desktop | Platform::MobileBareOs => {
                match show_generic(platform, title, message, timeout) {
                    Ok(()) => Delivery::Shown,
                    Err(err) => {
                        debug!(error = %err, "generic notification backend failed");
                        unavailable()
                    }
                }
            }
            Platform::MobileWithNativeNotifier => {
                // Exit status is deliberately ignored.
                match native_command(title, message).status() {
                    Ok(_) => Delivery::Spawned,
                    Err(err) => {
                        warn!(error = %err, "could not run {}", NOTIFICATION_PROGRAM);
                        unavailable()
                    }
                }
            }
            Platform::MobileNoNotifier => unavailable(),
        }
    }
}

impl<P: Probe> NotificationSink for Notifier<P> {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Delivery {
        Notifier::notify(self, title, message, timeout)
    }
}

fn unavailable() -> Delivery {
    eprintln!("{}", UNAVAILABLE_MESSAGE);
    Delivery::Unavailable
}

fn show_generic(platform: Platform, title: &str, message: &str, timeout: Duration) -> Result<(), NotifyError> {
    if platform.is_mobile() {
        return Err(NotifyError::NoBridge);
    }
    let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
    notify_rust::Notification::new()
        .summary(title)
        .body(message)
        .timeout(notify_rust::Timeout::Milliseconds(millis))
        .show()?;
    Ok(())
}

/// `termux-notification` invocation with a "Copy" button that puts the
/// message on the clipboard.
pub(crate) fn native_command(title: &str, message: &str) -> Command {
    let mut command = Command::new(NOTIFICATION_PROGRAM);
    command
        .arg("--sound")
        .args(["-t", title])
        .args(["-c", message])
        .args(["--button1", "Copy"])
        .arg("--button1-action")
        .arg(format!("{} {}", CLIPBOARD_PROGRAM, message));
    command
}
