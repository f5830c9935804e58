// User-facing reporting: URLs on stdout, errors on stderr, and a best-effort
// notification for both.

use crate::classify::UploadResult;
use crate::error::UploadError;
use crate::notify::{NotificationSink, Notifier};
use crate::request::Variant;
use std::time::Duration;

pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Reporter<N = Notifier> {
    notifier: Option<N>,
}

impl Reporter {
    /// `notifications = false` keeps output on the terminal only.
    pub fn new(notifications: bool) -> Self {
        Reporter {
            notifier: notifications.then(Notifier::new),
        }
    }
}

impl<N: NotificationSink> Reporter<N> {
    pub fn with_notifier(notifier: N) -> Self {
        Reporter {
            notifier: Some(notifier),
        }
    }

    /// Report a classified upload. Returns whether it succeeded.
    pub fn inform(&self, result: UploadResult, variant: Variant) -> bool {
        match result.into_url(variant) {
            Ok(url) => {
                self.success(variant, &url);
                true
            }
            Err(err) => {
                self.upload_error(&err);
                false
            }
        }
    }

    pub fn success(&self, variant: Variant, url: &str) {
        println!("{}", url);
        self.notify(&success_title(variant), url);
    }

    pub fn upload_error(&self, err: &UploadError) {
        self.error(&err.to_string(), err.detail().as_deref().unwrap_or_default());
    }

    pub fn error(&self, title: &str, message: &str) {
        self.notify(title, message);
        eprintln!("{}", error_text(title, message));
    }

    fn notify(&self, title: &str, message: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(title, message, NOTIFICATION_TIMEOUT);
        }
    }
}

pub fn success_title(variant: Variant) -> String {
    format!("Successfully uploaded to {}", variant.service_name())
}

/// `Error: <title>`, plus the message on its own line when there is one.
pub fn error_text(title: &str, message: &str) -> String {
    if message.is_empty() {
        format!("Error: {}", title)
    } else {
        format!("Error: {}\n{}", title, message)
    }
}
