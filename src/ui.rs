// UI layer: fills in whatever the command line left open with `dialoguer`
// prompts, then uploads the files one by one behind an `indicatif` spinner.

use crate::api::UploadClient;
use crate::classify::classify;
use crate::notify::NotificationSink;
use crate::report::Reporter;
use crate::request::{Expiration, UploadRequest, Variant};
use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// What the command line already decided.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub interactive: bool,
    pub litterbox: bool,
    pub expire: Option<String>,
    pub files: Vec<PathBuf>,
}

/// A fully decided batch: every value validated, nothing left to ask.
#[derive(Debug, Clone)]
pub struct Plan {
    pub variant: Variant,
    pub expiration: Expiration,
    pub files: Vec<PathBuf>,
}

impl Plan {
    /// Resolve `options` into a plan, prompting for missing answers in
    /// interactive mode. Expiration is validated here, before any upload.
    pub fn resolve(options: Options) -> Result<Self> {
        let litterbox = if options.litterbox || !options.interactive {
            options.litterbox
        } else {
            Confirm::new()
                .with_prompt("Do you want to upload to Litterbox?")
                .default(false)
                .interact()
                .context("Reading upload target")?
        };
        let variant = if litterbox { Variant::Ephemeral } else { Variant::Standard };

        let expiration = match variant {
            Variant::Standard => Expiration::NONE,
            Variant::Ephemeral => {
                let raw = match options.expire {
                    Some(raw) => raw,
                    None if options.interactive => Input::<String>::new()
                        .with_prompt("Expiration time in hours")
                        .allow_empty(true)
                        .interact_text()
                        .context("Reading expiration time")?,
                    None => String::new(),
                };
                raw.parse::<Expiration>()?
            }
        };

        let files = if !options.files.is_empty() {
            options.files
        } else if options.interactive {
            let path: String = Input::new()
                .with_prompt("Input a file path")
                .interact_text()
                .context("Reading file path")?;
            vec![PathBuf::from(path)]
        } else {
            bail!("No files given");
        };

        Ok(Plan {
            variant,
            expiration,
            files,
        })
    }
}

/// Upload every file of `plan` in order and report each outcome. Returns the
/// number of files that failed.
pub fn upload_all<N: NotificationSink>(
    client: &UploadClient,
    reporter: &Reporter<N>,
    plan: &Plan,
    account_token: Option<&str>,
) -> usize {
    let mut failures = 0;
    for path in &plan.files {
        let request = UploadRequest::new(path, plan.variant)
            .with_expiration(plan.expiration)
            .with_account_token(account_token.map(str::to_owned));

        let spinner = spinner(format!("Uploading {}...", request.file_name()));
        let outcome = client.upload(&request);
        spinner.finish_and_clear();

        let uploaded = match outcome {
            Ok(raw) => reporter.inform(classify(&raw, plan.variant), plan.variant),
            Err(err) => {
                reporter.upload_error(&err);
                false
            }
        };
        if !uploaded {
            failures += 1;
        }
    }
    failures
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;

    #[test]
    fn non_interactive_defaults_to_catbox() {
        let plan = Plan::resolve(Options {
            files: vec!["a.txt".into()],
            expire: Some("12".into()),
            ..Options::default()
        })
        .unwrap();
        assert_eq!(plan.variant, Variant::Standard);
        assert_eq!(plan.expiration, Expiration::NONE);
    }

    #[test]
    fn non_interactive_litterbox_validates_expiration() {
        let plan = Plan::resolve(Options {
            litterbox: true,
            expire: Some("72".into()),
            files: vec!["a.txt".into()],
            ..Options::default()
        })
        .unwrap();
        assert_eq!(plan.variant, Variant::Ephemeral);
        assert_eq!(plan.expiration.hours(), 72);

        let err = Plan::resolve(Options {
            litterbox: true,
            expire: Some("48".into()),
            files: vec!["a.txt".into()],
            ..Options::default()
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UploadError>(),
            Some(UploadError::InvalidExpiration(hours)) if hours == "48"
        ));
    }

    #[test]
    fn non_interactive_needs_files() {
        assert!(Plan::resolve(Options::default()).is_err());
    }
}
