// Response classification: the upload endpoint answers with plain text, which
// is either the share URL or some error fragment (often HTML). Only a full
// match on the expected URL shape counts as success.

use crate::error::UploadError;
use crate::request::Variant;
use regex::Regex;
use std::sync::LazyLock;

static STANDARD_URL: LazyLock<Regex> = LazyLock::new(|| share_url_pattern(Variant::Standard));
static EPHEMERAL_URL: LazyLock<Regex> = LazyLock::new(|| share_url_pattern(Variant::Ephemeral));

fn share_url_pattern(variant: Variant) -> Regex {
    let pattern = format!(
        r"^(https?://)?{}\.catbox\.moe/[A-Za-z0-9_]{{6}}(\.[A-Za-z0-9_]+)?$",
        variant.file_host()
    );
    Regex::new(&pattern).expect("share URL pattern is valid")
}

/// Outcome of one upload as judged from the server's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success { url: String },
    Failure { raw_response: String },
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }

    /// The share URL, or `UploadError::Rejected` carrying the server text.
    pub fn into_url(self, variant: Variant) -> Result<String, UploadError> {
        match self {
            UploadResult::Success { url } => Ok(url),
            UploadResult::Failure { raw_response } => Err(UploadError::Rejected {
                service: variant.service_name(),
                response: raw_response,
            }),
        }
    }
}

/// Classify the raw response text of an upload to `variant`.
pub fn classify(raw_response: &str, variant: Variant) -> UploadResult {
    let candidate = raw_response.trim_end();
    let pattern = match variant {
        Variant::Standard => &*STANDARD_URL,
        Variant::Ephemeral => &*EPHEMERAL_URL,
    };
    if pattern.is_match(candidate) {
        UploadResult::Success {
            url: candidate.to_string(),
        }
    } else {
        UploadResult::Failure {
            raw_response: raw_response.to_string(),
        }
    }
}
