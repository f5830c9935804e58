// Upload request model: which service to target, how long the file should
// live and who (optionally) owns it. Everything here is validated before a
// single byte goes over the network.

use crate::error::UploadError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which hosting endpoint receives the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Permanent upload to catbox.moe.
    Standard,
    /// Time-limited upload to litterbox.catbox.moe.
    Ephemeral,
}

impl Variant {
    /// Human-facing service name used in messages and notifications.
    pub fn service_name(self) -> &'static str {
        match self {
            Variant::Standard => "Catbox",
            Variant::Ephemeral => "Litterbox",
        }
    }

    /// Host label the share URLs of this variant live under.
    pub fn file_host(self) -> &'static str {
        match self {
            Variant::Standard => "files",
            Variant::Ephemeral => "litterbox",
        }
    }

    /// Path of the upload endpoint, relative to the service root.
    pub fn api_path(self) -> &'static str {
        match self {
            Variant::Standard => "user/api.php",
            Variant::Ephemeral => "resources/internals/api.php",
        }
    }
}

/// Lifetime of an ephemeral upload, in hours. Zero means "no expiration
/// field", letting the service apply its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expiration(u32);

impl Expiration {
    pub const ACCEPTED_HOURS: [u32; 5] = [0, 1, 12, 24, 72];

    pub const NONE: Expiration = Expiration(0);

    pub fn hours(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Every accepted value, smallest first.
    pub fn all() -> impl Iterator<Item = Expiration> {
        Self::ACCEPTED_HOURS.into_iter().map(Expiration)
    }
}

impl TryFrom<u32> for Expiration {
    type Error = UploadError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        if Self::ACCEPTED_HOURS.contains(&hours) {
            Ok(Expiration(hours))
        } else {
            Err(UploadError::InvalidExpiration(hours.to_string()))
        }
    }
}

impl FromStr for Expiration {
    type Err = UploadError;

    /// Parses user input; an empty string means no expiration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Expiration::NONE);
        }
        let hours: u32 = s
            .parse()
            .map_err(|_| UploadError::InvalidExpiration(s.to_string()))?;
        Expiration::try_from(hours)
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// A single file upload, ready to hand to `UploadClient::upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    path: PathBuf,
    variant: Variant,
    expiration: Expiration,
    account_token: Option<String>,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>, variant: Variant) -> Self {
        UploadRequest {
            path: path.into(),
            variant,
            expiration: Expiration::NONE,
            account_token: None,
        }
    }

    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Associate the upload with an account. Empty tokens are ignored.
    pub fn with_account_token(mut self, token: Option<String>) -> Self {
        self.account_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    pub fn account_token(&self) -> Option<&str> {
        self.account_token.as_deref()
    }

    /// Value of the `time` form field, present only for ephemeral uploads
    /// with an explicit lifetime.
    pub fn time_field(&self) -> Option<String> {
        match self.variant {
            Variant::Ephemeral if !self.expiration.is_none() => Some(self.expiration.to_string()),
            _ => None,
        }
    }

    /// Name sent as the multipart `filename`: the last path component.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
