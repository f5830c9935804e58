// Error types shared by the upload pipeline. The CLI layer wraps these in
// `anyhow` and downcasts back to `UploadError` when it needs the detail.

use reqwest::header::InvalidHeaderValue;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File \"{}\" not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("\"{}\" is a directory", .0.display())]
    IsDirectory(PathBuf),

    #[error("Could not read \"{}\"", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bootstrap response carried no usable `PHPSESSID` cookie. Holds the
    /// raw `Set-Cookie` text for diagnostics.
    #[error("No PHPSESSID cookie found in \"{0}\"")]
    Session(String),

    #[error("Invalid expiration time \"{0}\"")]
    InvalidExpiration(String),

    /// The service answered with something that is not a share URL.
    #[error("Upload to {service} unsuccessful")]
    Rejected {
        service: &'static str,
        response: String,
    },

    #[error("Invalid value for header {name}")]
    Header {
        name: &'static str,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl UploadError {
    /// Second line shown under the error title, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            UploadError::Rejected { response, .. } => Some(format!("Server response: {}", response)),
            UploadError::FileUnreadable { source, .. } => Some(source.to_string()),
            UploadError::Header { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}
