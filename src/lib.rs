// Library root
// -----------
// This crate exposes the upload machinery used by the `cat-tree` binary.
//
// Module responsibilities:
// - `request`: upload variant, expiration and the validated request type.
// - `multipart`: boundary generation and byte-exact form bodies.
// - `api`: the two-step HTTP exchange (session cookie, then upload).
// - `classify`: decides whether the server answered with a share URL.
// - `environment` / `notify`: platform detection and notification dispatch.
// - `config`: `.env` and environment loading.
// - `report` / `ui`: terminal output, prompts and the upload loop.
pub mod api;
pub mod classify;
pub mod config;
pub mod environment;
pub mod error;
pub mod multipart;
pub mod notify;
pub mod report;
pub mod request;
pub mod ui;

pub use api::{Endpoints, Session, UploadClient};
pub use classify::{classify, UploadResult};
pub use error::UploadError;
pub use request::{Expiration, UploadRequest, Variant};
