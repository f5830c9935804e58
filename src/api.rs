// Upload session client: a small blocking HTTP client that talks to catbox
// and litterbox the way their web uploader does. One upload is two requests:
// a page load that hands out a PHPSESSID cookie, then the multipart POST.

use crate::error::UploadError;
use crate::multipart::{Boundary, MultipartBody};
use crate::request::{UploadRequest, Variant};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, COOKIE,
    DNT, ORIGIN, PRAGMA, REFERER, SET_COOKIE, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

pub const CATBOX_ROOT: &str = "https://catbox.moe";
pub const LITTERBOX_ROOT: &str = "https://litterbox.catbox.moe";

const FILE_FIELD: &str = "fileToUpload";
const FILE_CONTENT_TYPE: &str = "application/octet-stream";

// Header names reqwest has no constants for; lowercase as HeaderMap expects.
const SEC_GPC: &str = "sec-gpc";
const SEC_FETCH_DEST: &str = "sec-fetch-dest";
const SEC_FETCH_MODE: &str = "sec-fetch-mode";
const SEC_FETCH_SITE: &str = "sec-fetch-site";
const SEC_FETCH_USER: &str = "sec-fetch-user";
const PRIORITY: &str = "priority";
const X_REQUESTED_WITH: &str = "x-requested-with";

static SESSION_COOKIE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PHPSESSID=([0-9A-Za-z]+);").expect("session cookie pattern is valid"));

/// Service roots for both upload variants, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub standard: String,
    pub ephemeral: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            standard: CATBOX_ROOT.to_string(),
            ephemeral: LITTERBOX_ROOT.to_string(),
        }
    }
}

impl Endpoints {
    pub fn new(standard: impl Into<String>, ephemeral: impl Into<String>) -> Self {
        Endpoints {
            standard: standard.into().trim_end_matches('/').to_string(),
            ephemeral: ephemeral.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self, variant: Variant) -> &str {
        match variant {
            Variant::Standard => &self.standard,
            Variant::Ephemeral => &self.ephemeral,
        }
    }
}

/// Session cookie handed out by the bootstrap page load. Used for exactly
/// one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
}

impl Session {
    /// Pull `PHPSESSID` out of the `Set-Cookie` headers of a response.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, UploadError> {
        let values: Vec<String> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        values
            .iter()
            .find_map(|value| Session::parse(value))
            .ok_or_else(|| UploadError::Session(values.join("; ")))
    }

    /// Pull `PHPSESSID` out of a single `Set-Cookie` value.
    pub fn parse(set_cookie: &str) -> Option<Self> {
        SESSION_COOKIE.captures(set_cookie).map(|caps| Session {
            cookie: caps[1].to_string(),
        })
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    fn header_value(&self) -> Result<HeaderValue, UploadError> {
        header_value("cookie", format!("PHPSESSID={}", self.cookie))
    }
}

/// Blocking client for the upload protocol. Holds the reqwest client and the
/// service roots; every call to `upload` opens a new session.
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoints: Endpoints,
}

impl UploadClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, UploadError> {
        let client = Client::builder().build()?;
        Ok(UploadClient { client, endpoints })
    }

    /// Upload one file and return the service's answer verbatim. Whether the
    /// answer is a share URL is for `classify` to decide.
    pub fn upload(&self, request: &UploadRequest) -> Result<String, UploadError> {
        debug!(
            path = %request.path().display(),
            variant = ?request.variant(),
            expiration = %request.expiration(),
            "upload started"
        );

        let contents = read_file(request.path())?;
        let root = self.endpoints.root(request.variant());

        let mut headers = navigation_headers()?;
        let session = self.open_session(root, &headers)?;
        debug!(cookie = session.cookie(), "session established");

        let body = compose_body(request, contents, Boundary::generate());
        api_headers(&mut headers, root, &body)?;
        headers.insert(COOKIE, session.header_value()?);

        let url = format!("{}/{}", root, request.variant().api_path());
        let bytes = body.into_bytes();
        debug!(%url, size = bytes.len(), "posting upload");

        let res = self.client.post(&url).headers(headers).body(bytes).send()?;
        debug!(status = %res.status(), "upload answered");
        Ok(res.text()?)
    }

    fn open_session(&self, root: &str, headers: &HeaderMap) -> Result<Session, UploadError> {
        let res = self.client.get(root).headers(headers.clone()).send()?;
        Session::from_headers(res.headers())
    }
}

/// Build the form for `request` in the order the web uploader sends it.
pub fn compose_body(request: &UploadRequest, contents: Vec<u8>, boundary: Boundary) -> MultipartBody {
    let mut body = MultipartBody::new(boundary);
    if let Some(time) = request.time_field() {
        body = body.text("time", time);
    }
    body = body.text("reqtype", "fileupload");
    if let Some(token) = request.account_token() {
        body = body.text("userhash", token);
    }
    body.file(FILE_FIELD, request.file_name(), FILE_CONTENT_TYPE, contents)
}

fn read_file(path: &Path) -> Result<Vec<u8>, UploadError> {
    if path.is_dir() {
        return Err(UploadError::IsDirectory(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => UploadError::FileNotFound(path.to_path_buf()),
        _ => UploadError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })
}

pub fn user_agent() -> String {
    format!(
        "cat-tree/{} (Rust; {} {}) +{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        env!("CARGO_PKG_REPOSITORY"),
    )
}

/// Headers of a top-level page navigation in a desktop browser.
pub fn navigation_headers() -> Result<HeaderMap, UploadError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("user-agent", user_agent())?);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(SEC_GPC, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(SEC_FETCH_DEST, HeaderValue::from_static("document"));
    headers.insert(SEC_FETCH_MODE, HeaderValue::from_static("navigate"));
    headers.insert(SEC_FETCH_SITE, HeaderValue::from_static("none"));
    headers.insert(SEC_FETCH_USER, HeaderValue::from_static("?1"));
    headers.insert(PRIORITY, HeaderValue::from_static("u=0, i"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(headers)
}

/// Turn navigation headers into those of a same-origin XHR upload.
pub fn api_headers(headers: &mut HeaderMap, root: &str, body: &MultipartBody) -> Result<(), UploadError> {
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(REFERER, header_value("referer", root)?);
    headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(CONTENT_TYPE, header_value("content-type", body.content_type())?);
    headers.insert(ORIGIN, header_value("origin", root)?);
    headers.insert(SEC_FETCH_DEST, HeaderValue::from_static("empty"));
    headers.insert(SEC_FETCH_MODE, HeaderValue::from_static("cors"));
    headers.insert(SEC_FETCH_SITE, HeaderValue::from_static("same-origin"));
    headers.remove(SEC_FETCH_USER);
    headers.remove(PRIORITY);
    Ok(())
}

fn header_value(name: &'static str, value: impl AsRef<str>) -> Result<HeaderValue, UploadError> {
    HeaderValue::from_str(value.as_ref()).map_err(|source| UploadError::Header { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Expiration;

    #[test]
    fn extracts_session_cookie() {
        let session = Session::parse("PHPSESSID=0123456789abcdef0123456789abcdef; path=/; HttpOnly").unwrap();
        assert_eq!(session.cookie(), "0123456789abcdef0123456789abcdef");
        assert_eq!(Session::parse("PHPSESSID=abc"), None);
        assert_eq!(Session::parse("other=1; path=/"), None);
    }

    #[test]
    fn missing_cookie_reports_raw_header() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; path=/"));
        let err = Session::from_headers(&headers).unwrap_err();
        assert!(matches!(&err, UploadError::Session(raw) if raw == "theme=dark; path=/"));

        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=k3y; path=/"));
        assert_eq!(Session::from_headers(&headers).unwrap().cookie(), "k3y");
    }

    #[test]
    fn api_headers_switch_to_cors() {
        let body = MultipartBody::new(Boundary::from_suffix("ab"));
        let mut headers = navigation_headers().unwrap();
        api_headers(&mut headers, LITTERBOX_ROOT, &body).unwrap();

        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[ORIGIN], LITTERBOX_ROOT);
        assert_eq!(headers[REFERER], LITTERBOX_ROOT);
        assert_eq!(headers[SEC_FETCH_MODE], "cors");
        assert_eq!(headers[SEC_FETCH_SITE], "same-origin");
        assert_eq!(headers[CONTENT_TYPE], "multipart/form-data; boundary=----geckoformboundaryab");
        assert!(!headers.contains_key(SEC_FETCH_USER));
        assert!(!headers.contains_key(PRIORITY));
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("cat-tree/"));
    }

    #[test]
    fn body_field_order() {
        let request = UploadRequest::new("/tmp/dir/notes.txt", Variant::Ephemeral)
            .with_expiration(Expiration::try_from(24).unwrap())
            .with_account_token(Some("hash".into()));
        let bytes = compose_body(&request, b"hello".to_vec(), Boundary::from_suffix("b")).into_bytes();
        let text = String::from_utf8(bytes).unwrap();

        let time = text.find("name=\"time\"\r\n\r\n24h\r\n").unwrap();
        let reqtype = text.find("name=\"reqtype\"\r\n\r\nfileupload\r\n").unwrap();
        let userhash = text.find("name=\"userhash\"\r\n\r\nhash\r\n").unwrap();
        let file = text.find("name=\"fileToUpload\"; filename=\"notes.txt\"").unwrap();
        assert!(time < reqtype && reqtype < userhash && userhash < file);
    }

    #[test]
    fn quoted_file_name_is_escaped_on_the_wire() {
        let request = UploadRequest::new("dir/say \"hi\".txt", Variant::Standard);
        let bytes = compose_body(&request, Vec::new(), Boundary::from_suffix("b")).into_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("filename=\"say %22hi%22.txt\""));
    }

    #[test]
    fn standard_body_never_has_time() {
        for expiration in Expiration::all() {
            let request = UploadRequest::new("a.txt", Variant::Standard).with_expiration(expiration);
            let bytes = compose_body(&request, Vec::new(), Boundary::from_suffix("b")).into_bytes();
            let text = String::from_utf8(bytes).unwrap();
            assert!(!text.contains("name=\"time\""));
            assert!(!text.contains("name=\"userhash\""));
        }
    }

    #[test]
    fn directories_and_missing_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_file(dir.path()), Err(UploadError::IsDirectory(_))));
        assert!(matches!(
            read_file(&dir.path().join("missing.bin")),
            Err(UploadError::FileNotFound(_))
        ));
    }

    #[test]
    fn endpoints_trim_trailing_slash() {
        let endpoints = Endpoints::new("http://127.0.0.1:1234/", "http://127.0.0.1:5678");
        assert_eq!(endpoints.root(Variant::Standard), "http://127.0.0.1:1234");
        assert_eq!(endpoints.root(Variant::Ephemeral), "http://127.0.0.1:5678");
    }
}
