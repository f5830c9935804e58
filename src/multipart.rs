// Hand-built `multipart/form-data` bodies. The upload endpoint is picky about
// framing, so the body is assembled part by part and serialized to bytes in a
// single pass. File contents are copied verbatim and never treated as text.

use rand::Rng;

/// Literal prefix of every boundary marker, as a Firefox form submission
/// would send it.
pub const BOUNDARY_PREFIX: &str = "------geckoformboundary";

const CRLF: &[u8] = b"\r\n";

/// Delimiter shared by every part of one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    suffix: String,
}

impl Boundary {
    /// Fresh boundary with a 32 hex character (128 bit) random suffix.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes);
        Boundary {
            suffix: hex::encode(bytes),
        }
    }

    /// Boundary with a caller-chosen suffix, for reproducible bodies.
    pub fn from_suffix(suffix: impl Into<String>) -> Self {
        Boundary {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The delimiter line as it appears in the body.
    pub fn marker(&self) -> String {
        format!("{}{}", BOUNDARY_PREFIX, self.suffix)
    }

    /// The `boundary=` parameter: the marker without its leading `--`.
    pub fn parameter(&self) -> String {
        self.marker()[2..].to_string()
    }
}

#[derive(Debug, Clone)]
enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// Ordered list of form parts plus the boundary that separates them.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: Boundary,
    parts: Vec<Part>,
}

impl MultipartBody {
    pub fn new(boundary: Boundary) -> Self {
        MultipartBody {
            boundary,
            parts: Vec::new(),
        }
    }

    /// Append a plain form field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a file field carrying raw bytes.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary.parameter())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let marker = self.boundary.marker();
        let payload: usize = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { value, .. } => value.len(),
                Part::File { bytes, .. } => bytes.len(),
            })
            .sum();
        let mut out = Vec::with_capacity(payload + (self.parts.len() + 1) * (marker.len() + 128));

        for part in self.parts {
            out.extend_from_slice(marker.as_bytes());
            out.extend_from_slice(CRLF);
            match part {
                Part::Text { name, value } => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"", escape(&name)).as_bytes(),
                    );
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    filename,
                    content_type,
                    bytes,
                } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                            escape(&name),
                            escape(&filename)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(format!("Content-Type: {}", content_type).as_bytes());
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(CRLF);
                    out.extend_from_slice(&bytes);
                }
            }
            out.extend_from_slice(CRLF);
        }

        out.extend_from_slice(marker.as_bytes());
        out.extend_from_slice(b"--");
        out.extend_from_slice(CRLF);
        out
    }
}

/// Percent-escape the characters that would break a quoted header parameter.
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn boundaries_do_not_repeat() {
        let suffixes: HashSet<String> = (0..1000)
            .map(|_| Boundary::generate().suffix().to_string())
            .collect();
        assert_eq!(suffixes.len(), 1000);
        for suffix in &suffixes {
            assert_eq!(suffix.len(), 32);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn header_parameter_drops_leading_dashes() {
        let boundary = Boundary::from_suffix("0123456789abcdef0123456789abcdef");
        assert_eq!(boundary.marker(), "------geckoformboundary0123456789abcdef0123456789abcdef");
        assert_eq!(boundary.parameter(), "----geckoformboundary0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn serializes_exact_framing() {
        let body = MultipartBody::new(Boundary::from_suffix("x"))
            .text("reqtype", "fileupload")
            .file("fileToUpload", "a.bin", "application/octet-stream", vec![0, 159, 146, 150]);

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"------geckoformboundaryx\r\n\
              Content-Disposition: form-data; name=\"reqtype\"\r\n\
              \r\n\
              fileupload\r\n\
              ------geckoformboundaryx\r\n\
              Content-Disposition: form-data; name=\"fileToUpload\"; filename=\"a.bin\"\r\n\
              Content-Type: application/octet-stream\r\n\
              \r\n",
        );
        expected.extend_from_slice(&[0, 159, 146, 150]);
        expected.extend_from_slice(b"\r\n------geckoformboundaryx--\r\n");

        assert_eq!(body.into_bytes(), expected);
    }

    #[test]
    fn escapes_quotes_and_newlines_in_filenames() {
        let bytes = MultipartBody::new(Boundary::from_suffix("x"))
            .file("f", "we\"ird\r\nname", "application/octet-stream", Vec::new())
            .into_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("filename=\"we%22ird%0D%0Aname\""));
    }

    #[test]
    fn empty_body_is_only_the_terminator() {
        let body = MultipartBody::new(Boundary::from_suffix("x"));
        assert_eq!(body.into_bytes(), b"------geckoformboundaryx--\r\n");
    }
}
