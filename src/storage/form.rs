use std::collections::HashMap;
use std::fmt;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;

use crate::storage::upload::UploadedFile;

/// Parsed form input: plain fields plus file parts, keyed by field name.
/// Both verbs feed controllers through this one abstraction, so a PUT with a
/// multipart body looks exactly like a POST by the time a handler sees it.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

#[derive(Debug)]
pub enum FormError {
    MissingBoundary,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingBoundary => write!(f, "Invalid multipart/form-data format"),
        }
    }
}

impl std::error::Error for FormError {}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("multipart/form-data"))
        .unwrap_or(false)
}

impl FormPayload {
    /// Decodes a raw multipart body. The boundary marker is taken from the
    /// first line of the body rather than the Content-Type header, so the
    /// decoder works for verbs whose bodies the framework never touched.
    pub fn parse(raw: &[u8]) -> Result<Self, FormError> {
        let boundary_end = find(raw, b"\r\n").ok_or(FormError::MissingBoundary)?;
        let boundary = &raw[..boundary_end];
        if boundary.is_empty() || !boundary.starts_with(b"--") {
            return Err(FormError::MissingBoundary);
        }

        let mut payload = FormPayload::default();
        for part in split(raw, boundary).into_iter().skip(1) {
            // the terminal marker closes the stream
            if part == b"--\r\n" || part == b"--" {
                break;
            }
            let part = strip_crlf_prefix(part);
            if part.is_empty() {
                continue;
            }

            let Some(header_end) = find(part, b"\r\n\r\n") else { continue };
            let headers = String::from_utf8_lossy(&part[..header_end]);
            let content = strip_crlf_suffix(&part[header_end + 4..]);

            let Some((name, filename)) = parse_content_disposition(&headers) else {
                continue;
            };

            match filename {
                Some(filename) => {
                    // sniff the type from the bytes, never from the part header
                    let mime = infer::get(content)
                        .map(|kind| kind.mime_type().to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    payload.files.insert(
                        name,
                        UploadedFile {
                            name: filename,
                            mime,
                            size: content.len(),
                            data: content.to_vec(),
                            ok: true,
                        },
                    );
                }
                None => {
                    payload
                        .fields
                        .insert(name, String::from_utf8_lossy(content).into_owned());
                }
            }
        }

        Ok(payload)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

fn parse_content_disposition(headers: &str) -> Option<(String, Option<String>)> {
    let line = headers
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("content-disposition"))?;
    let name = header_param(line, "name")?;
    let filename = header_param(line, "filename");
    Some((name, filename))
}

fn header_param(line: &str, key: &str) -> Option<String> {
    let marker = format!("{}=\"", key);
    let start = line.find(&marker)? + marker.len();
    let end = line[start..].find('"')? + start;
    Some(line[start..end].to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut rest = haystack;
    while let Some(idx) = find(rest, needle) {
        parts.push(&rest[..idx]);
        rest = &rest[idx + needle.len()..];
    }
    parts.push(rest);
    parts
}

fn strip_crlf_prefix(part: &[u8]) -> &[u8] {
    part.strip_prefix(b"\r\n").unwrap_or(part)
}

fn strip_crlf_suffix(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n").unwrap_or(part)
}
