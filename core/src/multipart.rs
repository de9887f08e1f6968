//! `multipart/form-data` encoding for single-file uploads.

use uuid::Uuid;

/// Form field the server reads uploaded files from.
pub const FILE_FIELD: &str = "file";

/// One file wrapped in a `multipart/form-data` body, plus the matching
/// `Content-Type` (which carries the boundary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: &str, data: &[u8]) -> Self {
        let boundary = format!("boards-{}", Uuid::new_v4().simple());
        Self::with_boundary(&boundary, file_name, data)
    }

    fn with_boundary(boundary: &str, file_name: &str, data: &[u8]) -> Self {
        let disposition = format!(
            "Content-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{}\"\r\n",
            quote(file_name)
        );

        let mut body = Vec::with_capacity(data.len() + disposition.len() + 128);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Self {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body,
        }
    }
}

/// Escape a file name for a quoted header parameter. Line breaks would end
/// the header early, so they are dropped.
fn quote(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}
