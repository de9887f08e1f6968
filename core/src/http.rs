//! HTTP types exchanged between the transport and the host HTTP capability.
//!
//! # Design
//! Requests are plain data: the transport assembles a fully resolved
//! `HttpRequest` and hands it to an `HttpBackend`, which is the only place
//! that touches the network. Swapping the backend (real client, in-memory
//! fake) never changes how outcomes are classified.
//!
//! Response bodies stay streams at this layer so a successful response can
//! be decoded without buffering it first.

use std::fmt;
use std::io::Read;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list. Names compare case-insensitively.
pub type Headers = Vec<(String, String)>;

/// Look up the first header named `name`, ignoring ASCII case.
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Insert `name: value`, replacing any existing header with the same name.
pub fn set_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// A fully resolved HTTP request described as plain data. `body` is sent
/// as-is; its `Content-Type` is already among `headers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

/// What a backend returns once a response has been obtained.
pub struct BackendResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for BackendResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Failure below the HTTP protocol layer: no response was obtained.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The host's HTTP capability.
///
/// Implementations must return `Ok` for every response they obtain,
/// whatever its status; only failures to get a response at all are `Err`.
pub trait HttpBackend: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<BackendResponse, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut headers = vec![
            ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
            ("authorization".to_string(), "Bearer old".to_string()),
        ];
        set_header(&mut headers, "Authorization", "Bearer new");
        assert_eq!(headers.len(), 2);
        assert_eq!(find_header(&headers, "AUTHORIZATION"), Some("Bearer new"));
        assert_eq!(find_header(&headers, "x-requested-with"), Some("XMLHttpRequest"));
    }

    #[test]
    fn find_header_missing() {
        assert_eq!(find_header(&[], "etag"), None);
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
