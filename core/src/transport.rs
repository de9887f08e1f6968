//! Request execution and outcome classification.
//!
//! # Design
//! `Transport` holds only immutable configuration (API url, token, default
//! headers) plus a shared `HttpBackend`, so one instance can serve many
//! threads at once. Each `execute` call is one round-trip that ends in
//! exactly one of:
//!
//! - `TransportError::Connection`: the backend produced no response.
//! - `Ok(RawResult)` with status 304: returned untouched, body unread.
//! - `TransportError::RequestFailed`: status >= 300; the body has been read
//!   in full and released.
//! - `Ok(RawResult)` for everything else, with an open body for the caller.
//!
//! Nothing is retried and nothing is decoded here; schema knowledge lives
//! with the caller.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::UreqBackend;
use crate::config::ClientConfig;
use crate::http::{
    find_header, set_header, BackendError, BackendResponse, Headers, HttpBackend, HttpMethod,
    HttpRequest,
};
use crate::types::ErrorResponse;

/// Path prefix of every API route.
pub const API_URL_SUFFIX: &str = "/api/v2";

/// Identification header attached to every request.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

pub const STATUS_NOT_MODIFIED: u16 = 304;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Failures of a single transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response was obtained.
    #[error("connection failed: {source}")]
    Connection {
        #[source]
        source: BackendError,
    },

    /// A response arrived with a status of 300 or above.
    #[error("request failed with status {status}: payload: {}", String::from_utf8_lossy(.body))]
    RequestFailed {
        status: u16,
        headers: Headers,
        body: Vec<u8>,
    },

    /// A failure status arrived but its body could not be read.
    #[error("error when reading response with code {status}: {source}")]
    BodyRead {
        status: u16,
        headers: Headers,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Status code, if a response was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Connection { .. } => None,
            TransportError::RequestFailed { status, .. }
            | TransportError::BodyRead { status, .. } => Some(*status),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        match self {
            TransportError::Connection { .. } => &[],
            TransportError::RequestFailed { headers, .. }
            | TransportError::BodyRead { headers, .. } => headers,
        }
    }

    /// Raw body of a failed response.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            TransportError::RequestFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Best-effort decode of the failure body into the server's structured
    /// error. `None` when the body is absent, empty or not that shape.
    pub fn error_response(&self) -> Option<ErrorResponse> {
        let body = self.body().filter(|b| !b.is_empty())?;
        serde_json::from_slice(body).ok()
    }
}

/// A single-reader response body.
///
/// Dropping it drains whatever is left and then closes the underlying
/// stream, so a connection is always released even if the reader bails out
/// early.
pub struct ResponseBody {
    inner: Option<Box<dyn Read + Send>>,
}

impl ResponseBody {
    pub fn new(reader: Box<dyn Read + Send>) -> Self {
        Self {
            inner: Some(reader),
        }
    }

    /// Drain and close now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut reader) = self.inner.take() {
            let _ = io::copy(&mut reader, &mut io::sink());
        }
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

/// A classified successful (or not-modified) outcome.
#[derive(Debug)]
pub struct RawResult {
    status: u16,
    headers: Headers,
    body: ResponseBody,
}

impl RawResult {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == STATUS_NOT_MODIFIED
    }

    pub fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    pub fn into_parts(self) -> (u16, Headers, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}

/// Executes requests against one boards server.
#[derive(Clone)]
pub struct Transport {
    api_url: String,
    token: Option<String>,
    default_headers: Headers,
    backend: Arc<dyn HttpBackend>,
}

impl Transport {
    /// Build a transport backed by ureq.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_backend(config, Arc::new(UreqBackend::new(config.timeout)))
    }

    pub fn with_backend(config: &ClientConfig, backend: Arc<dyn HttpBackend>) -> Self {
        let mut default_headers = vec![(
            REQUESTED_WITH_HEADER.to_string(),
            REQUESTED_WITH_VALUE.to_string(),
        )];
        for (name, value) in &config.default_headers {
            set_header(&mut default_headers, name, value);
        }

        Self {
            api_url: format!("{}{API_URL_SUFFIX}", config.base_url.trim_end_matches('/')),
            token: config.token.clone().filter(|t| !t.is_empty()),
            default_headers,
            backend,
        }
    }

    /// A copy of this transport that authenticates with `token` and shares
    /// the same backend.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()).filter(|t| !t.is_empty()),
            ..self.clone()
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Assemble the request `execute` would send.
    ///
    /// Headers are layered in order: defaults, bearer token, JSON content
    /// type when there is a body, then `headers`. A later header replaces
    /// an earlier one with the same name.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> HttpRequest {
        let body = body.map(|json| (JSON_CONTENT_TYPE, json.into_bytes()));
        self.assemble(method, path, body, headers)
    }

    fn assemble(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
        headers: &[(String, String)],
    ) -> HttpRequest {
        let mut all = self.default_headers.clone();
        if let Some(token) = &self.token {
            set_header(&mut all, "Authorization", &format!("Bearer {token}"));
        }
        let body = body.map(|(content_type, bytes)| {
            set_header(&mut all, "Content-Type", content_type);
            bytes
        });
        for (name, value) in headers {
            set_header(&mut all, name, value);
        }

        HttpRequest {
            method,
            url: format!("{}{path}", self.api_url),
            headers: all,
            body,
        }
    }

    /// Send one request with an optional JSON body and classify the outcome.
    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<RawResult, TransportError> {
        self.dispatch(self.build_request(method, path, body, headers))
    }

    /// Like `execute`, but the body is raw bytes of `content_type`, as used
    /// for file uploads.
    pub fn execute_bytes(
        &self,
        method: HttpMethod,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<RawResult, TransportError> {
        self.dispatch(self.assemble(method, path, Some((content_type, body)), headers))
    }

    fn dispatch(&self, request: HttpRequest) -> Result<RawResult, TransportError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let response = self.backend.send(request).map_err(|source| {
            warn!(%method, %url, error = %source, "connection failed");
            TransportError::Connection { source }
        })?;

        debug!(%method, %url, status = response.status, "response received");
        classify(response)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

fn classify(response: BackendResponse) -> Result<RawResult, TransportError> {
    let BackendResponse {
        status,
        headers,
        body,
    } = response;
    let mut body = ResponseBody::new(body);

    if status == STATUS_NOT_MODIFIED {
        return Ok(RawResult {
            status,
            headers,
            body,
        });
    }

    if status >= 300 {
        let mut buf = Vec::new();
        let read = body.read_to_end(&mut buf);
        body.close();
        return Err(match read {
            Ok(_) => TransportError::RequestFailed {
                status,
                headers,
                body: buf,
            },
            Err(source) => TransportError::BodyRead {
                status,
                headers,
                source,
            },
        });
    }

    Ok(RawResult {
        status,
        headers,
        body,
    })
}
