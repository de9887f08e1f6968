//! Blocking `HttpBackend` built on ureq.
//!
//! ureq's status-code-as-error behavior is disabled so 4xx/5xx responses come
//! back as data and the transport alone decides how to classify them.

use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::http::{BackendError, BackendResponse, HttpBackend, HttpMethod, HttpRequest};

/// Default backend used by `Transport::new`.
#[derive(Debug, Clone)]
pub struct UreqBackend {
    agent: Agent,
}

impl UreqBackend {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    headers: &[(String, String)],
    body: Option<&[u8]>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = with_headers(builder, headers);
    match body {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}

impl HttpBackend for UreqBackend {
    fn send(&self, request: HttpRequest) -> Result<BackendResponse, BackendError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let body = body.as_deref();

        let response = match (method, body) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Get, Some(_)) => {
                send_with_body(self.agent.get(&url).force_send_body(), &headers, body)
            }
            (HttpMethod::Delete, Some(_)) => {
                send_with_body(self.agent.delete(&url).force_send_body(), &headers, body)
            }
            (HttpMethod::Post, _) => send_with_body(self.agent.post(&url), &headers, body),
            (HttpMethod::Put, _) => send_with_body(self.agent.put(&url), &headers, body),
            (HttpMethod::Patch, _) => send_with_body(self.agent.patch(&url), &headers, body),
        }
        .map_err(|e| Box::new(e) as BackendError)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(BackendResponse {
            status,
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}
