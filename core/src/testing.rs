//! In-memory `HttpBackend` for unit tests.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::http::{BackendError, BackendResponse, HttpBackend, HttpRequest};

/// Observes how a stubbed body was consumed.
#[derive(Debug, Default)]
pub(crate) struct BodyTracker {
    read: AtomicUsize,
    closed: AtomicBool,
}

impl BodyTracker {
    pub(crate) fn bytes_read(&self) -> usize {
        self.read.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    broken: bool,
    tracker: Arc<BodyTracker>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
        }
        let n = self.inner.read(buf)?;
        self.tracker.read.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.tracker.closed.store(true, Ordering::SeqCst);
    }
}

enum Reply {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        broken: bool,
    },
    Refused,
}

/// Replays queued replies in order and records every request.
#[derive(Default)]
pub(crate) struct StubBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    trackers: Mutex<Vec<Arc<BodyTracker>>>,
}

impl StubBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, status: u16, body: &str) {
        self.reply_with_headers(status, &[], body);
    }

    pub(crate) fn reply_with_headers(&self, status: u16, headers: &[(&str, &str)], body: &str) {
        self.push(Reply::Response {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.as_bytes().to_vec(),
            broken: false,
        });
    }

    pub(crate) fn reply_broken(&self, status: u16) {
        self.push(Reply::Response {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            broken: true,
        });
    }

    pub(crate) fn refuse(&self) {
        self.push(Reply::Refused);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub(crate) fn last_body(&self) -> Arc<BodyTracker> {
        self.trackers.lock().unwrap().last().cloned().expect("no body was served")
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl HttpBackend for StubBackend {
    fn send(&self, request: HttpRequest) -> Result<BackendResponse, BackendError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Response {
                status,
                headers,
                body,
                broken,
            }) => {
                let tracker = Arc::new(BodyTracker::default());
                self.trackers.lock().unwrap().push(tracker.clone());
                Ok(BackendResponse {
                    status,
                    headers,
                    body: Box::new(TrackedReader {
                        inner: Cursor::new(body),
                        broken,
                        tracker,
                    }),
                })
            }
            Some(Reply::Refused) => Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            None => Err("no stubbed reply left".into()),
        }
    }
}
