//! Error type returned by `BoardsClient` operations.
//!
//! # Design
//! Each layer keeps its own error: `BatchError` for payloads rejected before
//! any I/O, `TransportError` for failures at or below HTTP, and the two
//! serde variants for the caller-side encode/decode steps. `ApiError` only
//! wraps them, so callers can still match on the precise cause.

use std::io;

use thiserror::Error;

use crate::batch::BatchError;
use crate::transport::TransportError;
use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The batch payload broke an invariant; nothing was sent.
    #[error("invalid batch: {0}")]
    Validation(#[from] BatchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A successful response body did not have the expected shape.
    #[error("decoding response with status {status} failed: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// A successful response body broke off while being read.
    #[error("reading response with status {status} failed: {source}")]
    Read {
        status: u16,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// Status code of the response involved, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(err) => err.status(),
            ApiError::Decode { status, .. } | ApiError::Read { status, .. } => Some(*status),
            ApiError::Validation(_) | ApiError::Serialization(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The server's structured error, when the failure body carried one.
    pub fn error_response(&self) -> Option<ErrorResponse> {
        match self {
            ApiError::Transport(err) => err.error_response(),
            _ => None,
        }
    }
}
