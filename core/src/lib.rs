//! Blocking API client for the boards service.
//!
//! # Overview
//! Two pieces carry the design; everything else is thin wrappers:
//!
//! - `batch` validates composite boards-and-blocks payloads before they are
//!   sent, so malformed batches never reach the network.
//! - `transport` executes one request and classifies the outcome as a
//!   connection failure, a failed status carrying the raw body, or a success
//!   with an open body stream.
//!
//! `BoardsClient` composes the two into one typed method per remote
//! operation, decoding JSON at the call site.
//!
//! # Design
//! - The network sits behind the `HttpBackend` trait; `UreqBackend` is the
//!   default and tests substitute an in-memory backend.
//! - Configuration is immutable after construction, so a client can be
//!   shared freely between threads.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod backend;
pub mod batch;
pub mod block_type;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod routes;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::UreqBackend;
pub use batch::{validate_create_batch, validate_patch_batch, BatchError};
pub use block_type::{BlockType, InvalidBlockType};
pub use client::{ApiResponse, BoardsClient};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{BackendError, BackendResponse, HttpBackend, HttpMethod, HttpRequest};
pub use transport::{RawResult, ResponseBody, Transport, TransportError};
pub use types::{
    Block, BlockHistory, BlockPatch, BlocksComplianceHistoryResponse, Board, BoardHistory,
    BoardInsight, BoardInsightsList, BoardMember, BoardMetadata, BoardPatch, BoardSearchField,
    BoardType, BoardsAndBlocks, BoardsCloudLimits, BoardsComplianceHistoryResponse,
    BoardsComplianceResponse, BoardsStatistics, Card, CardPatch, Category, CategoryBoardMetadata,
    CategoryBoards, ChangePasswordRequest, ContentPosition, DeleteBoardsAndBlocks, ErrorResponse,
    FileUploadResponse, LoginRequest, LoginResponse, NotificationHint, PatchBoardsAndBlocks,
    RegisterRequest, Sharing, Subscription, Team, User,
};
