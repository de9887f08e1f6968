//! Typed client for the boards API.
//!
//! # Design
//! Nearly every remote operation is "send one request, decode one body", so
//! those are declared in a single table and expanded by `operations!`. Each
//! row names the method, the route, an optional JSON body and the decoder
//! applied to the classified `RawResult`. Operations with extra behavior
//! (batch validation, conditional fetches) are written out by hand below
//! the table.

use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::batch::BatchError;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{find_header, Headers, HttpBackend, HttpMethod};
use crate::multipart::FilePart;
use crate::routes;
use crate::transport::{RawResult, Transport};
use crate::types::{
    Block, BlockPatch, BlocksComplianceHistoryResponse, Board, BoardInsightsList, BoardMember,
    BoardMetadata, BoardPatch, BoardSearchField, BoardsAndBlocks, BoardsCloudLimits,
    BoardsComplianceHistoryResponse, BoardsComplianceResponse, BoardsStatistics, Card, CardPatch,
    Category, CategoryBoards, ChangePasswordRequest, ContentPosition, DeleteBoardsAndBlocks,
    FileUploadResponse, LoginRequest, LoginResponse, PatchBoardsAndBlocks, RegisterRequest,
    Sharing, Subscription, Team, User,
};

/// A decoded response together with its status and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub headers: Headers,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("ETag")
    }
}

/// Client for one boards server. Cheap to clone; clones share the backend.
#[derive(Debug, Clone)]
pub struct BoardsClient {
    transport: Transport,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(ApiError::Serialization)
}

fn decode<T: DeserializeOwned>(raw: RawResult) -> Result<ApiResponse<T>, ApiError> {
    let (status, headers, body) = raw.into_parts();
    let data = serde_json::from_reader(body).map_err(|source| ApiError::Decode { status, source })?;
    Ok(ApiResponse {
        data,
        status,
        headers,
    })
}

/// Like `decode` for list responses; a `null` body is an empty list.
fn decode_list<T: DeserializeOwned>(raw: RawResult) -> Result<ApiResponse<Vec<T>>, ApiError> {
    let response = decode::<Option<Vec<T>>>(raw)?;
    Ok(ApiResponse {
        data: response.data.unwrap_or_default(),
        status: response.status,
        headers: response.headers,
    })
}

/// The whole body as raw bytes, for non-JSON payloads such as archives.
fn read_bytes(raw: RawResult) -> Result<ApiResponse<Vec<u8>>, ApiError> {
    let (status, headers, mut body) = raw.into_parts();
    let mut data = Vec::new();
    body.read_to_end(&mut data)
        .map_err(|source| ApiError::Read { status, source })?;
    Ok(ApiResponse {
        data,
        status,
        headers,
    })
}

fn discard(raw: RawResult) -> Result<ApiResponse<()>, ApiError> {
    let (status, headers, body) = raw.into_parts();
    body.close();
    Ok(ApiResponse {
        data: (),
        status,
        headers,
    })
}

/// Like `decode`, but a 304 yields `None` instead of a decode attempt.
fn decode_if_modified<T: DeserializeOwned>(
    raw: RawResult,
) -> Result<ApiResponse<Option<T>>, ApiError> {
    if raw.is_not_modified() {
        let (status, headers, body) = raw.into_parts();
        body.close();
        return Ok(ApiResponse {
            data: None,
            status,
            headers,
        });
    }
    let response = decode(raw)?;
    Ok(ApiResponse {
        data: Some(response.data),
        status: response.status,
        headers: response.headers,
    })
}

fn validated(check: Result<(), BatchError>) -> Result<(), ApiError> {
    check.map_err(|err| {
        debug!(error = %err, "rejecting batch before sending");
        ApiError::Validation(err)
    })
}

fn notify(disable_notify: bool) -> [(&'static str, &'static str); 1] {
    [("disable_notify", if disable_notify { "true" } else { "" })]
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl BoardsClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::from_transport(Transport::new(config))
    }

    pub fn with_backend(config: &ClientConfig, backend: Arc<dyn HttpBackend>) -> Self {
        Self::from_transport(Transport::with_backend(config, backend))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// A client authenticated with `token`, typically from `login`.
    pub fn with_token(&self, token: &str) -> Self {
        Self::from_transport(self.transport.with_token(token))
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Create boards and their blocks atomically. The batch is validated
    /// first and rejected without any I/O if it is malformed.
    pub fn create_boards_and_blocks(
        &self,
        batch: &BoardsAndBlocks,
    ) -> Result<ApiResponse<BoardsAndBlocks>, ApiError> {
        validated(batch.is_valid())?;
        let raw = self.transport.execute(
            HttpMethod::Post,
            &routes::boards_and_blocks(),
            Some(to_json(batch)?),
            &[],
        )?;
        decode(raw)
    }

    /// Patch boards and blocks atomically after checking the id and patch
    /// lists line up.
    pub fn patch_boards_and_blocks(
        &self,
        batch: &PatchBoardsAndBlocks,
    ) -> Result<ApiResponse<BoardsAndBlocks>, ApiError> {
        validated(batch.is_valid())?;
        let raw = self.transport.execute(
            HttpMethod::Patch,
            &routes::boards_and_blocks(),
            Some(to_json(batch)?),
            &[],
        )?;
        decode(raw)
    }

    /// Upload a file attached to a board as `multipart/form-data`.
    pub fn team_upload_file(
        &self,
        team_id: &str,
        board_id: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<ApiResponse<FileUploadResponse>, ApiError> {
        let part = FilePart::new(file_name, data);
        let raw = self.transport.execute_bytes(
            HttpMethod::Post,
            &routes::team_files(team_id, board_id),
            &part.content_type,
            part.body,
            &[],
        )?;
        decode(raw)
    }

    /// Import a board archive, as produced by `export_board_archive`, into
    /// a team.
    pub fn import_archive(
        &self,
        team_id: &str,
        archive: &[u8],
    ) -> Result<ApiResponse<()>, ApiError> {
        let part = FilePart::new("archive.boardarchive", archive);
        let raw = self.transport.execute_bytes(
            HttpMethod::Post,
            &routes::import_archive(team_id),
            &part.content_type,
            part.body,
            &[],
        )?;
        discard(raw)
    }

    /// Fetch a board's blocks unless they still match `etag`, in which case
    /// the data is `None`.
    pub fn get_blocks_for_board_if_changed(
        &self,
        board_id: &str,
        etag: &str,
    ) -> Result<ApiResponse<Option<Vec<Block>>>, ApiError> {
        let headers = [("If-None-Match".to_string(), etag.to_string())];
        let raw = self
            .transport
            .execute(HttpMethod::Get, &routes::blocks(board_id), None, &headers)?;
        decode_if_modified(raw)
    }
}

macro_rules! operations {
    (@body) => { None };
    (@body $body:expr) => { Some(to_json($body)?) };
    ($(
        $(#[$attr:meta])*
        fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty {
            $method:ident $path:expr $(, body: $body:expr)?
        } => $decoder:ident;
    )*) => {
        impl BoardsClient {
            $(
                $(#[$attr])*
                pub fn $name(&self $(, $arg: $ty)*) -> Result<ApiResponse<$ret>, ApiError> {
                    let body = operations!(@body $($body)?);
                    let raw = self.transport.execute(HttpMethod::$method, &$path, body, &[])?;
                    $decoder(raw)
                }
            )*
        }
    };
}

operations! {
    // Teams and users

    fn get_team(&self, team_id: &str) -> Team {
        Get routes::team(team_id)
    } => decode;

    fn get_boards_for_team(&self, team_id: &str) -> Vec<Board> {
        Get routes::team_boards(team_id)
    } => decode_list;

    fn get_templates_for_team(&self, team_id: &str) -> Vec<Board> {
        Get routes::team_templates(team_id)
    } => decode_list;

    fn search_boards_for_team(&self, team_id: &str, term: &str) -> Vec<Board> {
        Get routes::with_query(routes::team_board_search(team_id), &[("q", term)])
    } => decode_list;

    /// Search the boards the current user can see, matching `term` against
    /// `field`.
    fn search_boards_for_user(
        &self,
        team_id: &str,
        term: &str,
        field: BoardSearchField
    ) -> Vec<Board> {
        Get routes::with_query(
            routes::team_board_search(team_id),
            &[("q", term), ("field", field.as_str())],
        )
    } => decode_list;

    /// Exchange credentials for a session token. The client itself is not
    /// changed; use `with_token` on the returned token.
    fn login(&self, request: &LoginRequest) -> LoginResponse {
        Post routes::login(), body: request
    } => decode;

    fn register(&self, request: &RegisterRequest) -> () {
        Post routes::register(), body: request
    } => discard;

    fn get_me(&self) -> User {
        Get routes::me()
    } => decode;

    fn get_user(&self, user_id: &str) -> User {
        Get routes::user(user_id)
    } => decode;

    /// Resolve several users at once.
    fn get_user_list(&self, user_ids: &[String]) -> Vec<User> {
        Post routes::users(), body: user_ids
    } => decode_list;

    fn user_change_password(&self, user_id: &str, request: &ChangePasswordRequest) -> () {
        Post routes::change_password(user_id), body: request
    } => discard;

    // Boards

    fn create_board(&self, board: &Board) -> Board {
        Post routes::boards(), body: board
    } => decode;

    /// `read_token` grants access to a shared board without membership.
    fn get_board(&self, board_id: &str, read_token: Option<&str>) -> Board {
        Get routes::with_query(
            routes::board(board_id),
            &[("read_token", read_token.unwrap_or_default())],
        )
    } => decode;

    fn get_board_metadata(&self, board_id: &str, read_token: Option<&str>) -> BoardMetadata {
        Get routes::with_query(
            routes::board_metadata(board_id),
            &[("read_token", read_token.unwrap_or_default())],
        )
    } => decode;

    fn patch_board(&self, board_id: &str, patch: &BoardPatch) -> Board {
        Patch routes::board(board_id), body: patch
    } => decode;

    fn delete_board(&self, board_id: &str) -> () {
        Delete routes::board(board_id)
    } => discard;

    fn undelete_board(&self, board_id: &str) -> () {
        Post routes::undelete_board(board_id)
    } => discard;

    /// Copy a board with all its blocks, optionally into another team.
    fn duplicate_board(
        &self,
        board_id: &str,
        as_template: bool,
        to_team: Option<&str>
    ) -> BoardsAndBlocks {
        Post routes::with_query(
            routes::duplicate_board(board_id),
            &[("asTemplate", flag(as_template)), ("toTeam", to_team.unwrap_or_default())],
        )
    } => decode;

    /// The board serialized as an archive file.
    fn export_board_archive(&self, board_id: &str) -> Vec<u8> {
        Get routes::export_board_archive(board_id)
    } => read_bytes;

    // Blocks

    fn get_blocks_for_board(&self, board_id: &str) -> Vec<Block> {
        Get routes::blocks(board_id)
    } => decode_list;

    /// Includes blocks of every type, not only content blocks.
    fn get_all_blocks_for_board(&self, board_id: &str) -> Vec<Block> {
        Get routes::with_query(routes::blocks(board_id), &[("all", "true")])
    } => decode_list;

    fn insert_blocks(&self, board_id: &str, blocks: &[Block], disable_notify: bool) -> Vec<Block> {
        Post routes::with_query(routes::blocks(board_id), &notify(disable_notify)), body: blocks
    } => decode_list;

    fn patch_block(
        &self,
        board_id: &str,
        block_id: &str,
        patch: &BlockPatch,
        disable_notify: bool
    ) -> () {
        Patch routes::with_query(
            routes::block(board_id, block_id),
            &notify(disable_notify),
        ), body: patch
    } => discard;

    fn delete_block(&self, board_id: &str, block_id: &str, disable_notify: bool) -> () {
        Delete routes::with_query(routes::block(board_id, block_id), &notify(disable_notify))
    } => discard;

    fn undelete_block(&self, board_id: &str, block_id: &str) -> () {
        Post routes::undelete_block(board_id, block_id)
    } => discard;

    fn duplicate_block(&self, board_id: &str, block_id: &str, as_template: bool) -> () {
        Post routes::with_query(
            routes::duplicate_block(board_id, block_id),
            &[("asTemplate", flag(as_template))],
        )
    } => discard;

    /// Move a content block before or after another one.
    fn move_content_block(
        &self,
        src_block_id: &str,
        dst_block_id: &str,
        position: ContentPosition
    ) -> () {
        Post routes::move_content_block(src_block_id, position.as_str(), dst_block_id)
    } => discard;

    /// Delete boards and blocks atomically. A deleted board takes its
    /// blocks with it, so they need not be listed.
    fn delete_boards_and_blocks(&self, batch: &DeleteBoardsAndBlocks) -> () {
        Delete routes::boards_and_blocks(), body: batch
    } => discard;

    // Cards

    fn create_card(&self, board_id: &str, card: &Card, disable_notify: bool) -> Card {
        Post routes::with_query(
            routes::board_cards(board_id),
            &notify(disable_notify),
        ), body: card
    } => decode;

    fn get_cards(&self, board_id: &str, page: u32, per_page: u32) -> Vec<Card> {
        Get routes::with_query(
            routes::board_cards(board_id),
            &[("page", page.to_string().as_str()), ("per_page", per_page.to_string().as_str())],
        )
    } => decode_list;

    fn get_card(&self, card_id: &str) -> Card {
        Get routes::card(card_id)
    } => decode;

    fn patch_card(&self, card_id: &str, patch: &CardPatch, disable_notify: bool) -> Card {
        Patch routes::with_query(routes::card(card_id), &notify(disable_notify)), body: patch
    } => decode;

    // Members

    fn get_members_for_board(&self, board_id: &str) -> Vec<BoardMember> {
        Get routes::members(board_id)
    } => decode_list;

    fn add_member_to_board(&self, member: &BoardMember) -> BoardMember {
        Post routes::members(&member.board_id), body: member
    } => decode;

    fn update_board_member(&self, member: &BoardMember) -> BoardMember {
        Put routes::member(&member.board_id, &member.user_id), body: member
    } => decode;

    fn delete_board_member(&self, member: &BoardMember) -> () {
        Delete routes::member(&member.board_id, &member.user_id)
    } => discard;

    fn join_board(&self, board_id: &str) -> BoardMember {
        Post routes::join_board(board_id)
    } => decode;

    fn leave_board(&self, board_id: &str) -> BoardMember {
        Post routes::leave_board(board_id)
    } => decode;

    // Categories

    fn create_category(&self, category: &Category) -> Category {
        Post routes::categories(&category.team_id), body: category
    } => decode;

    fn delete_category(&self, team_id: &str, category_id: &str) -> () {
        Delete routes::category(team_id, category_id)
    } => discard;

    fn get_user_category_boards(&self, team_id: &str) -> Vec<CategoryBoards> {
        Get routes::categories(team_id)
    } => decode_list;

    fn reorder_categories(&self, team_id: &str, order: &[String]) -> Vec<String> {
        Put routes::reorder_categories(team_id), body: order
    } => decode_list;

    /// Move `board_id` into the category.
    fn update_category_board(&self, team_id: &str, category_id: &str, board_id: &str) -> () {
        Post routes::category_board(team_id, category_id, board_id)
    } => discard;

    fn reorder_category_boards(
        &self,
        team_id: &str,
        category_id: &str,
        order: &[String]
    ) -> Vec<String> {
        Put routes::reorder_category_boards(team_id, category_id), body: order
    } => decode_list;

    fn hide_board(&self, team_id: &str, category_id: &str, board_id: &str) -> () {
        Put routes::hide_board(team_id, category_id, board_id)
    } => discard;

    fn unhide_board(&self, team_id: &str, category_id: &str, board_id: &str) -> () {
        Put routes::unhide_board(team_id, category_id, board_id)
    } => discard;

    // Subscriptions

    fn create_subscription(&self, subscription: &Subscription) -> Subscription {
        Post routes::subscriptions(), body: subscription
    } => decode;

    fn delete_subscription(&self, block_id: &str, subscriber_id: &str) -> () {
        Delete routes::subscription(block_id, subscriber_id)
    } => discard;

    fn get_subscriptions(&self, subscriber_id: &str) -> Vec<Subscription> {
        Get routes::subscriber_subscriptions(subscriber_id)
    } => decode_list;

    // Sharing

    fn get_sharing(&self, board_id: &str) -> Sharing {
        Get routes::sharing(board_id)
    } => decode;

    fn post_sharing(&self, sharing: &Sharing) -> () {
        Post routes::sharing(&sharing.id), body: sharing
    } => discard;

    // Insights

    /// Most active boards of a team over `time_range` (e.g. `1_day`).
    fn get_team_boards_insights(
        &self,
        team_id: &str,
        time_range: &str,
        page: u32,
        per_page: u32
    ) -> BoardInsightsList {
        Get routes::with_query(
            routes::team_board_insights(team_id),
            &[
                ("time_range", time_range),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
            ],
        )
    } => decode;

    /// Most active boards of the current user within a team.
    fn get_user_boards_insights(
        &self,
        team_id: &str,
        time_range: &str,
        page: u32,
        per_page: u32
    ) -> BoardInsightsList {
        Get routes::with_query(
            routes::my_board_insights(),
            &[
                ("time_range", time_range),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
                ("team_id", team_id),
            ],
        )
    } => decode;

    // Service info and compliance

    fn get_limits(&self) -> BoardsCloudLimits {
        Get routes::limits()
    } => decode;

    fn get_statistics(&self) -> BoardsStatistics {
        Get routes::statistics()
    } => decode;

    fn get_boards_for_compliance(
        &self,
        team_id: &str,
        page: u32,
        per_page: u32
    ) -> BoardsComplianceResponse {
        Get routes::with_query(
            routes::compliance_boards(),
            &[
                ("team_id", team_id),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
            ],
        )
    } => decode;

    /// Boards changed since `modified_since` (epoch millis).
    fn get_boards_compliance_history(
        &self,
        modified_since: i64,
        include_deleted: bool,
        team_id: &str,
        page: u32,
        per_page: u32
    ) -> BoardsComplianceHistoryResponse {
        Get routes::with_query(
            routes::compliance_boards_history(),
            &[
                ("modified_since", modified_since.to_string().as_str()),
                ("include_deleted", flag(include_deleted)),
                ("team_id", team_id),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
            ],
        )
    } => decode;

    /// Blocks changed since `modified_since` (epoch millis), optionally
    /// narrowed to one board.
    fn get_blocks_compliance_history(
        &self,
        modified_since: i64,
        include_deleted: bool,
        team_id: &str,
        board_id: &str,
        page: u32,
        per_page: u32
    ) -> BlocksComplianceHistoryResponse {
        Get routes::with_query(
            routes::compliance_blocks_history(),
            &[
                ("modified_since", modified_since.to_string().as_str()),
                ("include_deleted", flag(include_deleted)),
                ("team_id", team_id),
                ("board_id", board_id),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
            ],
        )
    } => decode;
}
