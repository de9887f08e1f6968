//! Domain DTOs for the boards API.
//!
//! # Design
//! These types mirror the server's JSON schema (camelCase keys) but are
//! defined independently of the mock-server crate; integration tests catch
//! schema drift. Entity structs default every missing field so partial server
//! payloads still decode, and collection fields also accept an explicit
//! `null`, which the server sends for empty lists and maps. Patch structs
//! omit absent fields when serialized so the server only touches what the
//! caller set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block_type::BlockType;

/// Deserializes `null` as the type's default. Pair with a container-level
/// `#[serde(default)]` so a missing key behaves the same.
mod null_default {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Visibility of a board within its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardType {
    #[default]
    #[serde(rename = "O")]
    Open,
    #[serde(rename = "P")]
    Private,
    /// Any type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A board: the container every block belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub team_id: String,
    pub channel_id: String,
    pub created_by: String,
    pub modified_by: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
    pub minimum_role: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub show_description: bool,
    pub is_template: bool,
    pub template_version: i32,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub properties: Map<String, Value>,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub card_properties: Vec<Value>,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
}

/// Partial update for a board. Only the fields present in the JSON are
/// applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub board_type: Option<BoardType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_description: Option<bool>,
    #[serde(
        skip_serializing_if = "HashMap::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub updated_properties: HashMap<String, Value>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub deleted_properties: Vec<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub updated_card_properties: Vec<Value>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub deleted_card_properties: Vec<String>,
}

/// A unit of board content. `board_id` must reference an existing board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub parent_id: String,
    pub created_by: String,
    pub modified_by: String,
    pub schema: i64,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub title: String,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub fields: Map<String, Value>,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
    pub board_id: String,
    pub limited: bool,
}

/// Partial update for a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "HashMap::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub updated_fields: HashMap<String, Value>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub deleted_fields: Vec<String>,
}

/// Boards and their blocks created together in one atomic request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsAndBlocks {
    #[serde(deserialize_with = "null_default::deserialize")]
    pub boards: Vec<Board>,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub blocks: Vec<Block>,
}

/// Positionally paired ids and patches applied in one atomic request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchBoardsAndBlocks {
    #[serde(rename = "boardIDs", deserialize_with = "null_default::deserialize")]
    pub board_ids: Vec<String>,
    #[serde(rename = "boardPatches", deserialize_with = "null_default::deserialize")]
    pub board_patches: Vec<BoardPatch>,
    #[serde(rename = "blockIDs", deserialize_with = "null_default::deserialize")]
    pub block_ids: Vec<String>,
    #[serde(rename = "blockPatches", deserialize_with = "null_default::deserialize")]
    pub block_patches: Vec<BlockPatch>,
}

/// Ids of boards and blocks removed in one atomic request. Deleting a board
/// removes its blocks server side, so they need not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteBoardsAndBlocks {
    #[serde(deserialize_with = "null_default::deserialize")]
    pub boards: Vec<String>,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub title: String,
    pub signup_token: String,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub settings: Map<String, Value>,
    pub modified_by: String,
    pub update_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
    pub is_bot: bool,
    pub is_guest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub board_id: String,
    pub created_by: String,
    pub modified_by: String,
    pub title: String,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub content_order: Vec<String>,
    pub icon: String,
    pub is_template: bool,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub properties: Map<String, Value>,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_order: Option<Vec<String>>,
    #[serde(
        skip_serializing_if = "HashMap::is_empty",
        deserialize_with = "null_default::deserialize"
    )]
    pub updated_properties: HashMap<String, Value>,
}

/// A user-defined sidebar grouping of boards within a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub team_id: String,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
    pub collapsed: bool,
    pub sort_order: i64,
    #[serde(rename = "type")]
    pub category_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryBoardMetadata {
    pub board_id: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryBoards {
    #[serde(flatten)]
    pub category: Category,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub board_metadata: Vec<CategoryBoardMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardMember {
    pub board_id: String,
    pub user_id: String,
    pub roles: String,
    pub minimum_role: String,
    pub scheme_admin: bool,
    pub scheme_editor: bool,
    pub scheme_commenter: bool,
    pub scheme_viewer: bool,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subscription {
    pub block_type: BlockType,
    pub block_id: String,
    pub subscriber_type: String,
    pub subscriber_id: String,
    pub notified_at: i64,
    pub create_at: i64,
    pub delete_at: i64,
}

/// Public read-token sharing settings for a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sharing {
    pub id: String,
    pub enabled: bool,
    pub token: String,
    pub modified_by: String,
    pub update_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(rename = "type")]
    pub login_type: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub mfa_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileUploadResponse {
    pub file_id: String,
}

/// Hint that a block changed and its subscribers should be notified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationHint {
    pub block_type: BlockType,
    pub block_id: String,
    pub modified_by_id: String,
    pub create_at: i64,
    pub notify_at: i64,
}

/// Activity summary for a board, as served by the board list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardMetadata {
    pub board_id: String,
    pub descendant_last_update_at: i64,
    pub descendant_first_update_at: i64,
    pub created_by: String,
    pub last_modified_by: String,
}

/// Which board attribute a user search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardSearchField {
    #[default]
    Title,
    PropertyName,
}

impl BoardSearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardSearchField::Title => "title",
            BoardSearchField::PropertyName => "property_name",
        }
    }
}

/// Where a content block lands relative to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPosition {
    Before,
    After,
}

impl ContentPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentPosition::Before => "before",
            ContentPosition::After => "after",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Team signup token; empty on open servers.
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsCloudLimits {
    pub cards: i64,
    pub used_cards: i64,
    pub card_limit_timestamp: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsStatistics {
    #[serde(rename = "board_count")]
    pub boards: i64,
    #[serde(rename = "card_count")]
    pub cards: i64,
}

/// One page of boards visible to compliance export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardsComplianceResponse {
    pub has_next: bool,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub results: Vec<Board>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardHistory {
    pub id: String,
    pub team_id: String,
    pub is_deleted: bool,
    pub descendant_last_update_at: i64,
    pub descendant_first_update_at: i64,
    pub created_by: String,
    pub last_modified_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardsComplianceHistoryResponse {
    pub has_next: bool,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub results: Vec<BoardHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockHistory {
    pub id: String,
    pub team_id: String,
    pub board_id: String,
    pub is_deleted: bool,
    pub last_update_at: i64,
    pub first_create_at: i64,
    pub created_by: String,
    pub last_modified_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlocksComplianceHistoryResponse {
    pub has_next: bool,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub results: Vec<BlockHistory>,
}

/// Activity on one board over the requested time range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardInsight {
    #[serde(rename = "boardID")]
    pub board_id: String,
    pub icon: String,
    pub title: String,
    pub activity_count: String,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub active_users: Vec<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardInsightsList {
    pub has_next: bool,
    #[serde(deserialize_with = "null_default::deserialize")]
    pub items: Vec<BoardInsight>,
}

/// Structured error body the server sends with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: i32,
}
