use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Request, State},
    http::{
        header::{AUTHORIZATION, ETAG, IF_NONE_MATCH},
        HeaderMap, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub team_id: String,
    #[serde(rename = "type")]
    pub board_type: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub create_at: i64,
    pub update_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub board_id: String,
    pub parent_id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub title: String,
    pub fields: Map<String, Value>,
    pub create_at: i64,
    pub update_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardPatch {
    #[serde(rename = "type")]
    pub board_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockPatch {
    pub parent_id: Option<String>,
    pub title: Option<String>,
    pub updated_fields: Map<String, Value>,
    pub deleted_fields: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsAndBlocks {
    pub boards: Vec<Board>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatchBoardsAndBlocks {
    #[serde(rename = "boardIDs")]
    pub board_ids: Vec<String>,
    #[serde(rename = "boardPatches")]
    pub board_patches: Vec<BoardPatch>,
    #[serde(rename = "blockIDs")]
    pub block_ids: Vec<String>,
    #[serde(rename = "blockPatches")]
    pub block_patches: Vec<BlockPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteBoardsAndBlocks {
    pub boards: Vec<String>,
    pub blocks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub error_code: u16,
}

/// Error response in the `{"error": ..., "errorCode": ...}` shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            error_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    boards: HashMap<String, Board>,
    blocks: HashMap<String, Block>,
    sessions: HashMap<String, User>,
    /// Bumped on every board or block mutation; doubles as the blocks ETag.
    version: u64,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));

    let protected = Router::new()
        .route("/users/me", get(get_me))
        .route("/teams/{team_id}/boards", get(team_boards))
        .route("/boards", post(create_board))
        .route("/boards/{id}", get(get_board).patch(patch_board).delete(delete_board))
        .route("/boards/{id}/blocks", get(list_blocks).post(insert_blocks))
        .route(
            "/boards-and-blocks",
            post(create_boards_and_blocks)
                .patch(patch_boards_and_blocks)
                .delete(delete_boards_and_blocks),
        )
        .route_layer(middleware::from_fn_with_state(db.clone(), require_session));

    let api = Router::new()
        .route("/login", post(login))
        .merge(protected)
        .with_state(db);

    Router::new().nest("/api/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stamp a board being created; boards without a type are open.
fn init_board(board: &mut Board, id: String, now: i64) {
    board.id = id;
    if board.board_type.is_empty() {
        board.board_type = "O".to_string();
    }
    board.create_at = now;
    board.update_at = now;
}

/// Same invariants the client checks before sending a create batch.
pub fn validate_new_batch(batch: &BoardsAndBlocks) -> Result<(), ApiFailure> {
    if batch.boards.is_empty() {
        return Err(ApiFailure::bad_request("at least one board is required"));
    }
    if batch.blocks.is_empty() {
        return Err(ApiFailure::bad_request("at least one block is required"));
    }
    let board_ids: HashSet<&str> = batch.boards.iter().map(|b| b.id.as_str()).collect();
    if let Some(orphan) = batch
        .blocks
        .iter()
        .find(|b| !board_ids.contains(b.board_id.as_str()))
    {
        return Err(ApiFailure::bad_request(format!(
            "block {} doesn't belong to any board",
            orphan.id
        )));
    }
    if batch.boards.iter().any(|b| b.team_id.is_empty()) {
        return Err(ApiFailure::bad_request("team ID cannot be empty"));
    }
    Ok(())
}

/// Same invariants the client checks before sending a patch batch.
pub fn validate_patch_batch(batch: &PatchBoardsAndBlocks) -> Result<(), ApiFailure> {
    if batch.board_ids.is_empty() {
        return Err(ApiFailure::bad_request("at least one board is required"));
    }
    if batch.board_ids.len() != batch.board_patches.len() {
        return Err(ApiFailure::bad_request("board ids and patches need to match"));
    }
    if batch.block_ids.len() != batch.block_patches.len() {
        return Err(ApiFailure::bad_request("block ids and patches need to match"));
    }
    Ok(())
}

async fn require_session(
    State(db): State<Db>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let headers = request.headers();
    let requested_with = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");
    if !requested_with {
        return Err(ApiFailure::bad_request("missing X-Requested-With header"));
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let user = match token {
        Some(token) => db.read().await.sessions.get(&token).cloned(),
        None => None,
    };
    let Some(user) = user else {
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, "unauthorized"));
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, "invalid username or password"));
    }
    let token = new_id();
    let user = User {
        id: format!("user-{}", input.username),
        username: input.username,
    };
    info!(user = %user.id, "session created");
    db.write().await.sessions.insert(token.clone(), user);
    Ok(Json(LoginResponse { token }))
}

async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

async fn team_boards(State(db): State<Db>, Path(team_id): Path<String>) -> Json<Vec<Board>> {
    let store = db.read().await;
    let mut boards: Vec<Board> = store
        .boards
        .values()
        .filter(|b| b.team_id == team_id)
        .cloned()
        .collect();
    boards.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
    Json(boards)
}

async fn create_board(
    State(db): State<Db>,
    Json(mut board): Json<Board>,
) -> Result<Json<Board>, ApiFailure> {
    if board.team_id.is_empty() {
        return Err(ApiFailure::bad_request("team ID cannot be empty"));
    }
    init_board(&mut board, new_id(), now_millis());

    let mut store = db.write().await;
    store.boards.insert(board.id.clone(), board.clone());
    store.version += 1;
    Ok(Json(board))
}

async fn get_board(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Board>, ApiFailure> {
    let store = db.read().await;
    store
        .boards
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found(format!("board {id} not found")))
}

fn apply_board_patch(board: &mut Board, patch: BoardPatch, now: i64) {
    if let Some(board_type) = patch.board_type {
        board.board_type = board_type;
    }
    if let Some(title) = patch.title {
        board.title = title;
    }
    if let Some(description) = patch.description {
        board.description = description;
    }
    if let Some(icon) = patch.icon {
        board.icon = icon;
    }
    board.update_at = now;
}

fn apply_block_patch(block: &mut Block, patch: BlockPatch, now: i64) {
    if let Some(parent_id) = patch.parent_id {
        block.parent_id = parent_id;
    }
    if let Some(title) = patch.title {
        block.title = title;
    }
    for (key, value) in patch.updated_fields {
        block.fields.insert(key, value);
    }
    for key in &patch.deleted_fields {
        block.fields.remove(key);
    }
    block.update_at = now;
}

async fn patch_board(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(patch): Json<BoardPatch>,
) -> Result<Json<Board>, ApiFailure> {
    let mut store = db.write().await;
    let board = store
        .boards
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found(format!("board {id} not found")))?;
    apply_board_patch(board, patch, now_millis());
    let board = board.clone();
    store.version += 1;
    Ok(Json(board))
}

async fn delete_board(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    if store.boards.remove(&id).is_none() {
        return Err(ApiFailure::not_found(format!("board {id} not found")));
    }
    store.blocks.retain(|_, b| b.board_id != id);
    store.version += 1;
    Ok(StatusCode::OK)
}

async fn list_blocks(
    State(db): State<Db>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiFailure> {
    let store = db.read().await;
    if !store.boards.contains_key(&board_id) {
        return Err(ApiFailure::not_found(format!("board {board_id} not found")));
    }

    let etag = format!("\"{}\"", store.version);
    let unchanged = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if unchanged {
        debug!(%board_id, %etag, "blocks not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag)]).into_response());
    }

    let mut blocks: Vec<Block> = store
        .blocks
        .values()
        .filter(|b| b.board_id == board_id)
        .cloned()
        .collect();
    blocks.sort_by(|a, b| a.create_at.cmp(&b.create_at).then_with(|| a.id.cmp(&b.id)));
    Ok(([(ETAG, etag)], Json(blocks)).into_response())
}

async fn insert_blocks(
    State(db): State<Db>,
    Path(board_id): Path<String>,
    Json(blocks): Json<Vec<Block>>,
) -> Result<Json<Vec<Block>>, ApiFailure> {
    let mut store = db.write().await;
    if !store.boards.contains_key(&board_id) {
        return Err(ApiFailure::not_found(format!("board {board_id} not found")));
    }

    let now = now_millis();
    let inserted: Vec<Block> = blocks
        .into_iter()
        .map(|mut block| {
            if block.id.is_empty() {
                block.id = new_id();
            }
            block.board_id = board_id.clone();
            block.create_at = now;
            block.update_at = now;
            block
        })
        .collect();
    for block in &inserted {
        store.blocks.insert(block.id.clone(), block.clone());
    }
    store.version += 1;
    Ok(Json(inserted))
}

/// Creates boards and blocks under fresh ids, rewriting block references
/// to follow their boards (and parents) to the new ids.
async fn create_boards_and_blocks(
    State(db): State<Db>,
    Json(input): Json<BoardsAndBlocks>,
) -> Result<Json<BoardsAndBlocks>, ApiFailure> {
    validate_new_batch(&input)?;

    let now = now_millis();
    let board_ids: HashMap<String, String> =
        input.boards.iter().map(|b| (b.id.clone(), new_id())).collect();
    let block_ids: HashMap<String, String> =
        input.blocks.iter().map(|b| (b.id.clone(), new_id())).collect();

    let boards: Vec<Board> = input
        .boards
        .into_iter()
        .map(|mut board| {
            let id = board_ids.get(&board.id).cloned().unwrap_or_else(new_id);
            init_board(&mut board, id, now);
            board
        })
        .collect();

    let blocks: Vec<Block> = input
        .blocks
        .into_iter()
        .map(|mut block| {
            if let Some(id) = block_ids.get(&block.id) {
                block.id = id.clone();
            }
            if let Some(id) = board_ids.get(&block.board_id) {
                block.board_id = id.clone();
            }
            let parent = block_ids
                .get(&block.parent_id)
                .or_else(|| board_ids.get(&block.parent_id));
            if let Some(id) = parent {
                block.parent_id = id.clone();
            }
            block.create_at = now;
            block.update_at = now;
            block
        })
        .collect();

    let mut store = db.write().await;
    for board in &boards {
        store.boards.insert(board.id.clone(), board.clone());
    }
    for block in &blocks {
        store.blocks.insert(block.id.clone(), block.clone());
    }
    store.version += 1;
    info!(boards = boards.len(), blocks = blocks.len(), "boards and blocks created");

    Ok(Json(BoardsAndBlocks { boards, blocks }))
}

/// Applies every patch or none: all targets are checked before any write.
async fn patch_boards_and_blocks(
    State(db): State<Db>,
    Json(input): Json<PatchBoardsAndBlocks>,
) -> Result<Json<BoardsAndBlocks>, ApiFailure> {
    validate_patch_batch(&input)?;

    let mut store = db.write().await;
    for id in &input.board_ids {
        if !store.boards.contains_key(id) {
            return Err(ApiFailure::not_found(format!("board {id} not found")));
        }
    }
    for id in &input.block_ids {
        let block = store
            .blocks
            .get(id)
            .ok_or_else(|| ApiFailure::not_found(format!("block {id} not found")))?;
        if !input.board_ids.contains(&block.board_id) {
            return Err(ApiFailure::bad_request(format!(
                "block {id} doesn't belong to any board"
            )));
        }
    }

    let now = now_millis();
    let mut result = BoardsAndBlocks::default();
    for (id, patch) in input.board_ids.iter().zip(input.board_patches) {
        if let Some(board) = store.boards.get_mut(id) {
            apply_board_patch(board, patch, now);
            result.boards.push(board.clone());
        }
    }
    for (id, patch) in input.block_ids.iter().zip(input.block_patches) {
        if let Some(block) = store.blocks.get_mut(id) {
            apply_block_patch(block, patch, now);
            result.blocks.push(block.clone());
        }
    }
    store.version += 1;

    Ok(Json(result))
}

async fn delete_boards_and_blocks(
    State(db): State<Db>,
    Json(input): Json<DeleteBoardsAndBlocks>,
) -> StatusCode {
    let mut store = db.write().await;
    for id in &input.boards {
        store.boards.remove(id);
    }
    let deleted_boards: HashSet<&String> = input.boards.iter().collect();
    store
        .blocks
        .retain(|id, b| !deleted_boards.contains(&b.board_id) && !input.blocks.contains(id));
    store.version += 1;
    StatusCode::OK
}
