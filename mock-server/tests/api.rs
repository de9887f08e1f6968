use axum::http::{self, Request, StatusCode};
use axum::Router;
use boards_mock_server::{app, Block, Board, BoardsAndBlocks, ErrorBody, LoginResponse};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Requested-With", "XMLHttpRequest")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn login(app: &Router) -> String {
    let resp = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v2/login")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(r#"{"username":"alice","password":"pw"}"#.to_string())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json::<LoginResponse>(resp).await.token
}

// --- session ---

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = app();
    let resp = send(&app, request("GET", "/api/v2/users/me", "nope", "")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_code, 401);
}

#[tokio::test]
async fn missing_requested_with_is_rejected() {
    let app = app();
    let token = login(&app).await;
    let resp = send(
        &app,
        Request::builder()
            .uri("/api/v2/users/me")
            .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
            .body(String::new())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_returns_session_user() {
    let app = app();
    let token = login(&app).await;
    let resp = send(&app, request("GET", "/api/v2/users/me", &token, "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: serde_json::Value = body_json(resp).await;
    assert_eq!(me["username"], "alice");
}

// --- boards and blocks ---

#[tokio::test]
async fn create_batch_remaps_ids() {
    let app = app();
    let token = login(&app).await;
    let body = r#"{
        "boards":[
            {"id":"A","teamId":"t1","title":"Alpha"},
            {"id":"B","teamId":"t1","title":"Beta"}
        ],
        "blocks":[
            {"id":"c1","boardId":"A","parentId":"A"},
            {"id":"c2","boardId":"A","parentId":"c1"},
            {"id":"c3","boardId":"B"}
        ]
    }"#;
    let resp = send(&app, request("POST", "/api/v2/boards-and-blocks", &token, body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: BoardsAndBlocks = body_json(resp).await;

    let alpha = created.boards.iter().find(|b| b.title == "Alpha").unwrap();
    assert_ne!(alpha.id, "A");
    let c1 = &created.blocks[0];
    let c2 = &created.blocks[1];
    assert_eq!(c1.board_id, alpha.id);
    assert_eq!(c1.parent_id, alpha.id);
    assert_eq!(c2.parent_id, c1.id);

    let resp = send(&app, request("GET", "/api/v2/teams/t1/boards", &token, "")).await;
    let boards: Vec<Board> = body_json(resp).await;
    assert_eq!(boards.len(), 2);
}

#[tokio::test]
async fn create_batch_with_orphan_is_rejected() {
    let app = app();
    let token = login(&app).await;
    let body = r#"{"boards":[{"id":"A","teamId":"t1"}],"blocks":[{"id":"c1","boardId":"C"}]}"#;
    let resp = send(&app, request("POST", "/api/v2/boards-and-blocks", &token, body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error, "block c1 doesn't belong to any board");
}

#[tokio::test]
async fn patch_batch_is_all_or_nothing() {
    let app = app();
    let token = login(&app).await;
    let resp = send(
        &app,
        request("POST", "/api/v2/boards", &token, r#"{"teamId":"t1","title":"Old"}"#),
    )
    .await;
    let board: Board = body_json(resp).await;

    let body = format!(
        concat!(
            r#"{{"boardIDs":["{}","missing"],"boardPatches":[{{"title":"New"}},{{}}],"#,
            r#""blockIDs":[],"blockPatches":[]}}"#
        ),
        board.id
    );
    let resp = send(&app, request("PATCH", "/api/v2/boards-and-blocks", &token, &body)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let uri = format!("/api/v2/boards/{}", board.id);
    let resp = send(&app, request("GET", &uri, &token, "")).await;
    let unchanged: Board = body_json(resp).await;
    assert_eq!(unchanged.title, "Old");
}

#[tokio::test]
async fn blocks_listing_honors_if_none_match() {
    let app = app();
    let token = login(&app).await;
    let resp = send(&app, request("POST", "/api/v2/boards", &token, r#"{"teamId":"t1"}"#)).await;
    let board: Board = body_json(resp).await;
    let uri = format!("/api/v2/boards/{}/blocks", board.id);

    let resp = send(&app, request("POST", &uri, &token, r#"[{"title":"first"}]"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, request("GET", &uri, &token, "")).await;
    let etag = resp.headers()[http::header::ETAG].to_str().unwrap().to_string();
    let blocks: Vec<Block> = body_json(resp).await;
    assert_eq!(blocks.len(), 1);

    let mut conditional = request("GET", &uri, &token, "");
    conditional
        .headers_mut()
        .insert(http::header::IF_NONE_MATCH, etag.parse().unwrap());
    let resp = send(&app, conditional).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn delete_batch_removes_board_blocks() {
    let app = app();
    let token = login(&app).await;
    let body = r#"{"boards":[{"id":"A","teamId":"t1"}],"blocks":[{"id":"c1","boardId":"A"}]}"#;
    let resp = send(&app, request("POST", "/api/v2/boards-and-blocks", &token, body)).await;
    let created: BoardsAndBlocks = body_json(resp).await;
    let board_id = created.boards[0].id.clone();

    let body = format!(r#"{{"boards":["{board_id}"],"blocks":[]}}"#);
    let resp = send(&app, request("DELETE", "/api/v2/boards-and-blocks", &token, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let uri = format!("/api/v2/boards/{board_id}/blocks");
    let resp = send(&app, request("GET", &uri, &token, "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
