//! Route paths relative to the API url.
//!
//! Ids are opaque server-issued strings and are inserted as-is; query values
//! go through `with_query`, which form-encodes them.

use url::form_urlencoded;

pub fn teams() -> String {
    "/teams".to_string()
}

pub fn team(team_id: &str) -> String {
    format!("{}/{team_id}", teams())
}

pub fn team_boards(team_id: &str) -> String {
    format!("{}/boards", team(team_id))
}

pub fn team_board_search(team_id: &str) -> String {
    format!("{}/boards/search", team(team_id))
}

pub fn team_templates(team_id: &str) -> String {
    format!("{}/templates", team(team_id))
}

pub fn team_board_insights(team_id: &str) -> String {
    format!("{}/boards/insights", team(team_id))
}

/// Upload target for files attached to a board.
pub fn team_files(team_id: &str, board_id: &str) -> String {
    format!("{}/{board_id}/files", team(team_id))
}

pub fn import_archive(team_id: &str) -> String {
    format!("{}/archive/import", team(team_id))
}

pub fn categories(team_id: &str) -> String {
    format!("{}/categories", team(team_id))
}

pub fn category(team_id: &str, category_id: &str) -> String {
    format!("{}/{category_id}", categories(team_id))
}

pub fn reorder_categories(team_id: &str) -> String {
    format!("{}/reorder", categories(team_id))
}

pub fn reorder_category_boards(team_id: &str, category_id: &str) -> String {
    format!("{}/reorder", category(team_id, category_id))
}

pub fn category_board(team_id: &str, category_id: &str, board_id: &str) -> String {
    format!("{}/boards/{board_id}", category(team_id, category_id))
}

pub fn hide_board(team_id: &str, category_id: &str, board_id: &str) -> String {
    format!("{}/hide", category_board(team_id, category_id, board_id))
}

pub fn unhide_board(team_id: &str, category_id: &str, board_id: &str) -> String {
    format!("{}/unhide", category_board(team_id, category_id, board_id))
}

pub fn boards() -> String {
    "/boards".to_string()
}

pub fn board(board_id: &str) -> String {
    format!("{}/{board_id}", boards())
}

pub fn board_metadata(board_id: &str) -> String {
    format!("{}/metadata", board(board_id))
}

pub fn export_board_archive(board_id: &str) -> String {
    format!("{}/archive/export", board(board_id))
}

pub fn undelete_board(board_id: &str) -> String {
    format!("{}/undelete", board(board_id))
}

pub fn duplicate_board(board_id: &str) -> String {
    format!("{}/duplicate", board(board_id))
}

pub fn join_board(board_id: &str) -> String {
    format!("{}/join", board(board_id))
}

pub fn leave_board(board_id: &str) -> String {
    format!("{}/leave", board(board_id))
}

pub fn members(board_id: &str) -> String {
    format!("{}/members", board(board_id))
}

pub fn member(board_id: &str, user_id: &str) -> String {
    format!("{}/{user_id}", members(board_id))
}

pub fn sharing(board_id: &str) -> String {
    format!("{}/sharing", board(board_id))
}

pub fn blocks(board_id: &str) -> String {
    format!("{}/blocks", board(board_id))
}

pub fn block(board_id: &str, block_id: &str) -> String {
    format!("{}/{block_id}", blocks(board_id))
}

pub fn undelete_block(board_id: &str, block_id: &str) -> String {
    format!("{}/undelete", block(board_id, block_id))
}

pub fn duplicate_block(board_id: &str, block_id: &str) -> String {
    format!("{}/duplicate", block(board_id, block_id))
}

pub fn move_content_block(src_block_id: &str, position: &str, dst_block_id: &str) -> String {
    format!("/content-blocks/{src_block_id}/moveto/{position}/{dst_block_id}")
}

pub fn board_cards(board_id: &str) -> String {
    format!("{}/cards", board(board_id))
}

pub fn card(card_id: &str) -> String {
    format!("/cards/{card_id}")
}

pub fn boards_and_blocks() -> String {
    "/boards-and-blocks".to_string()
}

pub fn subscriptions() -> String {
    "/subscriptions".to_string()
}

pub fn subscriber_subscriptions(subscriber_id: &str) -> String {
    format!("{}/{subscriber_id}", subscriptions())
}

pub fn subscription(block_id: &str, subscriber_id: &str) -> String {
    format!("{}/{block_id}/{subscriber_id}", subscriptions())
}

pub fn login() -> String {
    "/login".to_string()
}

pub fn register() -> String {
    "/register".to_string()
}

pub fn users() -> String {
    "/users".to_string()
}

pub fn me() -> String {
    "/users/me".to_string()
}

pub fn user(user_id: &str) -> String {
    format!("{}/{user_id}", users())
}

pub fn change_password(user_id: &str) -> String {
    format!("{}/changepassword", user(user_id))
}

pub fn my_board_insights() -> String {
    format!("{}/boards/insights", me())
}

pub fn limits() -> String {
    "/limits".to_string()
}

pub fn statistics() -> String {
    "/statistics".to_string()
}

pub fn compliance_boards() -> String {
    "/admin/boards".to_string()
}

pub fn compliance_boards_history() -> String {
    "/admin/boards_history".to_string()
}

pub fn compliance_blocks_history() -> String {
    "/admin/blocks_history".to_string()
}

/// Append `params` as a query string. Pairs with an empty value are left
/// out, which is how optional parameters are expressed.
pub fn with_query(path: String, params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        serializer.append_pair(key, value);
        any = true;
    }
    if !any {
        return path;
    }
    format!("{path}?{}", serializer.finish())
}
