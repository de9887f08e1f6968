//! Verify batch validation against JSON test vectors stored in `test-vectors/`.
//!
//! Each case holds a wire-format payload and, for failures, the expected
//! error kind. Decoding through serde first means the vectors also pin the
//! JSON key names the validator sees.

use boards_client::{BatchError, BoardsAndBlocks, PatchBoardsAndBlocks};

fn vectors() -> serde_json::Value {
    let raw = include_str!("../../test-vectors/batch.json");
    serde_json::from_str(raw).unwrap()
}

fn error_kind(err: &BatchError) -> &'static str {
    match err {
        BatchError::NoBoards => "NoBoards",
        BatchError::NoBlocks => "NoBlocks",
        BatchError::OrphanBlock { .. } => "OrphanBlock",
        BatchError::BoardListMismatch { .. } => "BoardListMismatch",
        BatchError::BlockListMismatch { .. } => "BlockListMismatch",
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_batch_vectors() {
    let vectors = vectors();
    for case in vectors["create_cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let batch: BoardsAndBlocks = serde_json::from_value(case["input"].clone()).unwrap();
        let result = batch.is_valid();

        match case.get("expected_error") {
            Some(expected) => {
                let err = result.unwrap_err();
                assert_eq!(error_kind(&err), expected.as_str().unwrap(), "{name}: error kind");
                if let Some(block_id) = case.get("expected_block_id") {
                    assert_eq!(
                        err,
                        BatchError::OrphanBlock {
                            block_id: block_id.as_str().unwrap().to_string()
                        },
                        "{name}: orphan id"
                    );
                }
            }
            None => assert!(result.is_ok(), "{name}: expected valid, got {result:?}"),
        }

        assert_eq!(batch.is_valid(), batch.is_valid(), "{name}: repeatable");
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

#[test]
fn patch_batch_vectors() {
    let vectors = vectors();
    for case in vectors["patch_cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let batch: PatchBoardsAndBlocks = serde_json::from_value(case["input"].clone()).unwrap();
        let result = batch.is_valid();

        match case.get("expected_error") {
            Some(expected) => {
                let err = result.unwrap_err();
                assert_eq!(error_kind(&err), expected.as_str().unwrap(), "{name}: error kind");
            }
            None => assert!(result.is_ok(), "{name}: expected valid, got {result:?}"),
        }
    }
}
