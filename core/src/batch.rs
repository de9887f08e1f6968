//! Structural validation for boards-and-blocks batch payloads.
//!
//! # Design
//! Validation is pure: it never mutates its input and never touches the
//! network, so the same input always yields the same result. Checks run in a
//! fixed order (boards, then blocks, then references) so the reported error
//! is deterministic when several invariants are broken at once.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Block, BlockPatch, Board, BoardPatch, BoardsAndBlocks, PatchBoardsAndBlocks};

/// Invariant violations detected before a batch is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("at least one board is required")]
    NoBoards,

    #[error("at least one block is required")]
    NoBlocks,

    /// A block references a board that is not part of the same batch.
    #[error("block {block_id} doesn't belong to any board")]
    OrphanBlock { block_id: String },

    #[error("board ids and patches need to match ({ids} ids, {patches} patches)")]
    BoardListMismatch { ids: usize, patches: usize },

    #[error("block ids and patches need to match ({ids} ids, {patches} patches)")]
    BlockListMismatch { ids: usize, patches: usize },
}

/// Check a create batch: at least one board, at least one block, and every
/// block's `board_id` naming a board in `boards`. Reports the first orphan in
/// block order.
pub fn validate_create_batch(boards: &[Board], blocks: &[Block]) -> Result<(), BatchError> {
    if boards.is_empty() {
        return Err(BatchError::NoBoards);
    }
    if blocks.is_empty() {
        return Err(BatchError::NoBlocks);
    }

    let board_ids: HashSet<&str> = boards.iter().map(|b| b.id.as_str()).collect();
    match blocks.iter().find(|block| !board_ids.contains(block.board_id.as_str())) {
        Some(orphan) => Err(BatchError::OrphanBlock {
            block_id: orphan.id.clone(),
        }),
        None => Ok(()),
    }
}

/// Check a patch batch. The patch at index `i` applies to the id at index
/// `i`, so each id list must be exactly as long as its patch list. An empty
/// block list is accepted; an empty board list is not.
pub fn validate_patch_batch(
    board_ids: &[String],
    board_patches: &[BoardPatch],
    block_ids: &[String],
    block_patches: &[BlockPatch],
) -> Result<(), BatchError> {
    if board_ids.is_empty() {
        return Err(BatchError::NoBoards);
    }
    if board_ids.len() != board_patches.len() {
        return Err(BatchError::BoardListMismatch {
            ids: board_ids.len(),
            patches: board_patches.len(),
        });
    }
    if block_ids.len() != block_patches.len() {
        return Err(BatchError::BlockListMismatch {
            ids: block_ids.len(),
            patches: block_patches.len(),
        });
    }
    Ok(())
}

impl BoardsAndBlocks {
    pub fn is_valid(&self) -> Result<(), BatchError> {
        validate_create_batch(&self.boards, &self.blocks)
    }
}

impl PatchBoardsAndBlocks {
    pub fn is_valid(&self) -> Result<(), BatchError> {
        validate_patch_batch(
            &self.board_ids,
            &self.board_patches,
            &self.block_ids,
            &self.block_patches,
        )
    }

    /// Iterate `(board_id, patch)` pairs in positional order.
    pub fn board_pairs(&self) -> impl Iterator<Item = (&str, &BoardPatch)> {
        self.board_ids.iter().map(String::as_str).zip(&self.board_patches)
    }

    /// Iterate `(block_id, patch)` pairs in positional order.
    pub fn block_pairs(&self) -> impl Iterator<Item = (&str, &BlockPatch)> {
        self.block_ids.iter().map(String::as_str).zip(&self.block_patches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(id: &str) -> Board {
        Board {
            id: id.to_string(),
            team_id: "team".to_string(),
            ..Default::default()
        }
    }

    fn block(id: &str, board_id: &str) -> Block {
        Block {
            id: id.to_string(),
            board_id: board_id.to_string(),
            ..Default::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn create_batch_with_matching_references_is_valid() {
        let boards = vec![board("A"), board("B")];
        let blocks = vec![block("c1", "A"), block("c2", "A"), block("c3", "B")];
        assert_eq!(validate_create_batch(&boards, &blocks), Ok(()));
    }

    #[test]
    fn create_batch_without_boards_fails_regardless_of_blocks() {
        assert_eq!(validate_create_batch(&[], &[]), Err(BatchError::NoBoards));
        assert_eq!(
            validate_create_batch(&[], &[block("c1", "zzz")]),
            Err(BatchError::NoBoards)
        );
    }

    #[test]
    fn create_batch_without_blocks_fails() {
        assert_eq!(validate_create_batch(&[board("b1")], &[]), Err(BatchError::NoBlocks));
    }

    #[test]
    fn create_batch_reports_orphan_block_id() {
        let err = validate_create_batch(&[board("b1")], &[block("c1", "zzz")]).unwrap_err();
        assert_eq!(
            err,
            BatchError::OrphanBlock {
                block_id: "c1".to_string()
            }
        );
        assert_eq!(err.to_string(), "block c1 doesn't belong to any board");
    }

    #[test]
    fn retargeting_one_block_makes_it_orphan() {
        let boards = vec![board("A"), board("B")];
        let mut blocks = vec![block("c1", "A"), block("c2", "A"), block("c3", "B")];
        assert!(validate_create_batch(&boards, &blocks).is_ok());

        blocks[2].board_id = "C".to_string();
        assert_eq!(
            validate_create_batch(&boards, &blocks),
            Err(BatchError::OrphanBlock {
                block_id: "c3".to_string()
            })
        );
    }

    #[test]
    fn first_orphan_in_block_order_is_reported() {
        let blocks = vec![block("c1", "A"), block("c2", "X"), block("c3", "Y")];
        assert_eq!(
            validate_create_batch(&[board("A")], &blocks),
            Err(BatchError::OrphanBlock {
                block_id: "c2".to_string()
            })
        );
    }

    #[test]
    fn patch_batch_requires_boards() {
        assert_eq!(validate_patch_batch(&[], &[], &[], &[]), Err(BatchError::NoBoards));
    }

    #[test]
    fn patch_batch_board_length_mismatch() {
        let err = validate_patch_batch(&ids(&["b1", "b2"]), &[BoardPatch::default()], &[], &[])
            .unwrap_err();
        assert_eq!(err, BatchError::BoardListMismatch { ids: 2, patches: 1 });
    }

    #[test]
    fn patch_batch_block_length_mismatch() {
        let err = validate_patch_batch(
            &ids(&["b1", "b2"]),
            &[BoardPatch::default(), BoardPatch::default()],
            &ids(&["c1", "c2"]),
            &vec![BlockPatch::default(); 3],
        )
        .unwrap_err();
        assert_eq!(err, BatchError::BlockListMismatch { ids: 2, patches: 3 });
    }

    #[test]
    fn patch_batch_without_blocks_is_valid() {
        let batch = PatchBoardsAndBlocks {
            board_ids: ids(&["b1"]),
            board_patches: vec![BoardPatch::default()],
            ..Default::default()
        };
        assert_eq!(batch.is_valid(), Ok(()));
    }

    #[test]
    fn board_mismatch_takes_precedence_over_block_mismatch() {
        let err = validate_patch_batch(&ids(&["b1"]), &[], &ids(&["c1"]), &[]).unwrap_err();
        assert!(matches!(err, BatchError::BoardListMismatch { .. }));
    }

    #[test]
    fn validation_is_repeatable() {
        let bab = BoardsAndBlocks {
            boards: vec![board("b1")],
            blocks: vec![block("c1", "nope")],
        };
        let first = bab.is_valid();
        let second = bab.is_valid();
        assert_eq!(first, second);
        assert!(first.is_err());
    }

    #[test]
    fn pairs_follow_positional_order() {
        let batch = PatchBoardsAndBlocks {
            board_ids: ids(&["b2", "b1"]),
            board_patches: vec![
                BoardPatch {
                    title: Some("second".to_string()),
                    ..Default::default()
                },
                BoardPatch {
                    title: Some("first".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let pairs: Vec<_> = batch
            .board_pairs()
            .map(|(id, patch)| (id, patch.title.as_deref()))
            .collect();
        assert_eq!(pairs, vec![("b2", Some("second")), ("b1", Some("first"))]);
        assert_eq!(batch.block_pairs().count(), 0);
    }
}
