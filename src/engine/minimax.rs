use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};

use cozy_chess::Board;
use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::debug;

use crate::chess::{Move, Position};

use super::notation::{board_from_position, from_cozy_move, legal_moves};
use super::valuation::{material_valuation, piece_value, Valuation, INFINITY, MATE};
use super::{Engine, EngineError};

/// Fixed-depth negamax with alpha-beta pruning.
pub struct MinimaxEngine;

/*====================================================================================================================*/

struct MinimaxWorker<'a> {
    abort: &'a AtomicBool,
    nodes: u64,
}

impl<'a> MinimaxWorker<'a> {
    fn new(abort: &'a AtomicBool) -> Self {
        MinimaxWorker { abort, nodes: 0 }
    }

    fn negamax(
        &mut self,
        board: &Board,
        remaining_depth: u32,
        ply: i32,
        alpha: Valuation,
        beta: Valuation,
    ) -> Result<Valuation, EngineError> {
        if self.abort.load(Ordering::Relaxed) {
            // search has been called off, results don't matter anymore
            return Err(EngineError::Cancelled);
        }

        self.nodes += 1;

        let moves = legal_moves(board);

        if moves.is_empty() {
            // prefer shorter mates, postpone being mated
            return Ok(if board.checkers().is_empty() { 0 } else { -MATE + ply });
        }

        if board.halfmove_clock() >= 100 {
            return Ok(0);
        }

        if remaining_depth == 0 {
            return Ok(material_valuation(board));
        }

        let mut alpha = alpha;
        let mut best_value = -INFINITY;

        for mv in ordered(board, moves) {
            let mut board_after_move = board.clone();
            board_after_move.play_unchecked(mv);

            let value = -self.negamax(&board_after_move, remaining_depth - 1, ply + 1, -beta, -alpha)?;

            if value > best_value {
                best_value = value;
            }

            if best_value > alpha {
                alpha = best_value;
            }

            if alpha >= beta {
                // beta cutoff
                break;
            }
        }

        Ok(best_value)
    }

    fn search_root(&mut self, board: &Board, depth: u32) -> Result<(Vec<cozy_chess::Move>, Valuation), EngineError> {
        let mut best_moves = Vec::new();
        let mut best_value = -INFINITY;

        for mv in ordered(board, legal_moves(board)) {
            let mut board_after_move = board.clone();
            board_after_move.play_unchecked(mv);

            // window stays open at best_value so equally good moves are scored exactly
            let value = -self.negamax(&board_after_move, depth - 1, 1, -INFINITY, 1 - best_value)?;

            if value > best_value {
                best_value = value;
                best_moves.clear();
                best_moves.push(mv);
            } else if value == best_value {
                best_moves.push(mv);
            }
        }

        Ok((best_moves, best_value))
    }
}

// captures first, most valuable victim first
fn ordered(board: &Board, mut moves: Vec<cozy_chess::Move>) -> Vec<cozy_chess::Move> {
    let them = !board.side_to_move();

    moves.sort_by_key(|mv| {
        let victim = match board.color_on(mv.to) {
            Some(color) if color == them => board.piece_on(mv.to).map_or(0, piece_value),
            _ => 0,
        };
        let promotion = mv.promotion.map_or(0, piece_value);
        Reverse(victim + promotion)
    });

    moves
}

/*====================================================================================================================*/

impl Engine for MinimaxEngine {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn search(&self, position: &Position, depth: u32, abort: &AtomicBool) -> Result<Move, EngineError> {
        let board = board_from_position(position)?;
        let depth = depth.max(1);

        let mut worker = MinimaxWorker::new(abort);
        let (best_moves, best_value) = worker.search_root(&board, depth)?;

        // equally good moves: pick one at random so games don't repeat
        let best_move = *best_moves
            .choose(&mut thread_rng())
            .ok_or_else(|| EngineError::NoLegalMove(position.to_string()))?;

        debug!(
            nodes = worker.nodes,
            value = best_value,
            candidates = best_moves.len(),
            "minimax search finished at depth {depth}"
        );

        Ok(from_cozy_move(&board, best_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(fen: &str, depth: u32) -> Result<Move, EngineError> {
        MinimaxEngine.search(&fen.parse().unwrap(), depth, &AtomicBool::new(false))
    }

    #[test]
    fn finds_back_rank_mate() {
        let mv = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 2).unwrap();
        assert_eq!(mv.to_string(), "a1a8");
    }

    #[test]
    fn takes_hanging_queen() {
        let mv = search("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", 1).unwrap();
        assert_eq!(mv.to_string(), "d1d5");
    }

    #[test]
    fn depth_zero_still_picks_a_move() {
        assert!(search(crate::chess::START_FEN, 0).is_ok());
    }

    #[test]
    fn mated_side_has_no_move() {
        let result = search("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", 3);
        assert!(matches!(result, Err(EngineError::NoLegalMove(_))));
    }

    #[test]
    fn aborted_search_is_cancelled() {
        let abort = AtomicBool::new(true);
        let result = MinimaxEngine.search(&crate::chess::Position::start(), 3, &abort);
        assert_eq!(result, Err(EngineError::Cancelled));
    }
}
