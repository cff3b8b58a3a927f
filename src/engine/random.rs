use std::sync::atomic::AtomicBool;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::chess::{Move, Position};

use super::notation::{board_from_position, from_cozy_move, legal_moves};
use super::{Engine, EngineError};

/// picks any legal move, ignores depth
pub struct RandomEngine;

impl Engine for RandomEngine {
    fn name(&self) -> &'static str {
        "random"
    }

    fn search(&self, position: &Position, _depth: u32, _abort: &AtomicBool) -> Result<Move, EngineError> {
        let board = board_from_position(position)?;
        let moves = legal_moves(&board);

        moves
            .choose(&mut thread_rng())
            .map(|&mv| from_cozy_move(&board, mv))
            .ok_or_else(|| EngineError::NoLegalMove(position.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::notation::to_cozy_move;

    #[test]
    fn plays_a_legal_move() {
        let position = Position::start();
        let board = board_from_position(&position).unwrap();

        for _ in 0..20 {
            let mv = RandomEngine.search(&position, 0, &AtomicBool::new(false)).unwrap();
            assert!(to_cozy_move(&board, mv).is_some(), "{mv} is not legal");
        }
    }
}
