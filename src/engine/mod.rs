use std::fmt::Display;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::chess::{Move, Position};

mod adapter;
mod minimax;
mod notation;
mod random;
mod valuation;

pub use adapter::{EngineAdapter, Ticket};
pub use minimax::MinimaxEngine;
pub use notation::{board_from_position, color_from_cozy, from_cozy_move, legal_moves, to_cozy_move};
pub use random::RandomEngine;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine cannot search position \"{position}\": {reason}")]
    InvalidPosition { position: String, reason: String },
    #[error("no legal move in position \"{0}\"")]
    NoLegalMove(String),
    #[error("search was cancelled")]
    Cancelled,
    #[error("search crashed: {0}")]
    Crashed(String),
}

/// A move-search function. Implementations hold no per-game state.
pub trait Engine: Send + Sync {
    fn name(&self) -> &'static str;

    /// `position` has to be complete; searches poll `abort` and give up with `Cancelled`
    fn search(&self, position: &Position, depth: u32, abort: &AtomicBool) -> Result<Move, EngineError>;
}

/*====================================================================================================================*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Minimax,
    Random,
}

impl EngineKind {
    pub fn build(self) -> Arc<dyn Engine> {
        match self {
            EngineKind::Minimax => Arc::new(MinimaxEngine),
            EngineKind::Random => Arc::new(RandomEngine),
        }
    }
}

impl Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Minimax => write!(f, "minimax"),
            EngineKind::Random => write!(f, "random"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimax" => Ok(EngineKind::Minimax),
            "random" => Ok(EngineKind::Random),
            _ => Err(format!("unknown engine \"{s}\", expected minimax or random")),
        }
    }
}
