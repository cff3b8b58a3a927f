use std::fmt::{Debug, Display};
use std::str::FromStr;

use super::{Color, Piece, PieceKind, Placement, Square};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("empty position")]
    Empty,
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} spans {width} files instead of 8")]
    RankWidth { rank: usize, width: usize },
    #[error("invalid piece character '{0}'")]
    PieceChar(char),
    #[error("invalid side to move \"{0}\"")]
    SideToMove(String),
    #[error("invalid castling rights \"{0}\"")]
    Castling(String),
    #[error("invalid en passant square \"{0}\"")]
    EnPassant(String),
    #[error("invalid move clock \"{0}\"")]
    Clock(String),
    #[error("expected at most 6 fields, found {0}")]
    TooManyFields(usize),
}

/*====================================================================================================================*/

/// A FEN position, validated on construction.
///
/// Board widgets only report the placement field, so everything after it is
/// optional; [`Position::complete`] fills in the rest when a full FEN is needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    fen: String,
    placement: Placement,
}

impl Position {
    pub fn start() -> Self {
        Position {
            fen: START_FEN.to_owned(),
            placement: Placement::start(),
        }
    }

    /// snapshot -> position (placement field only)
    pub fn encode(placement: &Placement) -> Self {
        Position {
            fen: placement.to_fen(),
            placement: placement.clone(),
        }
    }

    /// position -> snapshot
    pub fn decode(&self) -> Placement {
        self.placement.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.fen
    }

    pub fn is_complete(&self) -> bool {
        self.fen.split_ascii_whitespace().count() == 6
    }

    /// Fills the fields missing after the placement. `side` is only used if no side to move
    /// is given; castling rights are whatever kings and rooks on their home squares allow.
    pub fn complete(&self, side: Color) -> Position {
        if self.is_complete() {
            return self.clone();
        }

        let fields: Vec<&str> = self.fen.split_ascii_whitespace().collect();
        let castling = self.derived_castling();

        let side = side.fen_char().to_string();
        let defaults = [side.as_str(), castling.as_str(), "-", "0", "1"];

        let mut fen = fields[0].to_owned();
        for (i, &default) in defaults.iter().enumerate() {
            fen.push(' ');
            fen.push_str(fields.get(i + 1).copied().unwrap_or(default));
        }

        Position {
            fen,
            placement: self.placement.clone(),
        }
    }

    fn derived_castling(&self) -> String {
        let has = |color: Color, kind: PieceKind, file: u8, rank: u8| {
            self.placement.piece_at(Square::new(file, rank)) == Some(Piece::new(color, kind))
        };

        let mut rights = String::new();

        if has(Color::White, PieceKind::King, 4, 0) {
            if has(Color::White, PieceKind::Rook, 7, 0) {
                rights.push('K');
            }
            if has(Color::White, PieceKind::Rook, 0, 0) {
                rights.push('Q');
            }
        }
        if has(Color::Black, PieceKind::King, 4, 7) {
            if has(Color::Black, PieceKind::Rook, 7, 7) {
                rights.push('k');
            }
            if has(Color::Black, PieceKind::Rook, 0, 7) {
                rights.push('q');
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }

        rights
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_ascii_whitespace().collect();

        let placement = Placement::from_fen(fields.first().copied().unwrap_or(""))?;

        if fields.len() > 6 {
            return Err(PositionError::TooManyFields(fields.len()));
        }

        if let Some(&side) = fields.get(1) {
            if side != "w" && side != "b" {
                return Err(PositionError::SideToMove(side.to_owned()));
            }
        }

        if let Some(&castling) = fields.get(2) {
            let valid = castling == "-"
                || (!castling.is_empty()
                    && castling.chars().all(|c| "KQkq".contains(c))
                    && castling.chars().enumerate().all(|(i, c)| !castling[i + 1..].contains(c)));
            if !valid {
                return Err(PositionError::Castling(castling.to_owned()));
            }
        }

        if let Some(&en_passant) = fields.get(3) {
            let valid = en_passant == "-"
                || Square::from_coordinate(en_passant).map_or(false, |sq| sq.rank() == 2 || sq.rank() == 5);
            if !valid {
                return Err(PositionError::EnPassant(en_passant.to_owned()));
            }
        }

        for &clock in fields.iter().skip(4) {
            if clock.parse::<u32>().is_err() {
                return Err(PositionError::Clock(clock.to_owned()));
            }
        }

        Ok(Position {
            fen: fields.join(" "),
            placement,
        })
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fen)
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({:?})", self.fen)
    }
}
