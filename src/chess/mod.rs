use std::fmt::Display;
use std::str::FromStr;

mod moves;
mod piece;
mod placement;
mod position;
mod square;

pub use moves::{MalformedMoveError, Move};
pub use piece::{Piece, PieceKind};
pub use placement::Placement;
pub use position::{Position, PositionError, START_FEN};
pub use square::Square;

/*====================================================================================================================*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// side-to-move letter used in FEN
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

// flip the color, i.e. White -> Black and Black -> White
impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(format!("unknown color \"{s}\", expected white or black")),
        }
    }
}
