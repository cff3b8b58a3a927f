//! Conversions between the wire types and `cozy-chess`.
//!
//! `cozy-chess` writes castling as the king capturing its own rook (`e1h1`),
//! the wire and board widgets use the king's destination (`e1g1`).

use cozy_chess::{Board, File};

use crate::chess::{Color, Move, PieceKind, Position, Square};

use super::EngineError;

impl From<Color> for cozy_chess::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::White => cozy_chess::Color::White,
            Color::Black => cozy_chess::Color::Black,
        }
    }
}

pub fn color_from_cozy(color: cozy_chess::Color) -> Color {
    match color {
        cozy_chess::Color::White => Color::White,
        cozy_chess::Color::Black => Color::Black,
    }
}

fn kind_from_cozy(piece: cozy_chess::Piece) -> PieceKind {
    match piece {
        cozy_chess::Piece::Pawn => PieceKind::Pawn,
        cozy_chess::Piece::Knight => PieceKind::Knight,
        cozy_chess::Piece::Bishop => PieceKind::Bishop,
        cozy_chess::Piece::Rook => PieceKind::Rook,
        cozy_chess::Piece::Queen => PieceKind::Queen,
        cozy_chess::Piece::King => PieceKind::King,
    }
}

fn square_from_cozy(square: cozy_chess::Square) -> Square {
    Square::from_index(square as usize)
}

/// Parses a complete position. Placement-only positions have to be completed first.
pub fn board_from_position(position: &Position) -> Result<Board, EngineError> {
    Board::from_fen(position.as_str(), false).map_err(|err| EngineError::InvalidPosition {
        position: position.to_string(),
        reason: format!("{err:?}"),
    })
}

pub fn from_cozy_move(board: &Board, mv: cozy_chess::Move) -> Move {
    let castles = board.piece_on(mv.from) == Some(cozy_chess::Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());

    let destination = if castles {
        let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
        cozy_chess::Square::new(file, mv.to.rank())
    } else {
        mv.to
    };

    Move {
        origin: square_from_cozy(mv.from),
        destination: square_from_cozy(destination),
        promotion: mv.promotion.map(kind_from_cozy),
    }
}

pub fn legal_moves(board: &Board) -> Vec<cozy_chess::Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

/// the legal move that has `mv` as its wire form, if any
pub fn to_cozy_move(board: &Board, mv: Move) -> Option<cozy_chess::Move> {
    legal_moves(board)
        .into_iter()
        .find(|&legal| from_cozy_move(board, legal) == mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        board_from_position(&fen.parse().unwrap()).unwrap()
    }

    #[test]
    fn castling_uses_king_destination() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");

        let short = to_cozy_move(&board, "e1g1".parse().unwrap()).unwrap();
        assert_eq!(short.to_string(), "e1h1");
        assert_eq!(from_cozy_move(&board, short).to_string(), "e1g1");

        let long = to_cozy_move(&board, "e1c1".parse().unwrap()).unwrap();
        assert_eq!(long.to_string(), "e1a1");
    }

    #[test]
    fn promotion_survives_conversion() {
        let board = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let mv = to_cozy_move(&board, "e7e8q".parse().unwrap()).unwrap();
        assert_eq!(mv.promotion, Some(cozy_chess::Piece::Queen));
        assert_eq!(to_cozy_move(&board, "e7e8".parse().unwrap()), None);
    }

    #[test]
    fn illegal_or_incomplete_positions_are_rejected() {
        assert_eq!(to_cozy_move(&board(crate::chess::START_FEN), "e2e5".parse().unwrap()), None);

        let placement_only = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".parse().unwrap();
        assert!(matches!(
            board_from_position(&placement_only),
            Err(EngineError::InvalidPosition { .. })
        ));
    }
}
