use cozy_chess::{BitBoard, Board, Color, Piece};

pub type Valuation = i32;

pub const MATE: Valuation = 1_000_000;
pub const INFINITY: Valuation = MATE + 1;

// d4, e4, d5, e5
const CENTRE: BitBoard = BitBoard(0x0000_0018_1800_0000);
const CENTRE_BONUS: Valuation = 10;

pub fn piece_value(piece: Piece) -> Valuation {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

fn side_score(board: &Board, color: Color) -> Valuation {
    let material: Valuation = Piece::ALL
        .iter()
        .map(|&piece| board.colored_pieces(color, piece).len() as Valuation * piece_value(piece))
        .sum();

    let centre = (board.colors(color) & CENTRE).len() as Valuation * CENTRE_BONUS;

    material + centre
}

/// material and centre control, from the side to move's perspective
pub fn material_valuation(board: &Board) -> Valuation {
    let us = board.side_to_move();
    side_score(board, us) - side_score(board, !us)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(material_valuation(&Board::default()), 0);
    }

    #[test]
    fn valuation_is_relative_to_side_to_move() {
        // white is a queen up
        let white_to_move: Board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1", false).unwrap();
        let black_to_move: Board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1", false).unwrap();

        assert_eq!(material_valuation(&white_to_move), 900);
        assert_eq!(material_valuation(&black_to_move), -900);
    }
}
