use std::fmt::{Debug, Display};

use super::{Color, Move, Piece, PieceKind, PositionError, Square};

/// Piece placement of a board, i.e. the snapshot a board widget holds.
///
/// Moves are applied freely: any piece may go anywhere, nothing is checked
/// beyond the origin square being occupied.
#[derive(Clone, PartialEq, Eq)]
pub struct Placement {
    squares: [Option<Piece>; 64],
}

impl Placement {
    pub fn empty() -> Self {
        Placement { squares: [None; 64] }
    }

    pub fn start() -> Self {
        use PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut placement = Placement::empty();

        for (file, kind) in (0..8).zip(BACK_RANK) {
            placement.set(Square::new(file, 0), Some(Piece::new(Color::White, kind)));
            placement.set(Square::new(file, 1), Some(Piece::new(Color::White, Pawn)));
            placement.set(Square::new(file, 6), Some(Piece::new(Color::Black, Pawn)));
            placement.set(Square::new(file, 7), Some(Piece::new(Color::Black, kind)));
        }

        placement
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index()] = piece;
    }

    /// Moves whatever stands on the origin square, capturing what stands on the destination.
    /// A king moving two files along its rank takes the corner rook with it.
    ///
    /// Returns false if the origin square is empty.
    pub fn apply_move(&mut self, mv: Move) -> bool {
        let piece = match self.piece_at(mv.origin) {
            Some(piece) => piece,
            None => return false,
        };

        let placed = match mv.promotion {
            Some(kind) => Piece::new(piece.color, kind),
            None => piece,
        };

        self.set(mv.origin, None);
        self.set(mv.destination, Some(placed));

        if piece.kind == PieceKind::King && mv.origin.rank() == mv.destination.rank() {
            let rank = mv.origin.rank();
            let rook_files = match mv.destination.file() as i8 - mv.origin.file() as i8 {
                2 => Some((7, 5)),
                -2 => Some((0, 3)),
                _ => None,
            };

            if let Some((from_file, to_file)) = rook_files {
                let corner = Square::new(from_file, rank);
                if self.piece_at(corner) == Some(Piece::new(piece.color, PieceKind::Rook)) {
                    self.set(corner, None);
                    self.set(Square::new(to_file, rank), Some(Piece::new(piece.color, PieceKind::Rook)));
                }
            }
        }

        true
    }

    /// placement field of a FEN, ranks 8 to 1
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(72);

        for rank in (0..8).rev() {
            let mut empty = 0;

            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }

    pub fn from_fen(field: &str) -> Result<Self, PositionError> {
        if field.is_empty() {
            return Err(PositionError::Empty);
        }

        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(PositionError::RankCount(ranks.len()));
        }

        let mut placement = Placement::empty();

        // FEN lists rank 8 first
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file: u32 = 0;

            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(PositionError::PieceChar(c))?;
                    if file >= 8 {
                        return Err(PositionError::RankWidth {
                            rank: rank as usize + 1,
                            width: file as usize + 1,
                        });
                    }
                    placement.set(Square::new(file as u8, rank), Some(piece));
                    file += 1;
                }
            }

            if file != 8 {
                return Err(PositionError::RankWidth {
                    rank: rank as usize + 1,
                    width: file as usize,
                });
            }
        }

        Ok(placement)
    }

    /// text diagram with `orientation` at the bottom
    pub fn render(&self, orientation: Color) -> String {
        let ranks: Vec<u8> = match orientation {
            Color::White => (0..8).rev().collect(),
            Color::Black => (0..8).collect(),
        };
        let files: Vec<u8> = match orientation {
            Color::White => (0..8).collect(),
            Color::Black => (0..8).rev().collect(),
        };

        let mut out = String::new();

        for &rank in &ranks {
            out.push(char::from(b'1' + rank));
            out.push(' ');
            for &file in &files {
                out.push(' ');
                out.push(self.piece_at(Square::new(file, rank)).map_or('.', Piece::fen_char));
            }
            out.push('\n');
        }

        out.push_str("  ");
        for &file in &files {
            out.push(' ');
            out.push(char::from(b'a' + file));
        }

        out
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::start()
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(Color::White))
    }
}

impl Debug for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Placement({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn start_placement_matches_fen() {
        assert_eq!(Placement::start().to_fen(), START_PLACEMENT);
        assert_eq!(Placement::from_fen(START_PLACEMENT), Ok(Placement::start()));
    }

    #[test]
    fn free_move_captures_and_leaves_origin_empty() {
        let mut placement = Placement::start();

        assert!(placement.apply_move(mv("d1d7")));
        assert_eq!(placement.to_fen(), "rnbqkbnr/pppQpppp/8/8/8/8/PPPPPPPP/RNB1KBNR");

        assert!(!placement.apply_move(mv("e4e5")), "empty origin square moves nothing");
    }

    #[test]
    fn castling_king_takes_rook_along() {
        let mut placement = Placement::from_fen("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();

        placement.apply_move(mv("e1g1"));
        placement.apply_move(mv("e8c8"));

        assert_eq!(placement.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1");
    }

    #[test]
    fn promotion_replaces_piece_kind() {
        let mut placement = Placement::from_fen("8/4P3/8/8/8/8/8/8").unwrap();
        placement.apply_move(mv("e7e8n"));
        assert_eq!(placement.to_fen(), "4N3/8/8/8/8/8/8/8");
    }

    #[test]
    fn rejects_bad_fields() {
        assert_eq!(Placement::from_fen(""), Err(PositionError::Empty));
        assert_eq!(Placement::from_fen("8/8/8"), Err(PositionError::RankCount(3)));
        assert_eq!(
            Placement::from_fen("8/8/8/8/8/8/8/7"),
            Err(PositionError::RankWidth { rank: 1, width: 7 })
        );
        assert_eq!(
            Placement::from_fen("8/8/8/8/8/8/8/8p"),
            Err(PositionError::RankWidth { rank: 1, width: 9 })
        );
        assert_eq!(Placement::from_fen("8/8/8/8/8/8/8/7x"), Err(PositionError::PieceChar('x')));
    }

    #[test]
    fn renders_from_either_side() {
        let placement = Placement::start();
        let white = placement.render(Color::White);
        let black = placement.render(Color::Black);

        assert!(white.starts_with("8  r n b q k b n r"));
        assert!(white.ends_with("   a b c d e f g h"));
        assert!(black.starts_with("1  R N B K Q B N R"));
    }
}
