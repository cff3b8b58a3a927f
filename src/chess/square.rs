use std::fmt::{Debug, Display};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    // bits 0..3 : file (a = 0)
    // bits 3..6 : rank (1 = 0)
    data: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Self {
        assert!(file < 8 && rank < 8, "Square out of range: file {file}, rank {rank}");

        Square { data: (rank << 3) | file }
    }

    pub fn from_index(index: usize) -> Self {
        assert!(index < 64, "Square index {index} out of range");

        Square { data: index as u8 }
    }

    /// parses a coordinate like `e4`; anything else is `None`
    pub fn from_coordinate(s: &str) -> Option<Self> {
        match s.as_bytes() {
            &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Some(Square::new(file - b'a', rank - b'1')),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self.data as usize
    }

    pub fn file(self) -> u8 {
        self.data & 0b0000_0111
    }

    pub fn rank(self) -> u8 {
        self.data >> 3
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl Debug for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Square({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_map_to_file_and_rank() {
        let sq = Square::from_coordinate("e4").unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.index(), 28);
        assert_eq!(sq.to_string(), "e4");
    }

    #[test]
    fn rejects_out_of_board_coordinates() {
        for bad in ["i1", "a0", "a9", "E4", "e", "e44", ""] {
            assert_eq!(Square::from_coordinate(bad), None, "{bad}");
        }
    }
}
