use std::fmt::{Debug, Display};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use super::{PieceKind, Square};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed move \"{text}\"")]
pub struct MalformedMoveError {
    pub text: String,
}

impl MalformedMoveError {
    pub fn new(text: &str) -> Self {
        MalformedMoveError { text: text.to_owned() }
    }
}

/*====================================================================================================================*/

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub origin: Square,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(origin: Square, destination: Square) -> Self {
        Move {
            origin,
            destination,
            promotion: None,
        }
    }

    pub fn with_promotion(self, kind: PieceKind) -> Self {
        Move {
            promotion: Some(kind),
            ..self
        }
    }
}

// wire form: origin and destination concatenated, promotion appended as lowercase letter
impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({self})")
    }
}

lazy_static! {
    static ref MOVE_REGEX: Regex = Regex::new(r"^(?P<origin>[a-h][1-8])(?P<destination>[a-h][1-8])(?P<promotion>[qrbn])?$").unwrap();
}

impl FromStr for Move {
    type Err = MalformedMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = MOVE_REGEX.captures(s).ok_or_else(|| MalformedMoveError::new(s))?;

        let square = |name: &str| {
            captures
                .name(name)
                .and_then(|cap| Square::from_coordinate(cap.as_str()))
                .ok_or_else(|| MalformedMoveError::new(s))
        };

        let origin = square("origin")?;
        let destination = square("destination")?;

        let promotion = captures
            .name("promotion")
            .and_then(|cap| cap.as_str().chars().next())
            .and_then(PieceKind::from_char);

        Ok(Move {
            origin,
            destination,
            promotion,
        })
    }
}
