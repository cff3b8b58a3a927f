use std::fmt::Display;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::chess::{Color, MalformedMoveError, Move, Position, PositionError};

pub const DIRECTIVE_PREFIX: char = '!';
pub const ACK: &str = "OK";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error(transparent)]
    MalformedMove(#[from] MalformedMoveError),
    #[error("unknown directive \"{0}\"")]
    UnknownDirective(String),
    #[error("directive \"{0}\" requires an argument")]
    MissingArgument(&'static str),
    #[error("invalid position: {0}")]
    Position(#[from] PositionError),
}

/*====================================================================================================================*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    SetPosition(Position),
    Checkmate,
    Draw,
    SetTurn(Color),
    Calibrate,
    SetFen(Position),
}

impl Directive {
    pub fn token(&self) -> &'static str {
        match self {
            Directive::SetPosition(_) => "set",
            Directive::Checkmate => "checkmate",
            Directive::Draw => "draw",
            Directive::SetTurn(Color::White) => "white",
            Directive::SetTurn(Color::Black) => "black",
            Directive::Calibrate => "calibrate",
            Directive::SetFen(_) => "fen",
        }
    }

    /// directives that replace the board or end the game
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            Directive::SetPosition(_) | Directive::SetFen(_) | Directive::Checkmate | Directive::Draw
        )
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{DIRECTIVE_PREFIX}{}", self.token())?;
        match self {
            Directive::SetPosition(position) | Directive::SetFen(position) => write!(f, " {position}"),
            _ => Ok(()),
        }
    }
}

/// A single text frame on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Ack,
    Move(Move),
    Directive(Directive),
}

lazy_static! {
    static ref DIRECTIVE_REGEX: Regex = Regex::new(r"^!(?P<token>\S+)(?:\s+(?P<args>.*?))?\s*$").unwrap();
}

fn parse_directive(s: &str) -> Result<Directive, ProtocolError> {
    let captures = DIRECTIVE_REGEX
        .captures(s)
        .ok_or_else(|| ProtocolError::UnknownDirective(String::new()))?;

    let token = captures.name("token").map_or("", |cap| cap.as_str());

    let args = captures
        .name("args")
        .map(|cap| cap.as_str())
        .filter(|args| !args.is_empty());

    let position = |name: &'static str| -> Result<Position, ProtocolError> {
        Ok(args.ok_or(ProtocolError::MissingArgument(name))?.parse()?)
    };

    match token {
        "set" => Ok(Directive::SetPosition(position("set")?)),
        "fen" => Ok(Directive::SetFen(position("fen")?)),
        "checkmate" => Ok(Directive::Checkmate),
        "draw" => Ok(Directive::Draw),
        "white" => Ok(Directive::SetTurn(Color::White)),
        "black" => Ok(Directive::SetTurn(Color::Black)),
        "calibrate" => Ok(Directive::Calibrate),
        _ => Err(ProtocolError::UnknownDirective(token.to_owned())),
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.starts_with(DIRECTIVE_PREFIX) {
            return parse_directive(s).map(Message::Directive);
        }

        if s == ACK {
            return Ok(Message::Ack);
        }

        Ok(Message::Move(s.parse()?))
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Ack => write!(f, "{ACK}"),
            Message::Move(mv) => write!(f, "{mv}"),
            Message::Directive(directive) => write!(f, "{directive}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::START_FEN;

    fn parse(s: &str) -> Result<Message, ProtocolError> {
        s.parse()
    }

    #[test]
    fn plain_text_is_a_move() {
        assert_eq!(parse("e2e4"), Ok(Message::Move("e2e4".parse().unwrap())));
        assert_eq!(parse("e7e8q\r\n"), Ok(Message::Move("e7e8q".parse().unwrap())));
    }

    #[test]
    fn ok_is_acknowledgement() {
        assert_eq!(parse("OK"), Ok(Message::Ack));
    }

    #[test]
    fn parses_every_directive() {
        let start = Position::start();

        assert_eq!(
            parse(&format!("!set {START_FEN}")),
            Ok(Message::Directive(Directive::SetPosition(start.clone())))
        );
        assert_eq!(
            parse(&format!("!fen {START_FEN}")),
            Ok(Message::Directive(Directive::SetFen(start)))
        );
        assert_eq!(parse("!checkmate"), Ok(Message::Directive(Directive::Checkmate)));
        assert_eq!(parse("!draw"), Ok(Message::Directive(Directive::Draw)));
        assert_eq!(parse("!white"), Ok(Message::Directive(Directive::SetTurn(Color::White))));
        assert_eq!(parse("!black"), Ok(Message::Directive(Directive::SetTurn(Color::Black))));
        assert_eq!(parse("!calibrate"), Ok(Message::Directive(Directive::Calibrate)));
    }

    #[test]
    fn set_accepts_placement_only_position() {
        let message = parse("!set 8/8/8/8/8/8/8/K6k").unwrap();
        assert_eq!(message.to_string(), "!set 8/8/8/8/8/8/8/K6k");
    }

    #[test]
    fn unknown_directive_is_reported_not_fatal() {
        assert_eq!(parse("!resign now"), Err(ProtocolError::UnknownDirective("resign".to_owned())));
        assert_eq!(parse("!"), Err(ProtocolError::UnknownDirective(String::new())));
    }

    #[test]
    fn set_without_or_with_bad_position() {
        assert_eq!(parse("!set"), Err(ProtocolError::MissingArgument("set")));
        assert_eq!(parse("!set   "), Err(ProtocolError::MissingArgument("set")));
        assert_eq!(
            parse("!set 8/8/8"),
            Err(ProtocolError::Position(PositionError::RankCount(3)))
        );
    }

    #[test]
    fn anything_else_is_an_anomaly() {
        assert_eq!(
            parse("garbage text"),
            Err(ProtocolError::MalformedMove(MalformedMoveError::new("garbage text")))
        );
        assert!(matches!(parse("Error: Invalid move"), Err(ProtocolError::MalformedMove(_))));
        assert!(matches!(parse("ok"), Err(ProtocolError::MalformedMove(_))));
    }

    #[test]
    fn outbound_wire_forms() {
        assert_eq!(Message::Move("e2e4".parse().unwrap()).to_string(), "e2e4");
        assert_eq!(Message::Ack.to_string(), "OK");
        assert_eq!(Message::Directive(Directive::Calibrate).to_string(), "!calibrate");
        assert_eq!(
            Message::Directive(Directive::SetFen(Position::start())).to_string(),
            format!("!fen {START_FEN}")
        );
        assert_eq!(Message::Directive(Directive::SetTurn(Color::Black)).to_string(), "!black");
    }
}
