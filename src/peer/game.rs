use cozy_chess::{Board, GameStatus};
use tracing::{debug, info};

use crate::chess::{Color, Position};
use crate::engine::{board_from_position, color_from_cozy, to_cozy_move};
use crate::protocol::{Directive, Message, ProtocolError, ACK};

pub const INVALID_MOVE: &str = "Error: Invalid move";

/// The peer's view of one game. Answers every frame the client sends.
pub struct PeerGame {
    board: Board,
}

impl Default for PeerGame {
    fn default() -> Self {
        PeerGame { board: Board::default() }
    }
}

impl PeerGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn status(&self) -> Directive {
        match self.board.status() {
            GameStatus::Won => Directive::Checkmate,
            GameStatus::Drawn => Directive::Draw,
            GameStatus::Ongoing => Directive::SetTurn(color_from_cozy(self.board.side_to_move())),
        }
    }

    /// Frames to send back, in order.
    pub fn respond(&mut self, text: &str) -> Vec<String> {
        let message = match text.parse::<Message>() {
            Ok(message) => message,
            Err(ProtocolError::MalformedMove(err)) => {
                debug!(%err, "not a move");
                return vec![INVALID_MOVE.to_owned()];
            }
            Err(err) => return vec![format!("Error: {err}")],
        };

        match message {
            Message::Ack => Vec::new(),
            Message::Move(mv) => match to_cozy_move(&self.board, mv) {
                Some(legal) => {
                    self.board.play_unchecked(legal);
                    info!(%mv, "move played");
                    vec![ACK.to_owned(), self.status().to_string()]
                }
                None => {
                    debug!(%mv, "illegal move");
                    vec![INVALID_MOVE.to_owned()]
                }
            },
            Message::Directive(Directive::SetFen(position)) => self.reset(position),
            Message::Directive(Directive::Calibrate) => {
                info!("calibration requested");
                vec![ACK.to_owned()]
            }
            Message::Directive(other) => vec![format!("Error: unexpected directive \"{}\"", other.token())],
        }
    }

    fn reset(&mut self, position: Position) -> Vec<String> {
        let position = position.complete(Color::White);

        match board_from_position(&position) {
            Ok(board) => {
                info!(%position, "board reset");
                self.board = board;
                vec![Directive::SetPosition(position).to_string()]
            }
            Err(err) => vec![format!("Error: {err}")],
        }
    }
}
