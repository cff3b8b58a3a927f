//! A board widget for the terminal: prints the board, reads moves and controls from stdin.

use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::chess::{Color, MalformedMoveError, Move, Placement, Position, PositionError};
use crate::protocol::Directive;
use crate::session::{BoardConfig, BoardWidget, Event, Notice};

pub struct TerminalBoard {
    placement: Placement,
    orientation: Color,
    movable_color: Option<Color>,
    turn: Color,
    frozen: bool,
}

impl TerminalBoard {
    pub fn new(orientation: Color) -> Self {
        TerminalBoard {
            placement: Placement::start(),
            orientation,
            movable_color: None,
            turn: Color::White,
            frozen: false,
        }
    }

    fn prompt(&self) -> &'static str {
        if self.frozen {
            "board is frozen"
        } else if self.movable_color == Some(self.turn) {
            "your move"
        } else {
            "waiting for the other side"
        }
    }
}

impl BoardWidget for TerminalBoard {
    fn configure(&mut self, config: &BoardConfig) {
        if let Some(position) = &config.position {
            self.placement = position.decode();
        }
        self.movable_color = config.movable_color;
        self.turn = config.turn_color;
        self.frozen = false;
    }

    fn apply_move(&mut self, mv: Move) {
        // free movement, whatever the peer or engine says goes
        if !self.placement.apply_move(mv) {
            warn!(%mv, "no piece on the origin square");
        }
    }

    fn redraw(&mut self) {
        println!("\n{}\n", self.placement.render(self.orientation));
        println!("{} to move, {}", self.turn, self.prompt());
    }

    fn set_turn(&mut self, color: Color) {
        self.turn = color;
    }

    fn stop(&mut self) {
        self.frozen = true;
    }

    fn placement(&self) -> Placement {
        self.placement.clone()
    }

    fn notify(&mut self, notice: &Notice) {
        println!("*** {notice} ***");
    }
}

/*====================================================================================================================*/

/// Turns one line typed by the user into an event. Blank lines give `Ok(None)`.
pub fn parse_input(line: &str) -> Result<Option<Event>, String> {
    let line = line.trim();

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match command {
        "" => Ok(None),
        "quit" | "exit" => Ok(Some(Event::Closed)),
        "calibrate" => Ok(Some(Event::Control(Directive::Calibrate))),
        "fen" => {
            if argument.is_empty() {
                return Err("fen needs a position".to_owned());
            }
            let position: Position = argument.parse().map_err(|err: PositionError| err.to_string())?;
            Ok(Some(Event::Control(Directive::SetFen(position))))
        }
        "depth" => {
            let depth = argument
                .parse::<u32>()
                .map_err(|_| format!("depth needs a number, got \"{argument}\""))?;
            Ok(Some(Event::SetDepth(depth)))
        }
        _ => {
            let mv: Move = line.parse().map_err(|err: MalformedMoveError| err.to_string())?;
            Ok(Some(Event::MoveAttempt(mv)))
        }
    }
}

/// Reads stdin on its own thread until EOF, which closes the session.
pub fn spawn_input(events: Sender<Event>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("stdin".to_owned()).spawn(move || {
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "could not read from stdin");
                    break;
                }
            };

            match parse_input(&line) {
                Ok(Some(event)) => {
                    let quit = matches!(event, Event::Closed);
                    if events.send(event).is_err() || quit {
                        return;
                    }
                }
                Ok(None) => {}
                Err(msg) => println!("{msg}"),
            }
        }

        debug!("stdin closed");
        let _ = events.send(Event::Closed);
    })
}
