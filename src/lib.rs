pub mod chess;
pub mod config;
pub mod engine;
pub mod peer;
pub mod play;
pub mod protocol;
pub mod session;
pub mod terminal;

pub use chess::{Color, Move, Placement, Position};
pub use engine::{Engine, EngineAdapter, EngineError, EngineKind};
pub use play::{play, PlayError};
pub use protocol::{Connection, Directive, Message, Transport};
pub use session::{Event, Session, SessionOptions};
