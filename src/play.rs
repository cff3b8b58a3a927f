use std::io;
use std::sync::mpsc;

use tracing::info;

use crate::config::PlayConfig;
use crate::engine::EngineAdapter;
use crate::protocol::{Connection, ConnectionError};
use crate::session::{run, BoardBridge, ConnectionStatus, Session, SessionOptions};
use crate::terminal::{spawn_input, TerminalBoard};

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("could not read input: {0}")]
    Input(#[from] io::Error),
    #[error("session ended with an error")]
    SessionFailed,
}

/// Connects to the peer and plays on the terminal board until the connection ends.
pub fn play(config: &PlayConfig) -> Result<(), PlayError> {
    info!(url = %config.url, protocol = %config.protocol, "connecting");
    let connection = Connection::new(&config.url, &config.protocol)?;
    info!(url = %config.url, "connected");

    let (tx, rx) = mpsc::channel();

    let engine = EngineAdapter::new(config.engine.build(), tx.clone());
    let bridge = BoardBridge::new(TerminalBoard::new(config.human));
    let options = SessionOptions {
        human: config.human,
        depth: config.depth,
    };

    let mut session = Session::new(options, bridge, connection, engine);

    // the input thread is left behind blocked on stdin once the session is over
    spawn_input(tx)?;

    run(&mut session, &rx, config.poll_interval);

    match session.state().connection() {
        ConnectionStatus::Errored => Err(PlayError::SessionFailed),
        _ => Ok(()),
    }
}
