use crate::chess::Color;
use crate::engine::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Closed,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingConnection,
    Idle,
    HumanMoveInFlight,
    EngineMoveInFlight { ticket: Ticket },
    Checkmated,
    Drawn,
    Closed,
    Errored,
}

/// Everything that changes during a session. Only the session's transition function mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    turn: Color,
    connection: ConnectionStatus,
    depth: u32,
    interaction_locked: bool,
}

impl SessionState {
    pub fn new(depth: u32) -> Self {
        SessionState {
            phase: Phase::AwaitingConnection,
            turn: Color::White,
            connection: ConnectionStatus::Connecting,
            depth,
            interaction_locked: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn interaction_locked(&self) -> bool {
        self.interaction_locked
    }

    pub fn in_flight_ticket(&self) -> Option<Ticket> {
        match self.phase {
            Phase::EngineMoveInFlight { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// the connection is gone; nothing more will happen in this session
    pub fn is_finished(&self) -> bool {
        matches!(self.connection, ConnectionStatus::Closed | ConnectionStatus::Errored)
    }

    // the lock follows the phase, it is never set on its own
    pub(super) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.interaction_locked = matches!(phase, Phase::HumanMoveInFlight | Phase::EngineMoveInFlight { .. });
    }

    pub(super) fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    pub(super) fn set_connection(&mut self, connection: ConnectionStatus) {
        self.connection = connection;
    }

    pub(super) fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }
}
