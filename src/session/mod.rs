//! The turn-taking controller.
//!
//! Every outside happening (connection traffic, widget callbacks, UI controls, engine
//! completions) arrives as an [`Event`] and is handled to completion by
//! [`Session::handle`] before the next one is looked at.

use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use crate::chess::{Color, Move, Position};
use crate::engine::{EngineAdapter, EngineError, Ticket};
use crate::protocol::{ConnectionError, Directive, Message, ProtocolError, Transport};

mod bridge;
mod dispatcher;
mod state;

pub use bridge::{BoardBridge, BoardConfig, BoardOp, BoardWidget, Notice};
pub use dispatcher::{pump, run};
pub use state::{ConnectionStatus, Phase, SessionState};

// moves we sent that the peer may still echo back: one ply pair
const ECHO_WINDOW: usize = 2;

#[derive(Debug)]
pub enum Event {
    Opened,
    /// a text frame from the peer
    Inbound(String),
    /// the widget wants to play a move
    MoveAttempt(Move),
    /// a UI control asks for a directive to be sent
    Control(Directive),
    SetDepth(u32),
    EngineDone {
        ticket: Ticket,
        result: Result<Move, EngineError>,
    },
    ConnectionFailed(ConnectionError),
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub human: Color,
    pub depth: u32,
}

pub struct Session<W, T> {
    state: SessionState,
    human: Color,

    bridge: BoardBridge<W>,
    transport: T,
    engine: EngineAdapter,

    // events held back while the engine is thinking
    deferred: VecDeque<Event>,
    unechoed: VecDeque<Move>,
}

fn parse_inbound(text: &str) -> Option<Directive> {
    match text.parse() {
        Ok(Message::Directive(directive)) => Some(directive),
        _ => None,
    }
}

impl<W: BoardWidget, T: Transport> Session<W, T> {
    pub fn new(options: SessionOptions, bridge: BoardBridge<W>, transport: T, engine: EngineAdapter) -> Self {
        Session {
            state: SessionState::new(options.depth),
            human: options.human,
            bridge,
            transport,
            engine,
            deferred: VecDeque::new(),
            unechoed: VecDeque::with_capacity(ECHO_WINDOW),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn bridge(&self) -> &BoardBridge<W> {
        &self.bridge
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn handle(&mut self, event: Event) {
        self.handle_one(event);

        while self.state.in_flight_ticket().is_none() {
            match self.deferred.pop_front() {
                Some(event) => self.handle_one(event),
                None => break,
            }
        }
    }

    fn handle_one(&mut self, event: Event) {
        if !self.accepts(&event) {
            debug!(?event, phase = ?self.state.phase(), "event ignored");
            return;
        }

        if self.must_defer(&event) {
            debug!(?event, "engine is thinking, event deferred");
            self.deferred.push_back(event);
            return;
        }

        match event {
            Event::Opened => self.on_opened(),
            Event::Inbound(text) => match text.parse::<Message>() {
                Ok(message) => self.on_message(message),
                Err(err) => self.on_protocol_error(&text, err),
            },
            Event::MoveAttempt(mv) => {
                if let Some(mv) = self.bridge.forward(&self.state, mv) {
                    self.on_move_attempt(mv);
                }
            }
            Event::Control(directive) => self.on_control(directive),
            Event::SetDepth(depth) => {
                info!(depth, "search depth changed");
                self.state.set_depth(depth);
            }
            Event::EngineDone { ticket, result } => self.on_engine_done(ticket, result),
            Event::ConnectionFailed(err) => self.on_connection_failed(err),
            Event::Closed => self.on_closed(),
        }
    }

    fn accepts(&self, event: &Event) -> bool {
        match self.state.phase() {
            Phase::Closed => false,
            // an engine failure can still be recovered from by resetting the board
            Phase::Errored => match event {
                Event::Closed => true,
                Event::ConnectionFailed(_) => self.state.connection() == ConnectionStatus::Open,
                Event::Inbound(text) => {
                    self.state.connection() == ConnectionStatus::Open
                        && matches!(parse_inbound(text), Some(Directive::SetPosition(_) | Directive::SetFen(_)))
                }
                _ => false,
            },
            _ => true,
        }
    }

    fn must_defer(&self, event: &Event) -> bool {
        if self.state.in_flight_ticket().is_none() {
            return false;
        }

        match event {
            Event::EngineDone { .. } | Event::ConnectionFailed(_) | Event::Closed | Event::MoveAttempt(_) => false,
            Event::Inbound(text) => !parse_inbound(text).map_or(false, |directive| directive.is_administrative()),
            Event::Opened | Event::Control(_) | Event::SetDepth(_) => true,
        }
    }

    fn send(&mut self, message: Message) -> Result<(), ConnectionError> {
        debug!(%message, "sending");
        self.transport.send(&message)?;

        if let Message::Move(mv) = message {
            if self.unechoed.len() == ECHO_WINDOW {
                self.unechoed.pop_front();
            }
            self.unechoed.push_back(mv);
        }

        Ok(())
    }

    fn cancel_search(&mut self) {
        if let Some(ticket) = self.state.in_flight_ticket() {
            debug!(ticket, "abandoning engine search");
            self.engine.cancel();
        }
    }

    /// Abandons the running search. Held-back peer traffic belongs to the abandoned game and is
    /// dropped; local requests still go through, in the order they came in.
    fn preempt(&mut self) {
        self.cancel_search();

        for event in std::mem::take(&mut self.deferred) {
            if self.state.is_finished() {
                break;
            }

            match event {
                Event::SetDepth(depth) => self.state.set_depth(depth),
                Event::Control(directive) => self.on_control(directive),
                event => debug!(?event, "held-back event dropped"),
            }
        }
    }

    fn request_engine(&mut self) {
        let position = Position::encode(&self.bridge.placement()).complete(!self.human);
        let ticket = self.engine.request(position, self.state.depth());

        self.state.enter(Phase::EngineMoveInFlight { ticket });
    }

    /// a fresh game where the engine has the first move
    fn engine_to_move(&mut self) {
        if self.state.phase() == Phase::Idle && self.state.turn() == !self.human {
            self.request_engine();
        }
    }

    /*================================================================================================================*/

    fn on_opened(&mut self) {
        if self.state.phase() != Phase::AwaitingConnection {
            warn!(phase = ?self.state.phase(), "connection opened twice");
            return;
        }

        info!(human = %self.human, engine = self.engine.engine_name(), "session open");

        self.state.set_connection(ConnectionStatus::Open);
        self.state.set_turn(Color::White);
        self.state.enter(Phase::Idle);

        self.bridge
            .apply([BoardOp::Configure(BoardConfig::base(self.human)), BoardOp::Redraw]);

        self.engine_to_move();
    }

    fn on_move_attempt(&mut self, mv: Move) {
        if self.state.phase() != Phase::Idle || self.state.interaction_locked() || self.state.turn() != self.human {
            debug!(%mv, phase = ?self.state.phase(), "move attempt ignored");
            return;
        }

        let engine_color = !self.human;

        self.state.enter(Phase::HumanMoveInFlight);
        self.state.set_turn(engine_color);
        self.bridge
            .apply([BoardOp::ApplyMove(mv), BoardOp::SetTurn(engine_color), BoardOp::Redraw]);

        // the peer learns about the move right away, the engine works in parallel
        if let Err(err) = self.send(Message::Move(mv)) {
            return self.on_connection_failed(err);
        }

        self.request_engine();
    }

    fn on_engine_done(&mut self, ticket: Ticket, result: Result<Move, EngineError>) {
        if self.state.in_flight_ticket() != Some(ticket) {
            debug!(ticket, ?result, "stale engine result dropped");
            return;
        }

        let engine_color = !self.human;

        match result {
            Ok(mv) => {
                info!(%mv, "engine replied");

                if let Err(err) = self.send(Message::Move(mv)) {
                    return self.on_connection_failed(err);
                }

                self.bridge
                    .apply([BoardOp::ApplyMove(mv), BoardOp::SetTurn(engine_color), BoardOp::Redraw]);
                self.state.set_turn(engine_color);
                self.state.enter(Phase::Idle);
            }
            Err(err) => {
                error!(%err, "engine failed, automated play halted");

                self.state.enter(Phase::Errored);
                self.bridge
                    .apply([BoardOp::Freeze, BoardOp::Notify(Notice::EngineFailed(err.to_string()))]);
            }
        }
    }

    fn on_message(&mut self, message: Message) {
        match message {
            Message::Ack => debug!("peer acknowledged"),
            Message::Move(mv) => self.on_peer_move(mv),
            Message::Directive(directive) => self.on_directive(directive),
        }
    }

    fn on_directive(&mut self, directive: Directive) {
        match directive {
            Directive::SetPosition(position) | Directive::SetFen(position) => self.reset(position),
            Directive::Checkmate => self.finish(Phase::Checkmated, Notice::Checkmate),
            Directive::Draw => self.finish(Phase::Drawn, Notice::Draw),
            Directive::SetTurn(color) => {
                debug!(%color, "peer set turn");
                self.state.set_turn(color);
                self.bridge.apply([BoardOp::SetTurn(color)]);
            }
            Directive::Calibrate => info!("peer asked for calibration, nothing to calibrate here"),
        }
    }

    fn reset(&mut self, position: Position) {
        info!(%position, "board reset by peer");

        self.preempt();
        if self.state.is_finished() {
            return;
        }

        self.unechoed.clear();

        if self.state.connection() == ConnectionStatus::Open {
            self.state.set_turn(Color::White);
            self.state.enter(Phase::Idle);
        }

        self.bridge.apply([
            BoardOp::Configure(BoardConfig::base(self.human).with_position(position)),
            BoardOp::Redraw,
        ]);

        self.engine_to_move();
    }

    fn finish(&mut self, phase: Phase, notice: Notice) {
        info!(%notice, "game over");

        self.preempt();
        if self.state.is_finished() {
            return;
        }

        self.state.enter(phase);
        self.bridge.apply([BoardOp::Freeze, BoardOp::Notify(notice)]);
    }

    fn on_peer_move(&mut self, mv: Move) {
        if let Some(i) = self.unechoed.iter().position(|&sent| sent == mv) {
            debug!(%mv, "peer echoed our move");
            self.unechoed.remove(i);
            return;
        }

        if self.state.phase() == Phase::Idle && self.state.turn() != self.human {
            info!(%mv, "peer played");

            self.state.set_turn(self.human);
            self.bridge
                .apply([BoardOp::ApplyMove(mv), BoardOp::SetTurn(self.human), BoardOp::Redraw]);
        } else {
            warn!(%mv, phase = ?self.state.phase(), turn = %self.state.turn(), "unexpected move from peer dropped");
        }
    }

    fn on_protocol_error(&mut self, text: &str, err: ProtocolError) {
        match err {
            ProtocolError::UnknownDirective(token) => debug!(%token, "unknown directive ignored"),
            ProtocolError::MalformedMove(err) => warn!(%err, "protocol anomaly, message dropped"),
            err => warn!(%err, text, "invalid directive dropped"),
        }
    }

    fn on_control(&mut self, directive: Directive) {
        match directive {
            Directive::Calibrate | Directive::SetFen(_) => {
                info!(%directive, "requesting from peer");
                if let Err(err) = self.send(Message::Directive(directive)) {
                    self.on_connection_failed(err);
                }
            }
            other => warn!(directive = %other, "not a request that can be sent to the peer"),
        }
    }

    fn on_connection_failed(&mut self, err: ConnectionError) {
        error!(%err, "connection failed");

        self.cancel_search();
        self.deferred.clear();
        self.state.set_connection(ConnectionStatus::Errored);
        self.state.enter(Phase::Errored);
        self.bridge
            .apply([BoardOp::Freeze, BoardOp::Notify(Notice::ConnectionFailed(err.to_string()))]);
    }

    fn on_closed(&mut self) {
        info!("session closed");

        self.cancel_search();
        self.deferred.clear();
        self.transport.close();
        self.state.set_connection(ConnectionStatus::Closed);
        self.state.enter(Phase::Closed);
        self.bridge.apply([BoardOp::Freeze, BoardOp::Notify(Notice::Closed)]);
    }
}
