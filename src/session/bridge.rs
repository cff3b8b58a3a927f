use std::fmt::Display;

use tracing::{debug, trace};

use crate::chess::{Color, Move, Placement, Position};

use super::{Phase, SessionState};

/// Declarative widget configuration. Reconfiguring replaces all of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// `None` keeps the current position
    pub position: Option<Position>,
    /// `None` means nobody may move pieces
    pub movable_color: Option<Color>,
    /// free movement: the widget does not check legality
    pub free: bool,
    pub show_ghost: bool,
    pub coordinates: bool,
    pub turn_color: Color,
}

impl BoardConfig {
    pub fn base(human: Color) -> Self {
        BoardConfig {
            position: None,
            movable_color: Some(human),
            free: true,
            show_ghost: true,
            coordinates: false,
            turn_color: Color::White,
        }
    }

    pub fn with_position(self, position: Position) -> Self {
        BoardConfig {
            position: Some(position),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Checkmate,
    Draw,
    EngineFailed(String),
    ConnectionFailed(String),
    Closed,
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Checkmate => write!(f, "Checkmate"),
            Notice::Draw => write!(f, "Draw"),
            Notice::EngineFailed(reason) => write!(f, "Engine failed: {reason}"),
            Notice::ConnectionFailed(reason) => write!(f, "Connection failed: {reason}"),
            Notice::Closed => write!(f, "Connection closed"),
        }
    }
}

/// What the session needs from a board widget.
pub trait BoardWidget {
    fn configure(&mut self, config: &BoardConfig);
    fn apply_move(&mut self, mv: Move);
    fn redraw(&mut self);
    fn set_turn(&mut self, color: Color);
    /// freeze all interaction
    fn stop(&mut self);
    fn placement(&self) -> Placement;
    fn notify(&mut self, notice: &Notice);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardOp {
    Configure(BoardConfig),
    ApplyMove(Move),
    Redraw,
    SetTurn(Color),
    Freeze,
    Notify(Notice),
}

/*====================================================================================================================*/

/// Applies widget operations in the order they are issued and filters the widget's move attempts.
pub struct BoardBridge<W> {
    widget: W,

    // mirror of what the widget was last told
    movable_color: Option<Color>,
    turn: Color,
    frozen: bool,
}

impl<W: BoardWidget> BoardBridge<W> {
    pub fn new(widget: W) -> Self {
        BoardBridge {
            widget,
            movable_color: None,
            turn: Color::White,
            frozen: false,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn placement(&self) -> Placement {
        self.widget.placement()
    }

    pub fn apply<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = BoardOp>,
    {
        for op in ops {
            self.apply_one(op);
        }
    }

    fn apply_one(&mut self, op: BoardOp) {
        trace!(?op, "board");

        match op {
            BoardOp::Configure(config) => {
                self.movable_color = config.movable_color;
                self.turn = config.turn_color;
                self.frozen = false;
                self.widget.configure(&config);
            }
            BoardOp::ApplyMove(mv) => self.widget.apply_move(mv),
            BoardOp::Redraw => self.widget.redraw(),
            BoardOp::SetTurn(color) => {
                self.turn = color;
                self.widget.set_turn(color);
            }
            BoardOp::Freeze => {
                self.frozen = true;
                self.widget.stop();
            }
            BoardOp::Notify(notice) => self.widget.notify(&notice),
        }
    }

    /// Passes a widget move attempt on to the session, unless the widget should not have
    /// accepted it in the first place.
    pub fn forward(&self, state: &SessionState, mv: Move) -> Option<Move> {
        let accepted = !self.frozen
            && !state.interaction_locked()
            && state.phase() == Phase::Idle
            && self.movable_color.is_some()
            && self.movable_color == Some(self.turn);

        if !accepted {
            debug!(
                %mv,
                phase = ?state.phase(),
                locked = state.interaction_locked(),
                frozen = self.frozen,
                turn = %self.turn,
                "move attempt rejected by board"
            );
            return None;
        }

        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct LogWidget {
        log: Vec<String>,
    }

    impl BoardWidget for LogWidget {
        fn configure(&mut self, config: &BoardConfig) {
            self.log.push(format!("configure {:?}", config.movable_color));
        }

        fn apply_move(&mut self, mv: Move) {
            self.log.push(format!("move {mv}"));
        }

        fn redraw(&mut self) {
            self.log.push("redraw".to_owned());
        }

        fn set_turn(&mut self, color: Color) {
            self.log.push(format!("turn {color}"));
        }

        fn stop(&mut self) {
            self.log.push("stop".to_owned());
        }

        fn placement(&self) -> Placement {
            Placement::start()
        }

        fn notify(&mut self, notice: &Notice) {
            self.log.push(format!("notice {notice}"));
        }
    }

    fn open_state() -> SessionState {
        let mut state = SessionState::new(3);
        state.enter(Phase::Idle);
        state
    }

    #[test]
    fn operations_reach_widget_in_issue_order() {
        let mut bridge = BoardBridge::new(LogWidget::default());

        bridge.apply([
            BoardOp::Configure(BoardConfig::base(Color::White).with_position(Position::start())),
            BoardOp::Redraw,
            BoardOp::Freeze,
            BoardOp::Notify(Notice::Draw),
        ]);

        assert_eq!(
            bridge.widget().log,
            ["configure Some(White)", "redraw", "stop", "notice Draw"]
        );
        assert!(bridge.is_frozen());
    }

    #[test]
    fn forwards_only_when_human_may_move() {
        let mv: Move = "e2e4".parse().unwrap();
        let state = open_state();
        let mut bridge = BoardBridge::new(LogWidget::default());

        assert_eq!(bridge.forward(&state, mv), None, "not configured yet");

        bridge.apply([BoardOp::Configure(BoardConfig::base(Color::White))]);
        assert_eq!(bridge.forward(&state, mv), Some(mv));

        bridge.apply([BoardOp::SetTurn(Color::Black)]);
        assert_eq!(bridge.forward(&state, mv), None, "engine's turn");

        bridge.apply([BoardOp::SetTurn(Color::White), BoardOp::Freeze]);
        assert_eq!(bridge.forward(&state, mv), None, "frozen");

        // reconfiguring after a freeze unlocks again
        bridge.apply([BoardOp::Configure(BoardConfig::base(Color::White))]);
        assert_eq!(bridge.forward(&state, mv), Some(mv));
    }

    #[test]
    fn rejects_while_locked() {
        let mv: Move = "e2e4".parse().unwrap();
        let mut state = open_state();
        let mut bridge = BoardBridge::new(LogWidget::default());
        bridge.apply([BoardOp::Configure(BoardConfig::base(Color::White))]);

        state.enter(Phase::EngineMoveInFlight { ticket: 1 });
        assert!(state.interaction_locked());
        assert_eq!(bridge.forward(&state, mv), None);
    }
}
