use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use tracing::debug;

use crate::protocol::{Received, Transport};

use super::{BoardWidget, Event, Session};

/// Hands everything that is ready right now to the session, one event at a time:
/// first the connection's frames, then the local queue. Returns how many events were handled.
pub fn pump<W: BoardWidget, T: Transport>(session: &mut Session<W, T>, events: &Receiver<Event>) -> usize {
    let mut handled = 0;

    while !session.is_finished() {
        let event = match session.transport_mut().receive() {
            Ok(Some(Received::Text(text))) => Event::Inbound(text),
            Ok(Some(Received::Closed)) => Event::Closed,
            Ok(None) => break,
            Err(err) => Event::ConnectionFailed(err),
        };

        session.handle(event);
        handled += 1;
    }

    while !session.is_finished() {
        match events.try_recv() {
            Ok(event) => {
                session.handle(event);
                handled += 1;
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                debug!("all event sources are gone");
                session.handle(Event::Closed);
                handled += 1;
            }
        }
    }

    handled
}

/// Drives the session until its connection is gone.
pub fn run<W: BoardWidget, T: Transport>(session: &mut Session<W, T>, events: &Receiver<Event>, poll_interval: Duration) {
    session.handle(Event::Opened);

    while !session.is_finished() {
        if pump(session, events) == 0 {
            std::thread::sleep(poll_interval);
        }
    }
}
