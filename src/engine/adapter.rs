use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use threadpool::ThreadPool;
use tracing::{debug, info};

use crate::chess::{Move, Position};
use crate::session::Event;

use super::{Engine, EngineError};

/// identifies one engine request; a completion carrying an outdated ticket is ignored
pub type Ticket = u64;

/// Runs the engine off the session thread and reports back through the session's event queue.
pub struct EngineAdapter {
    engine: Arc<dyn Engine>,
    pool: ThreadPool,
    events: Sender<Event>,

    next_ticket: Ticket,
    in_flight: Option<Arc<AtomicBool>>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn Engine>, events: Sender<Event>) -> Self {
        EngineAdapter {
            engine,
            pool: ThreadPool::with_name("engine".to_owned(), 1),
            events,
            next_ticket: 1,
            in_flight: None,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// blocking search on the calling thread
    pub fn best_move(&self, position: &Position, depth: u32) -> Result<Move, EngineError> {
        self.engine.search(position, depth, &AtomicBool::new(false))
    }

    /// Queues a search. Exactly one `Event::EngineDone` with the returned ticket follows.
    pub fn request(&mut self, position: Position, depth: u32) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let abort = Arc::new(AtomicBool::new(false));
        self.in_flight = Some(Arc::clone(&abort));

        info!(ticket, depth, engine = self.engine.name(), %position, "engine search requested");

        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();

        self.pool.execute(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| engine.search(&position, depth, &abort)))
                .unwrap_or_else(|payload| Err(EngineError::Crashed(panic_message(payload.as_ref()))));

            if events.send(Event::EngineDone { ticket, result }).is_err() {
                debug!(ticket, "session is gone, dropping engine result");
            }
        });

        ticket
    }

    /// asks the running search to stop; its completion still arrives (as `Cancelled`)
    pub fn cancel(&mut self) {
        if let Some(abort) = self.in_flight.take() {
            abort.store(true, Ordering::Relaxed);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}
