//! Subscription-based dispatch of page events to the tracker.

use crate::errors::TrackerError;
use crate::models::{ClickTarget, ExpenseForm};
use crate::tracker::Tracker;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Submit(ExpenseForm),
    Click(ClickTarget),
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Submit(_) => EventKind::Submit,
            UiEvent::Click(_) => EventKind::Click,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Submit,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Changed,
    Ignored,
}

type Handler = Box<dyn Fn(&mut Tracker, &UiEvent) -> Result<Handled, TrackerError> + Send + Sync>;

#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<(EventKind, Handler)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&mut Tracker, &UiEvent) -> Result<Handled, TrackerError> + Send + Sync + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Runs every handler subscribed to the event's kind, in subscription
    /// order, stopping at the first error.
    pub fn dispatch(&self, tracker: &mut Tracker, event: &UiEvent) -> Result<Handled, TrackerError> {
        let kind = event.kind();
        let mut outcome = Handled::Ignored;
        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            if handler(tracker, event)? == Handled::Changed {
                outcome = Handled::Changed;
            }
        }
        debug!(?kind, ?outcome, "dispatched event");
        Ok(outcome)
    }
}
