//! Ports for the scheduler

use crate::domain::{ScheduledEvent, Scheduler};

/// Receives events popped by `Scheduler::run`.
///
/// Handlers run to completion and may enqueue future events through the
/// scheduler they are handed.
pub trait EventHandler {
    /// Error that aborts the run.
    type Error;

    /// Process one event at `scheduler.now()`.
    fn handle(&mut self, scheduler: &mut Scheduler, event: ScheduledEvent) -> Result<(), Self::Error>;
}
