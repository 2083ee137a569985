//! # Event Routing
//!
//! Dispatches each popped event to its handler on `SimulationContainer`.
//!
//! ```text
//! CreateBlock(n) ──→ workload ──→ assemble ──→ ReceiveBlock(peer) × (N-1)
//!        │                           │
//!        │                           └──→ REDACTION_REQUEST txs ──→ submit
//!        └──→ next lottery ──→ CreateBlock(winner) @ now + interval
//!
//! ReceiveBlock(n) ──→ classify / reorg / orphan ──→ expire orphans
//!
//! RedactionTick ──→ votes ──→ poll ──→ execute ──→ ReceiveBlock(peer) × (N-1)
//!        └──→ RedactionTick @ now + tick_interval
//! ```
//!
//! Non-fatal handler errors are logged and the run continues. Fatal errors
//! (a broken chain invariant, a causality violation) stop the scheduler.

use rc_03_scheduler::{EventHandler, EventKind, ScheduledEvent, Scheduler};
use tracing::{error, warn};

use crate::container::SimulationContainer;
use crate::errors::{RuntimeError, RuntimeResult};

impl SimulationContainer {
    fn dispatch(&mut self, scheduler: &mut Scheduler, event: ScheduledEvent) -> RuntimeResult<()> {
        match event.kind {
            EventKind::CreateBlock { node } => self.on_create_block(scheduler, node),
            EventKind::ReceiveBlock { node, block } => self.on_receive_block(node, *block, event.time),
            EventKind::RedactionTick => self.on_redaction_tick(scheduler),
            EventKind::SubmitRedaction(scheduled) => {
                self.on_submit_redaction(scheduled, event.time);
                Ok(())
            }
        }
    }
}

impl EventHandler for SimulationContainer {
    type Error = RuntimeError;

    fn handle(&mut self, scheduler: &mut Scheduler, event: ScheduledEvent) -> Result<(), Self::Error> {
        let label = event.kind.label();
        let time = event.time;
        match self.dispatch(scheduler, event) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                error!(time, event = label, error = %e, "Fatal error, halting simulation");
                Err(e)
            }
            Err(e) => {
                warn!(time, event = label, error = %e, "Event handler failed");
                Ok(())
            }
        }
    }
}
