//! Event queue and run loop

use super::error::{SchedulerError, SchedulerResult};
use super::event::{EventKind, ScheduledEvent};
use crate::ports::EventHandler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::LogicalTime;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// Outcome of `Scheduler::run`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub events_processed: u64,
    pub final_time: LogicalTime,
    /// Events left unprocessed because they fall after the end time.
    pub events_remaining: usize,
}

/// Separates the general stream from the lottery stream of the same seed.
const GENERAL_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Discrete-event scheduler.
///
/// Owns the logical clock, the event queue and two seeded RNG streams: the
/// mining lottery draws from its own stream, so the miner sequence depends
/// only on the seed and the hash-rate shares.
#[derive(Debug)]
pub struct Scheduler {
    now: LogicalTime,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
    rng: StdRng,
    lottery: StdRng,
    mean_propagation_delay: LogicalTime,
    end_time: LogicalTime,
    processed: u64,
}

impl Scheduler {
    /// Create a scheduler at time zero.
    pub fn new(seed: u64, mean_propagation_delay: LogicalTime, end_time: LogicalTime) -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            rng: StdRng::seed_from_u64(seed ^ GENERAL_STREAM),
            lottery: StdRng::seed_from_u64(seed),
            mean_propagation_delay,
            end_time,
            processed: 0,
        }
    }

    /// Current logical time.
    pub fn now(&self) -> LogicalTime {
        self.now
    }

    pub fn end_time(&self) -> LogicalTime {
        self.end_time
    }

    /// Events still queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The simulation RNG: keys, workload, sealing, delays and votes.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// The RNG reserved for mining lotteries.
    pub fn lottery_rng(&mut self) -> &mut StdRng {
        &mut self.lottery
    }

    /// Enqueue an event at an absolute time.
    ///
    /// # Errors
    ///
    /// `CausalityViolation` if `time < now`.
    pub fn schedule(&mut self, time: LogicalTime, kind: EventKind) -> SchedulerResult<()> {
        if time < self.now {
            return Err(SchedulerError::CausalityViolation {
                now: self.now,
                requested: time,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(time, seq, event = kind.label(), "Scheduled event");
        self.queue.push(ScheduledEvent { time, seq, kind });
        Ok(())
    }

    /// Enqueue an event `delay` ticks from now.
    pub fn schedule_after(&mut self, delay: LogicalTime, kind: EventKind) -> SchedulerResult<()> {
        self.schedule(self.now.saturating_add(delay), kind)
    }

    /// Draw a block propagation delay.
    ///
    /// Exponentially distributed with the configured mean, at least one tick.
    pub fn propagation_delay(&mut self) -> LogicalTime {
        let u: f64 = self.rng.gen();
        let sample = -(self.mean_propagation_delay as f64) * (1.0 - u).ln();
        (sample.round() as LogicalTime).max(1)
    }

    /// Pop the next event if it fires no later than the end time.
    ///
    /// Advances the clock to the event's time.
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        match self.queue.peek() {
            Some(next) if next.time <= self.end_time => {}
            _ => return None,
        }
        let event = self.queue.pop()?;
        self.now = event.time;
        self.processed += 1;
        Some(event)
    }

    /// Run until the queue drains or the next event is past the end time.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first handler error.
    pub fn run<H: EventHandler>(&mut self, handler: &mut H) -> Result<RunSummary, H::Error> {
        info!(end_time = self.end_time, queued = self.queue.len(), "Scheduler starting");
        while let Some(event) = self.pop() {
            debug!(time = event.time, seq = event.seq, event = event.kind.label(), "Dispatching event");
            handler.handle(self, event)?;
        }
        let summary = RunSummary {
            events_processed: self.processed,
            final_time: self.now,
            events_remaining: self.queue.len(),
        };
        info!(
            processed = summary.events_processed,
            final_time = summary.final_time,
            remaining = summary.events_remaining,
            "Scheduler finished"
        );
        Ok(summary)
    }
}
