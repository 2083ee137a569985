//! Error types for the scheduler

use shared_types::LogicalTime;

/// Scheduler error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// An event was scheduled before the current logical time.
    #[error("Causality violation: event at {requested} scheduled at time {now}")]
    CausalityViolation { now: LogicalTime, requested: LogicalTime },
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
