//! # Simulation Wiring
//!
//! Connects the scheduler to the container and seeds the initial events.
//!
//! ## Startup Sequence
//!
//! 1. Validate the configuration
//! 2. Run the key ceremony and build the shared genesis
//! 3. Wire consensus, redaction and workload into the container
//! 4. Schedule the first lottery, the first `RedactionTick` and every
//!    externally scheduled redaction
//! 5. Run the scheduler until the end time

pub mod event_routing;

use std::sync::Arc;

use rc_03_scheduler::{EventKind, Scheduler};
use shared_types::SimulationConfig;
use tracing::info;

use crate::container::SimulationContainer;
use crate::errors::RuntimeResult;
use crate::genesis::GenesisBuilder;
use crate::report::RunReport;

/// A configured simulation: the scheduler plus everything it drives.
pub struct Simulation {
    scheduler: Scheduler,
    container: SimulationContainer,
    started: bool,
}

impl Simulation {
    /// Validate `config` and build the genesis state.
    pub fn new(config: SimulationConfig) -> RuntimeResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let mut scheduler = Scheduler::new(config.seed, config.mean_propagation_delay, config.end_time);
        let genesis = GenesisBuilder::new(&config).build(scheduler.rng())?;
        let container = SimulationContainer::new(Arc::clone(&config), genesis);
        Ok(Self {
            scheduler,
            container,
            started: false,
        })
    }

    pub fn container(&self) -> &SimulationContainer {
        &self.container
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Seed the initial events. Idempotent.
    pub fn bootstrap(&mut self) -> RuntimeResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let first = self.container.schedule_next_block(&mut self.scheduler)?;
        let redaction = &self.container.config.redaction;
        if self.container.redaction.is_some() {
            self.scheduler
                .schedule(redaction.tick_interval, EventKind::RedactionTick)?;
            for scheduled in &redaction.scheduled {
                self.scheduler
                    .schedule(scheduled.at, EventKind::SubmitRedaction(scheduled.clone()))?;
            }
        }
        info!(
            first_miner = %first,
            scheduled_redactions = redaction.scheduled.len(),
            "Simulation bootstrapped"
        );
        Ok(())
    }

    /// Run to the configured end time and collect the report.
    ///
    /// # Errors
    ///
    /// Only fatal errors stop the run.
    pub fn run(&mut self) -> RuntimeResult<RunReport> {
        self.bootstrap()?;
        let summary = self.scheduler.run(&mut self.container)?;
        let report = RunReport::collect(&self.container, &summary);
        info!(
            final_time = report.final_time,
            height = report.max_height(),
            common_prefix = report.common_prefix_height,
            integrity_ok = report.integrity_ok(),
            "Simulation complete"
        );
        Ok(report)
    }
}
