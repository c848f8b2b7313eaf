//! Simulation driver.
//!
//! Initializes an [`Ab3IntegratingFactor`], then steps it to completion,
//! handing a snapshot and a diagnostic summary to the sinks at time zero and
//! after every `output_interval` steps.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use super::sinks::{DiagnosticsSink, SaveSink, SinkError, Snapshot};
use crate::config::{ConfigError, ModelConfig};
use crate::initial::initial_state;
use crate::solver::{DiagnosticSummary, DiagnosticsTracker, ModelState};
use crate::time::{Ab3IntegratingFactor, IntegratorError, IntegratorInfo};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Integrator(#[from] IntegratorError),

    #[error("output sink failed: {0}")]
    Sink(#[from] SinkError),
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Outcome of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Model time reached.
    pub final_time: f64,
    /// Steps completed over the lifetime of the simulation.
    pub n_steps: usize,
    /// Snapshots handed to the save sink during this run.
    pub n_outputs: usize,
    /// Stopped early by the cancellation predicate.
    pub cancelled: bool,
    /// Largest peak velocity among emitted summaries.
    pub max_velocity: f64,
    /// Last emitted summary was finite.
    pub stable: bool,
    /// Change in mean moisture between the first and last summary.
    pub moisture_drift: Option<f64>,
    /// Wall-clock time in seconds.
    pub wall_time: f64,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Owns an initialized integrator and drives it through the output loop.
#[derive(Debug)]
pub struct Simulation {
    integrator: Ab3IntegratingFactor,
    output_interval: usize,
}

impl Simulation {
    /// Validate `config`, seed the initial state from `config.initial` and
    /// initialize the integrator.
    pub fn new(config: &ModelConfig) -> Result<Self, SimulationError> {
        let integrator = Ab3IntegratingFactor::new(config)?;
        let state = initial_state(&config.initial, integrator.params(), integrator.grid());
        Self::with_integrator(integrator, state)
    }

    /// As [`new`](Self::new), reading the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let config = ModelConfig::from_file(path)?;
        Self::new(&config)
    }

    /// Start from a caller-provided initial state.
    pub fn from_state(config: &ModelConfig, state: ModelState) -> Result<Self, SimulationError> {
        let integrator = Ab3IntegratingFactor::new(config)?;
        Self::with_integrator(integrator, state)
    }

    fn with_integrator(
        mut integrator: Ab3IntegratingFactor,
        state: ModelState,
    ) -> Result<Self, SimulationError> {
        integrator.initialize(state)?;
        let output_interval = integrator.time_config().output_interval;
        info!(
            integrator = integrator.name(),
            order = integrator.order(),
            tendency = integrator.tendency_kind().name(),
            output_interval,
            "simulation ready"
        );
        Ok(Self {
            integrator,
            output_interval,
        })
    }

    pub fn integrator(&self) -> &Ab3IntegratingFactor {
        &self.integrator
    }

    pub fn state(&self) -> &ModelState {
        self.integrator.state()
    }

    /// Summary of the current state.
    pub fn diagnostics(&self) -> DiagnosticSummary {
        DiagnosticSummary::compute(
            self.integrator.steps_taken(),
            self.integrator.time(),
            self.integrator.state(),
            self.integrator.operators(),
            self.integrator.params(),
        )
    }

    /// Run all remaining steps.
    pub fn run<S, D>(&mut self, save: &mut S, diagnostics: &mut D) -> Result<SimulationResult, SimulationError>
    where
        S: SaveSink + ?Sized,
        D: DiagnosticsSink + ?Sized,
    {
        self.run_with_cancel(save, diagnostics, || false)
    }

    /// Run remaining steps, polling `cancel` after each completed step.
    ///
    /// A cancelled run stops on a step boundary; the state is complete and a
    /// later call resumes from it.
    pub fn run_with_cancel<S, D, C>(
        &mut self,
        save: &mut S,
        diagnostics: &mut D,
        mut cancel: C,
    ) -> Result<SimulationResult, SimulationError>
    where
        S: SaveSink + ?Sized,
        D: DiagnosticsSink + ?Sized,
        C: FnMut() -> bool,
    {
        let start_wall = Instant::now();
        let mut n_outputs = 0;
        let mut tracker = DiagnosticsTracker::new(self.diagnostics());

        if self.integrator.steps_taken() == 0 {
            self.emit(save, diagnostics, tracker.initial())?;
            n_outputs += 1;
        }

        let mut cancelled = false;
        while !self.integrator.is_done() {
            if cancel() {
                cancelled = true;
                info!(step = self.integrator.steps_taken(), "simulation cancelled");
                break;
            }
            self.integrator.step()?;

            if self.integrator.steps_taken() % self.output_interval == 0 {
                let summary = self.diagnostics();
                self.emit(save, diagnostics, &summary)?;
                tracker.update(summary);
                n_outputs += 1;
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        info!(
            steps = self.integrator.steps_taken(),
            time = self.integrator.time(),
            outputs = n_outputs,
            wall_time,
            "simulation finished"
        );

        Ok(SimulationResult {
            final_time: self.integrator.time(),
            n_steps: self.integrator.steps_taken(),
            n_outputs,
            cancelled,
            max_velocity: tracker.max_velocity_seen(),
            stable: tracker.is_stable(),
            moisture_drift: tracker.moisture_drift(),
            wall_time,
        })
    }

    fn emit<S, D>(
        &self,
        save: &mut S,
        diagnostics: &mut D,
        summary: &DiagnosticSummary,
    ) -> Result<(), SimulationError>
    where
        S: SaveSink + ?Sized,
        D: DiagnosticsSink + ?Sized,
    {
        let snapshot = Snapshot::from_state(summary.step, summary.time, self.integrator.state());
        save.save(&snapshot)?;
        diagnostics.record(summary)?;
        Ok(())
    }
}
