//! Adams–Bashforth 3 time stepping with an integrating factor.
//!
//! The linear part of the PV equations is solved exactly through the
//! per-wavenumber propagator `E = exp(dt·L)`; only the nonlinear tendency
//! `N` is stepped explicitly:
//!
//! ```text
//! q_{n+1} = E·[q_n + dt·(23·N_n − 16·E·N_{n−1} + 5·E²·N_{n−2})/12]
//! ```
//!
//! The integrator is a small state machine:
//!
//! ```text
//! Uninitialized ──initialize──▶ Initialized ──step──▶ Stepping ──…──▶ Done
//! ```
//!
//! Wavenumber (0,0) is outside both the propagator and the inversion. Its
//! streamfunction and PV values are captured at initialization and written
//! back after every step.
//!
//! # Example
//! ```ignore
//! use mqg_rs::config::ModelConfig;
//! use mqg_rs::initial::initial_state;
//! use mqg_rs::time::Ab3IntegratingFactor;
//!
//! let config = ModelConfig::default().with_grid(32, 32);
//! let mut integrator = Ab3IntegratingFactor::new(&config)?;
//! let state = initial_state(&config.initial, integrator.params(), integrator.grid());
//! integrator.initialize(state)?;
//! while !integrator.is_done() {
//!     integrator.step()?;
//! }
//! ```

use ndarray::s;
use rustfft::num_complex::Complex64;
use thiserror::Error;
use tracing::{info, trace};

use crate::config::{ConfigError, ModelConfig, TimeConfig};
use crate::grid::GridSpec;
use crate::operators::{LinearOperatorBuilder, LinearOperatorTable};
use crate::physics::PhysicalParameters;
use crate::solver::{ModelState, TendencyEngine, TendencyKind, TendencyOutput, update_moisture};
use crate::spectral::SpectralOperators;

// =============================================================================
// Errors and phases
// =============================================================================

/// Misuse of the integrator state machine, or a rejected configuration.
#[derive(Debug, Error)]
pub enum IntegratorError {
    /// `step` called before `initialize`.
    #[error("integrator has not been initialized")]
    NotInitialized,

    /// `initialize` called twice.
    #[error("integrator is already initialized")]
    AlreadyInitialized,

    /// `step` called after the configured step count was reached.
    #[error("integrator finished after {steps} steps")]
    Finished { steps: usize },

    /// Initial state with the wrong dimensions.
    #[error("initial `{field}` has shape {actual:?}, expected {expected:?}")]
    StateShape {
        field: &'static str,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// Configuration rejected before the first step.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lifecycle of an [`Ab3IntegratingFactor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegratorPhase {
    /// Constructed; no operator tables yet.
    Uninitialized,
    /// Tables built, means captured, history seeded.
    Initialized,
    /// At least one step taken, more remaining.
    Stepping,
    /// Configured step count reached.
    Done,
}

// =============================================================================
// IntegratorInfo Trait
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the explicit part.
    fn order(&self) -> usize;
}

// =============================================================================
// Conserved means
// =============================================================================

/// Wavenumber-(0,0) values held fixed during integration.
#[derive(Clone, Debug, PartialEq)]
struct ConservedMeans {
    psi: Vec<Complex64>,
    pv: Vec<Complex64>,
}

impl ConservedMeans {
    fn capture(state: &ModelState) -> Self {
        Self {
            psi: state.psi.slice(s![.., 0, 0]).to_vec(),
            pv: state.pv.slice(s![.., 0, 0]).to_vec(),
        }
    }

    fn restore(&self, state: &mut ModelState) {
        for (slot, &mean) in self.psi.iter().enumerate() {
            state.psi[[slot, 0, 0]] = mean;
        }
        for (slot, &mean) in self.pv.iter().enumerate() {
            state.pv[[slot, 0, 0]] = mean;
        }
    }
}

// =============================================================================
// AB3 integrating-factor integrator
// =============================================================================

/// Owns the model state and advances it one step at a time.
#[derive(Clone, Debug)]
pub struct Ab3IntegratingFactor {
    time: TimeConfig,
    engine: TendencyEngine,
    table: Option<LinearOperatorTable>,
    state: ModelState,
    means: Option<ConservedMeans>,
    phase: IntegratorPhase,
    step: usize,
}

impl Ab3IntegratingFactor {
    /// Validate the configuration and prepare an uninitialized integrator.
    pub fn new(config: &ModelConfig) -> Result<Self, IntegratorError> {
        let grid = GridSpec::from_config(&config.grid)?;
        let params = PhysicalParameters::from_config(config, &grid)?;
        let state = ModelState::zeros(&params, &grid);
        let engine = TendencyEngine::new(params, SpectralOperators::new(grid));

        Ok(Self {
            time: config.time.clone(),
            engine,
            table: None,
            state,
            means: None,
            phase: IntegratorPhase::Uninitialized,
            step: 0,
        })
    }

    /// Build the operator tables, capture conserved means and seed the
    /// tendency history from `initial`.
    ///
    /// All three history levels receive the same tendency, so the first step
    /// is effectively forward Euler in the nonlinear part.
    pub fn initialize(&mut self, initial: ModelState) -> Result<(), IntegratorError> {
        if self.phase != IntegratorPhase::Uninitialized {
            return Err(IntegratorError::AlreadyInitialized);
        }
        check_shape("psi", self.state.psi.dim(), initial.psi.dim())?;
        check_shape("pv", self.state.pv.dim(), initial.pv.dim())?;
        match (&self.state.moisture, &initial.moisture) {
            (Some(expected), Some(actual)) => {
                check_shape("moisture", expected.dim(), actual.dim())?;
            }
            (None, None) => {}
            (Some(expected), None) => {
                return Err(IntegratorError::StateShape {
                    field: "moisture",
                    expected: expected.dim(),
                    actual: (0, 0, 0),
                });
            }
            (None, Some(actual)) => {
                return Err(IntegratorError::StateShape {
                    field: "moisture",
                    expected: (0, 0, 0),
                    actual: actual.dim(),
                });
            }
        }

        let grid = &self.engine.operators().grid;
        info!(
            nx = grid.nx,
            ny = grid.ny,
            padded_nx = grid.nx2,
            padded_ny = grid.ny2,
            layers = self.engine.params().layers(),
            total_layers = self.engine.params().total_layers(),
            dt = self.time.dt,
            steps = self.time.steps,
            "initializing integrator"
        );
        let table =
            LinearOperatorBuilder::new(self.engine.params(), grid, self.time.dt).build();

        self.state = initial;
        self.means = Some(ConservedMeans::capture(&self.state));
        let output = self.engine.compute(&self.state);
        self.store_tendency(output, true);
        self.table = Some(table);

        self.phase = IntegratorPhase::Initialized;
        Ok(())
    }

    /// Advance the state by one timestep.
    pub fn step(&mut self) -> Result<(), IntegratorError> {
        match self.phase {
            IntegratorPhase::Uninitialized => return Err(IntegratorError::NotInitialized),
            IntegratorPhase::Done => {
                return Err(IntegratorError::Finished {
                    steps: self.time.steps,
                });
            }
            IntegratorPhase::Initialized | IntegratorPhase::Stepping => {}
        }
        let (Some(table), Some(means)) = (self.table.as_ref(), self.means.as_ref()) else {
            return Err(IntegratorError::NotInitialized);
        };
        let dt = self.time.dt;

        let increment = self.state.history.ab3_increment(dt);
        self.state.pv += &increment;
        self.state.pv = table.propagate(&self.state.pv);
        self.state.history.rotate(table);

        self.state.psi = table.invert(&self.state.pv);
        means.restore(&mut self.state);

        let output = self.engine.compute(&self.state);
        self.store_tendency(output, false);
        update_moisture(&mut self.state, self.engine.params(), dt);

        self.step += 1;
        self.phase = if self.step >= self.time.steps {
            IntegratorPhase::Done
        } else {
            IntegratorPhase::Stepping
        };
        trace!(step = self.step, time = self.time(), "step complete");
        Ok(())
    }

    fn store_tendency(&mut self, output: TendencyOutput, seed: bool) {
        if let Some(precip) = output.precipitation {
            self.state.mean_precip = precip.mean;
            self.state.precip = Some(precip.field);
        }
        if seed {
            self.state.history.seed(output.tendency);
        } else {
            self.state.history.current = output.tendency;
        }
    }

    pub fn phase(&self) -> IntegratorPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == IntegratorPhase::Done
    }

    /// Completed step count.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Model time of the current state.
    pub fn time(&self) -> f64 {
        self.step as f64 * self.time.dt
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn params(&self) -> &PhysicalParameters {
        self.engine.params()
    }

    pub fn grid(&self) -> &GridSpec {
        &self.engine.operators().grid
    }

    pub fn operators(&self) -> &SpectralOperators {
        self.engine.operators()
    }

    pub fn tendency_kind(&self) -> TendencyKind {
        self.engine.kind()
    }

    pub fn time_config(&self) -> &TimeConfig {
        &self.time
    }

    /// Operator tables, available once initialized.
    pub fn table(&self) -> Option<&LinearOperatorTable> {
        self.table.as_ref()
    }

    /// Times at which snapshots are emitted: every `output_interval` steps,
    /// starting from zero.
    pub fn output_times(&self) -> Vec<f64> {
        output_times(&self.time)
    }
}

impl IntegratorInfo for Ab3IntegratingFactor {
    fn name(&self) -> &'static str {
        "ab3-integrating-factor"
    }

    fn order(&self) -> usize {
        3
    }
}

/// Snapshot times `k·output_interval·dt` for `k = 0..=steps/output_interval`.
pub fn output_times(time: &TimeConfig) -> Vec<f64> {
    let interval = time.output_interval.max(1);
    (0..=time.steps / interval)
        .map(|k| (k * interval) as f64 * time.dt)
        .collect()
}

fn check_shape(
    field: &'static str,
    expected: (usize, usize, usize),
    actual: (usize, usize, usize),
) -> Result<(), IntegratorError> {
    if expected == actual {
        Ok(())
    } else {
        Err(IntegratorError::StateShape {
            field,
            expected,
            actual,
        })
    }
}
