//! # mqg-rs
//!
//! A pseudo-spectral multi-layer moist quasi-geostrophic model on a doubly
//! periodic domain.
//!
//! This crate provides the building blocks of the model:
//! - Configuration with TOML loading and validation
//! - Half-spectrum wavenumber grids with 3/2-rule padding
//! - Real-to-complex 2D transforms, spectral derivatives and dealiased Jacobians
//! - Dry and moist physical coefficients
//! - Per-wavenumber linear operators, their exact propagators and the dry
//!   PV inversion
//! - Nonlinear tendencies with convective precipitation relaxation
//! - Adams–Bashforth 3 time stepping with an integrating factor
//! - Seeded initial conditions
//! - A simulation driver with snapshot and diagnostics sinks

pub mod config;
pub mod grid;
pub mod initial;
pub mod operators;
pub mod physics;
pub mod simulation;
pub mod solver;
pub mod spectral;
pub mod time;

// Re-export main types for convenience
pub use config::{ConfigError, ModelConfig};
pub use grid::GridSpec;
pub use initial::initial_state;
pub use operators::{LinearOperatorBuilder, LinearOperatorTable};
pub use physics::{LayerLayout, PhysicalParameters};
pub use simulation::{
    DiagnosticsSink, SaveSink, Simulation, SimulationError, SimulationResult, SnapshotStore,
};
pub use solver::{DiagnosticSummary, ModelState, TendencyEngine, TendencyKind};
pub use spectral::{LayeredField, PhysicalField, SpectralField, SpectralOperators};
pub use time::{Ab3IntegratingFactor, IntegratorError, IntegratorPhase};
