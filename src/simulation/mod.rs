//! Simulation driver and output sinks.
//!
//! # Example
//! ```no_run
//! use mqg_rs::config::ModelConfig;
//! use mqg_rs::simulation::{Simulation, SnapshotStore, TracingDiagnostics};
//!
//! let config = ModelConfig::default().with_grid(64, 64).with_time(0.01, 500, 50);
//! let mut sim = Simulation::new(&config)?;
//! let mut store = SnapshotStore::new();
//! let result = sim.run(&mut store, &mut TracingDiagnostics)?;
//! println!("t = {:.2} after {} steps", result.final_time, result.n_steps);
//! # Ok::<(), mqg_rs::simulation::SimulationError>(())
//! ```

mod runner;
mod sinks;

pub use runner::{Simulation, SimulationError, SimulationResult};
pub use sinks::{
    DiagnosticsSink, NullSink, OwnedSnapshot, SaveSink, SinkError, Snapshot, SnapshotStore,
    TracingDiagnostics, WriterDiagnostics,
};
