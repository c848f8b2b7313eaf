//! Time integration.
//!
//! - [`Ab3IntegratingFactor`]: Adams–Bashforth 3 with an exact linear
//!   propagator, driven as a small state machine

mod integrator;

pub use integrator::{
    Ab3IntegratingFactor, IntegratorError, IntegratorInfo, IntegratorPhase, output_times,
};
