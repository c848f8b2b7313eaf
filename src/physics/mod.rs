//! Physical parameters and the layer index space.

mod layers;
mod parameters;

pub use layers::LayerLayout;
pub use parameters::{DryParameters, MoistParameters, PhysicalParameters};
