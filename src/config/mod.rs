//! Model configuration.
//!
//! [`ModelConfig`] is the single immutable description of a run: grid, layer
//! arrangement, dry and moist coefficients, time stepping and the initial
//! condition seed. It is deserialized from TOML with every section optional;
//! missing values fall back to the reference two-layer setup.
//!
//! ```
//! use mqg_rs::config::ModelConfig;
//!
//! let config = ModelConfig::from_toml_str(
//!     r#"
//!     [grid]
//!     nx = 64
//!     ny = 64
//!
//!     [time]
//!     dt = 0.005
//!     steps = 10
//!     output_interval = 5
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.grid.nx, 64);
//! assert_eq!(config.layers.count, 2);
//! ```

mod error;

pub use error::ConfigError;

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Physical grid size and domain length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of physical points in x.
    pub nx: usize,
    /// Number of physical points in y.
    pub ny: usize,
    /// Domain length `[Lx, Ly]`.
    pub length: [f64; 2],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: 256,
            ny: 256,
            length: [2.0 * PI, 2.0 * PI],
        }
    }
}

/// Dry layer count and which layers carry moisture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Number of dry dynamical layers.
    pub count: usize,
    /// Moisture mask, one flag per dry layer.
    pub moisture: Vec<bool>,
    /// Enable precipitation relaxation. Ignored when no layer is moist.
    pub rain: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            count: 2,
            moisture: vec![false, true],
            rain: true,
        }
    }
}

/// Dry dynamical coefficients (before nondimensional scaling).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DryConfig {
    /// Per-layer linear damping coefficient.
    pub damping: Vec<f64>,
    /// Planetary vorticity gradient.
    pub beta: f64,
    /// Per-layer Rossby deformation wavenumber.
    pub deformation_wavenumbers: Vec<f64>,
    /// Imposed per-layer zonal background velocity.
    pub mean_velocity: Vec<f64>,
    /// Hyperviscosity coefficient, scaled by the deformation wavenumber.
    pub dissipation_coeff: f64,
}

impl Default for DryConfig {
    fn default() -> Self {
        Self {
            damping: vec![0.0, 0.16],
            beta: 0.78,
            deformation_wavenumbers: vec![50.0, 50.0],
            mean_velocity: vec![0.5, -0.5],
            dissipation_coeff: 0.008,
        }
    }
}

/// Moist coefficients. Only used when at least one layer is moist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistConfig {
    /// Latent heating efficiency in `[0, 1)`.
    pub latent_heating: f64,
    /// Condensation threshold coefficient.
    pub condensation: f64,
    /// Evaporation forcing magnitude.
    pub evaporation: f64,
    /// Convective relaxation timescale (must be positive).
    pub relaxation_time: f64,
}

impl Default for MoistConfig {
    fn default() -> Self {
        Self {
            latent_heating: 0.2,
            condensation: 2.0,
            evaporation: 1.39,
            relaxation_time: 0.15,
        }
    }
}

/// Time stepping parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Time step size.
    pub dt: f64,
    /// Total number of steps.
    pub steps: usize,
    /// Emit a snapshot and diagnostics line every this many steps.
    pub output_interval: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            steps: 100,
            output_interval: 100,
        }
    }
}

/// Random initial condition parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    /// Standard deviation of the spectral noise.
    pub noise: f64,
    /// Random seed.
    pub seed: u64,
    /// Domain-mean initial moisture.
    pub moisture: f64,
    /// Number of seeded rows at each end of the wrapped y-wavenumber axis.
    pub k_range: usize,
    /// Number of seeded non-negative x-wavenumber columns.
    pub l_range: usize,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            noise: 0.01,
            seed: 1,
            moisture: 0.0,
            k_range: 16,
            l_range: 16,
        }
    }
}

/// Complete, immutable configuration of a model run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub grid: GridConfig,
    pub layers: LayerConfig,
    pub dry: DryConfig,
    pub moist: MoistConfig,
    pub time: TimeConfig,
    pub initial: InitialConfig,
}

impl ModelConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the physical grid size.
    pub fn with_grid(mut self, nx: usize, ny: usize) -> Self {
        self.grid.nx = nx;
        self.grid.ny = ny;
        self
    }

    /// Set the moisture mask.
    pub fn with_moisture(mut self, moisture: Vec<bool>) -> Self {
        self.layers.moisture = moisture;
        self
    }

    /// Enable or disable precipitation.
    pub fn with_rain(mut self, rain: bool) -> Self {
        self.layers.rain = rain;
        self
    }

    /// Set time step, step count and output interval.
    pub fn with_time(mut self, dt: f64, steps: usize, output_interval: usize) -> Self {
        self.time = TimeConfig {
            dt,
            steps,
            output_interval,
        };
        self
    }

    /// Set the initial noise amplitude and seed.
    pub fn with_noise(mut self, noise: f64, seed: u64) -> Self {
        self.initial.noise = noise;
        self.initial.seed = seed;
        self
    }

    /// Number of layers flagged moist.
    pub fn moist_layer_count(&self) -> usize {
        self.layers.moisture.iter().filter(|&&m| m).count()
    }

    /// Check array shapes and the supported layer arrangement.
    ///
    /// Latent heating below one and a positive relaxation time are
    /// preconditions of the moist physics and are not checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.nx < 4 || grid.ny < 4 || grid.nx % 2 != 0 || grid.ny % 2 != 0 {
            return Err(ConfigError::InvalidGrid(format!(
                "grid {}x{} must be even and at least 4x4",
                grid.nx, grid.ny
            )));
        }
        if !(grid.length[0] > 0.0 && grid.length[1] > 0.0) {
            return Err(ConfigError::InvalidGrid(format!(
                "domain length {:?} must be positive",
                grid.length
            )));
        }

        let layers = self.layers.count;
        if layers != 2 {
            return Err(ConfigError::UnsupportedLayers(format!(
                "{layers} dry layers requested; only the two-layer model is implemented"
            )));
        }
        check_len("layers.moisture", layers, self.layers.moisture.len())?;
        check_len("dry.damping", layers, self.dry.damping.len())?;
        check_len(
            "dry.deformation_wavenumbers",
            layers,
            self.dry.deformation_wavenumbers.len(),
        )?;
        check_len("dry.mean_velocity", layers, self.dry.mean_velocity.len())?;

        if self.layers.moisture[0] {
            return Err(ConfigError::UnsupportedLayers(
                "only the lower layer (index 1) may carry moisture".to_string(),
            ));
        }

        let shear = self.dry.mean_velocity[0] - self.dry.mean_velocity[1];
        if shear == 0.0 {
            return Err(ConfigError::UnsupportedLayers(
                "mean velocities must differ: damping and dissipation scale with the shear"
                    .to_string(),
            ));
        }

        let time = &self.time;
        if !(time.dt > 0.0) {
            return Err(ConfigError::InvalidTime(format!(
                "dt = {} must be positive",
                time.dt
            )));
        }
        if time.steps == 0 {
            return Err(ConfigError::InvalidTime(
                "steps must be at least 1".to_string(),
            ));
        }
        if time.output_interval == 0 {
            return Err(ConfigError::InvalidTime(
                "output_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigError::shape_mismatch(field, expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.moist_layer_count(), 1);
        assert_eq!(config.grid.nx, 256);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ModelConfig::from_toml_str(
            r#"
            [layers]
            moisture = [false, false]
            rain = true

            [dry]
            beta = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.dry.beta, 1.5);
        assert_eq!(config.dry.deformation_wavenumbers, vec![50.0, 50.0]);
        assert_eq!(config.moist_layer_count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let mut config = ModelConfig::default();
        config.dry.damping = vec![0.0, 0.1, 0.2];
        match config.validate() {
            Err(ConfigError::ShapeMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "dry.damping");
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_grid_rejected() {
        let config = ModelConfig::default().with_grid(31, 32);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGrid(_))));
    }

    #[test]
    fn test_upper_moist_layer_rejected() {
        let config = ModelConfig::default().with_moisture(vec![true, false]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedLayers(_))
        ));
    }

    #[test]
    fn test_zero_output_interval_rejected() {
        let config = ModelConfig::default().with_time(0.01, 10, 0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTime(_))));
    }

    #[test]
    fn test_bad_toml() {
        let result = ModelConfig::from_toml_str("[grid]\nnx = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
