//! Dry and moist physical coefficients.
//!
//! Configuration values are nondimensionalized against the velocity shear
//! `U = U0 − U1` and the deformation wavenumbers:
//! - damping `r_j = r̂_j·|U|·k_d[last]`
//! - hyperviscosity `ν = c·|U|/λ⁷`, with `λ = sqrt(mean(k_d²))`
//! - condensation threshold `CC = ĉ·L·k_d[1]²`
//! - evaporation `E = L·ê·nx·ny/(k_d[1]²·|U|)`, in units of the (0,0) coefficient
//!
//! The moist PV of the lower layer has background gradient
//! `γ = β − (k_d[1]²·U + CC)/(1 − L)`.

use tracing::warn;

use super::LayerLayout;
use crate::config::{ConfigError, DryConfig, ModelConfig, MoistConfig};
use crate::grid::GridSpec;

/// Dry dynamical coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct DryParameters {
    /// Per-layer linear damping.
    pub damping: Vec<f64>,
    /// Planetary vorticity gradient.
    pub beta: f64,
    /// Per-layer Rossby deformation wavenumbers.
    pub deformation_wavenumbers: Vec<f64>,
    /// Imposed per-layer background zonal velocity.
    pub mean_velocity: Vec<f64>,
    /// Signed shear `U0 − U1`.
    pub shear: f64,
    /// RMS deformation wavenumber.
    pub lambda: f64,
    /// Hyperviscosity coefficient.
    pub nu: f64,
    /// Baroclinic criticality `|U|·λ²/β`.
    pub criticality: f64,
}

impl DryParameters {
    /// Derive dry coefficients from configuration.
    pub fn from_config(config: &DryConfig) -> Self {
        let shear = config.mean_velocity[0] - config.mean_velocity[1];
        let u_scale = shear.abs();
        let kd = &config.deformation_wavenumbers;
        let lambda = (kd.iter().map(|k| k * k).sum::<f64>() / kd.len() as f64).sqrt();
        let kd_last = kd[kd.len() - 1];

        Self {
            damping: config.damping.iter().map(|r| r * u_scale * kd_last).collect(),
            beta: config.beta,
            deformation_wavenumbers: kd.clone(),
            mean_velocity: config.mean_velocity.clone(),
            shear,
            lambda,
            nu: config.dissipation_coeff * u_scale / lambda.powi(7),
            criticality: u_scale * lambda * lambda / config.beta,
        }
    }

    /// Squared deformation wavenumber `F_j = k_d[j]²`.
    #[inline]
    pub fn f(&self, layer: usize) -> f64 {
        self.deformation_wavenumbers[layer].powi(2)
    }

    /// Background PV gradient of dry layer `layer`.
    pub fn background_pv_gradient(&self, layer: usize) -> f64 {
        if layer == 0 {
            self.beta + self.f(0) * self.shear
        } else {
            self.beta - self.f(1) * self.shear
        }
    }
}

/// Moist coefficients, present only when a layer carries moisture.
#[derive(Clone, Debug, PartialEq)]
pub struct MoistParameters {
    /// Latent heating efficiency `L` in `[0, 1)`.
    pub latent_heating: f64,
    /// Condensation threshold coefficient `CC`.
    pub condensation: f64,
    /// Background moist PV gradient `γ`.
    pub gamma: f64,
    /// Evaporation rate in spectral-mean units.
    pub evaporation: f64,
    /// Convective relaxation timescale.
    pub relaxation_time: f64,
}

impl MoistParameters {
    /// Derive moist coefficients for a lower moist layer.
    pub fn from_config(config: &MoistConfig, dry: &DryParameters, grid: &GridSpec) -> Self {
        let l = config.latent_heating;
        let f1 = dry.f(1);
        let condensation = config.condensation * l * f1;
        Self {
            latent_heating: l,
            condensation,
            gamma: dry.beta - (f1 * dry.shear + condensation) / (1.0 - l),
            evaporation: l * config.evaporation * grid.sample_count() / (f1 * dry.shear.abs()),
            relaxation_time: config.relaxation_time,
        }
    }
}

/// All coefficients needed by the operator builder and tendency engine.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalParameters {
    /// Dry/moist slot arrangement
    pub layout: LayerLayout,
    /// Dry coefficients
    pub dry: DryParameters,
    /// Moist coefficients (`None` if no layer is moist)
    pub moist: Option<MoistParameters>,
    /// Precipitation enabled (forced off without a moist layer)
    pub rain: bool,
}

impl PhysicalParameters {
    /// Validate the configuration and derive all coefficients.
    pub fn from_config(config: &ModelConfig, grid: &GridSpec) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = LayerLayout::from_mask(&config.layers.moisture);
        let dry = DryParameters::from_config(&config.dry);
        let moist = layout
            .has_moisture()
            .then(|| MoistParameters::from_config(&config.moist, &dry, grid));

        let rain = config.layers.rain && moist.is_some();
        if config.layers.rain && !rain {
            warn!("rain requested without a moist layer; precipitation disabled");
        }

        Ok(Self {
            layout,
            dry,
            moist,
            rain,
        })
    }

    /// Number of dry layers.
    pub fn layers(&self) -> usize {
        self.layout.layers
    }

    /// Length of the PV state vector.
    pub fn total_layers(&self) -> usize {
        self.layout.total_layers()
    }

    /// Latent heating efficiency, zero for a dry model.
    pub fn latent_heating(&self) -> f64 {
        self.moist.as_ref().map_or(0.0, |m| m.latent_heating)
    }
}
