//! Atmospheric turbulence profiles
//!
//! Each profile is a coarse summary of an ESO reference C_n² profile for
//! Cerro Armazones: a handful of layer altitudes with fractional turbulence
//! weights. Only the effective turbulence height is used downstream, which
//! sets the isoplanatic angle.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Layer altitudes in metres above the telescope shared by all profiles.
const LAYER_HEIGHTS_M: [f64; 6] = [30.0, 140.0, 560.0, 2_500.0, 7_500.0, 14_500.0];

/// Named turbulence profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AtmosphereProfile {
    /// Best quartile
    EsoQ1,
    EsoQ2,
    EsoQ3,
    /// Worst quartile
    EsoQ4,
    /// Median conditions
    #[default]
    EsoMedian,
}

impl AtmosphereProfile {
    pub const ALL: [AtmosphereProfile; 5] = [
        AtmosphereProfile::EsoQ1,
        AtmosphereProfile::EsoQ2,
        AtmosphereProfile::EsoQ3,
        AtmosphereProfile::EsoQ4,
        AtmosphereProfile::EsoMedian,
    ];

    /// Profile name as written into FITS headers.
    pub fn name(&self) -> &'static str {
        match self {
            AtmosphereProfile::EsoQ1 => "EsoQ1",
            AtmosphereProfile::EsoQ2 => "EsoQ2",
            AtmosphereProfile::EsoQ3 => "EsoQ3",
            AtmosphereProfile::EsoQ4 => "EsoQ4",
            AtmosphereProfile::EsoMedian => "EsoMedian",
        }
    }

    /// Fractional C_n² weight of each layer in [`LAYER_HEIGHTS_M`]; sums to 1.
    pub fn layer_weights(&self) -> [f64; 6] {
        match self {
            AtmosphereProfile::EsoQ1 => [0.45, 0.15, 0.10, 0.10, 0.12, 0.08],
            AtmosphereProfile::EsoQ2 => [0.40, 0.14, 0.10, 0.11, 0.14, 0.11],
            AtmosphereProfile::EsoQ3 => [0.36, 0.12, 0.10, 0.12, 0.17, 0.13],
            AtmosphereProfile::EsoQ4 => [0.30, 0.10, 0.10, 0.14, 0.20, 0.16],
            AtmosphereProfile::EsoMedian => [0.38, 0.13, 0.10, 0.12, 0.15, 0.12],
        }
    }

    /// Effective turbulence height `(Σ wᵢ hᵢ^(5/3))^(3/5)` in metres at zenith.
    pub fn effective_height_m(&self) -> f64 {
        let moment: f64 = self
            .layer_weights()
            .iter()
            .zip(LAYER_HEIGHTS_M.iter())
            .map(|(w, h)| w * h.powf(5.0 / 3.0))
            .sum();
        moment.powf(3.0 / 5.0)
    }
}

impl std::fmt::Display for AtmosphereProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
