//! Construction parameters for analytic PSF models
//!
//! All fields have defaults, so a JSON file only needs the keys it wants to
//! change:
//!
//! ```json
//! { "kernel_size": 256, "profile": "EsoQ1", "seeing_arcsec": 0.6 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::profile::AtmosphereProfile;
use super::PsfError;

/// Parameters shared by every model instance in a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsfConfig {
    /// Side length of the square kernel in pixels
    pub kernel_size: usize,
    /// Observing wavelength in um
    pub wavelength_um: f64,
    /// Angular size of a kernel pixel in arcsec
    pub pixel_scale_arcsec: f64,
    pub profile: AtmosphereProfile,
    /// Seeing FWHM at 500 nm and zenith in arcsec
    pub seeing_arcsec: f64,
    pub zenith_distance_deg: f64,
    /// Residual wavefront error not covered by the fitting term, in nm RMS
    pub residual_rms_nm: f64,
    /// Deformable mirror actuator pitch projected on the pupil, in metres
    pub actuator_pitch_m: f64,
    pub telescope_diameter_m: f64,
    /// Linear central obscuration ratio
    pub central_obscuration: f64,
}

impl Default for PsfConfig {
    fn default() -> Self {
        Self {
            kernel_size: 512,
            wavelength_um: 2.15,
            pixel_scale_arcsec: 0.004,
            profile: AtmosphereProfile::EsoMedian,
            seeing_arcsec: 0.8,
            zenith_distance_deg: 0.0,
            residual_rms_nm: 100.0,
            actuator_pitch_m: 0.5,
            telescope_diameter_m: 38.542,
            central_obscuration: 0.28,
        }
    }
}

impl PsfConfig {
    /// Loads a config from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PsfError> {
        let text = std::fs::read_to_string(path).map_err(|source| PsfError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config: PsfConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_wavelength(&self, wavelength_um: f64) -> Self {
        Self {
            wavelength_um,
            ..self.clone()
        }
    }

    pub fn with_kernel_size(&self, kernel_size: usize) -> Self {
        Self {
            kernel_size,
            ..self.clone()
        }
    }

    /// Airmass for the configured zenith distance.
    pub fn airmass(&self) -> f64 {
        1.0 / self.zenith_distance_deg.to_radians().cos()
    }

    /// Checks that the parameters describe a constructible model.
    pub fn validate(&self) -> Result<(), PsfError> {
        fn positive(name: &'static str, value: f64) -> Result<(), PsfError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PsfError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and positive",
                })
            }
        }

        if self.kernel_size == 0 {
            return Err(PsfError::InvalidParameter {
                name: "kernel_size",
                value: 0.0,
                reason: "must be at least one pixel",
            });
        }
        positive("wavelength_um", self.wavelength_um)?;
        positive("pixel_scale_arcsec", self.pixel_scale_arcsec)?;
        positive("seeing_arcsec", self.seeing_arcsec)?;
        positive("actuator_pitch_m", self.actuator_pitch_m)?;
        positive("telescope_diameter_m", self.telescope_diameter_m)?;

        if !(0.0..1.0).contains(&self.central_obscuration) {
            return Err(PsfError::InvalidParameter {
                name: "central_obscuration",
                value: self.central_obscuration,
                reason: "must lie in [0, 1)",
            });
        }
        if !(0.0..90.0).contains(&self.zenith_distance_deg) {
            return Err(PsfError::InvalidParameter {
                name: "zenith_distance_deg",
                value: self.zenith_distance_deg,
                reason: "must lie in [0, 90)",
            });
        }
        if !self.residual_rms_nm.is_finite() || self.residual_rms_nm < 0.0 {
            return Err(PsfError::InvalidParameter {
                name: "residual_rms_nm",
                value: self.residual_rms_nm,
                reason: "must be finite and non-negative",
            });
        }

        Ok(())
    }
}
