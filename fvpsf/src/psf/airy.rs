//! Diffraction pattern of a centrally obscured circular aperture.
//!
//! The amplitude of an annular pupil with obscuration ratio ε is
//!
//! ```text
//! A(x) = [2·J₁(x)/x − ε²·2·J₁(εx)/(εx)] / (1 − ε²)
//! ```
//!
//! with `x = π·D·θ/λ`. The intensity `A(x)²` is normalised to 1 on axis.
//! For ε = 0 this reduces to the classic Airy disk.

use scilib::math::bessel;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// `2·J₁(x)/x`, with its limit of 1 at the origin.
fn jinc(x: f64) -> f64 {
    if x.abs() < 1e-10 {
        return 1.0;
    }
    2.0 * bessel::j_n(1, x) / x
}

/// Airy pattern of an annular aperture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObscuredAiry {
    /// Linear obscuration ratio in [0, 1)
    pub obscuration: f64,
}

impl ObscuredAiry {
    pub fn new(obscuration: f64) -> Self {
        Self { obscuration }
    }

    /// Normalised intensity at the dimensionless radius `x = π·D·θ/λ`.
    pub fn intensity(&self, x: f64) -> f64 {
        let eps = self.obscuration;
        let eps2 = eps * eps;
        let amplitude = (jinc(x) - eps2 * jinc(eps * x)) / (1.0 - eps2);
        amplitude * amplitude
    }

    /// Dimensionless radius per arcsec of field angle for a given aperture
    /// and wavelength.
    pub fn radius_scale(diameter_m: f64, wavelength_um: f64) -> f64 {
        std::f64::consts::PI * diameter_m * ARCSEC_TO_RAD / (wavelength_um * 1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_on_axis() {
        assert_eq!(ObscuredAiry::new(0.0).intensity(0.0), 1.0);
        assert_relative_eq!(ObscuredAiry::new(0.28).intensity(0.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unobscured_first_zero() {
        let airy = ObscuredAiry::new(0.0);
        assert!(airy.intensity(3.8317) < 1e-6);
        assert!(airy.intensity(1.0) > 0.5);
    }

    #[test]
    fn test_obscuration_narrows_core() {
        let clear = ObscuredAiry::new(0.0);
        let annular = ObscuredAiry::new(0.3);
        assert!(annular.intensity(2.5) < clear.intensity(2.5));
    }

    #[test]
    fn test_radius_scale() {
        // lambda / D in arcsec for a 39 m aperture at 2.15 um
        let lambda_over_d = 2.15e-6 / 39.0 / ARCSEC_TO_RAD;
        let scale = ObscuredAiry::radius_scale(39.0, 2.15);
        assert_relative_eq!(scale * lambda_over_d, std::f64::consts::PI, epsilon = 1e-9);
    }
}
