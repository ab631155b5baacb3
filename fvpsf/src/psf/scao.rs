//! Analytic single-conjugate adaptive optics PSF
//!
//! The kernel is a two-component model:
//!
//! ```text
//! K(θ) = S(θ) · core + (1 − S(θ)) · halo
//! ```
//!
//! - **core**: diffraction pattern of the (centrally obscured) pupil
//! - **halo**: Moffat profile with the uncorrected seeing FWHM `0.98 λ / r0`
//! - **S(θ)**: Maréchal-style Strehl from the fitting error, a residual
//!   wavefront term, and anisoplanatism `(θ / θ0)^(5/3)` at field angle θ
//!
//! Both components are sampled once at construction and normalised to unit
//! sum over the kernel, so evaluating a new offset only rescales and adds
//! two cached images.

use ndarray::{Array2, Zip};

use super::airy::ObscuredAiry;
use super::config::PsfConfig;
use super::{PsfError, PsfModel};
use crate::field::SamplePoint;
use crate::product::header::Header;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Reference wavelength for seeing values, in um.
const SEEING_WAVELENGTH_UM: f64 = 0.5;

/// Moffat index matching a Kolmogorov long-exposure profile.
const HALO_MOFFAT_BETA: f64 = 4.765;

/// Coefficient of the deformable mirror fitting error `a·(d/r0)^(5/3)`.
const FITTING_COEFFICIENT: f64 = 0.257;

/// Fried parameter in metres at the given wavelength, including airmass.
pub fn fried_parameter_m(config: &PsfConfig, wavelength_um: f64) -> f64 {
    let r0_ref = 0.98 * SEEING_WAVELENGTH_UM * 1e-6 / (config.seeing_arcsec * ARCSEC_TO_RAD);
    r0_ref * (wavelength_um / SEEING_WAVELENGTH_UM).powf(6.0 / 5.0) * config.airmass().powf(-3.0 / 5.0)
}

/// Isoplanatic angle in arcsec.
pub fn isoplanatic_angle_arcsec(config: &PsfConfig) -> f64 {
    let r0 = fried_parameter_m(config, config.wavelength_um);
    let h_eff = config.profile.effective_height_m() * config.airmass();
    0.314 * r0 / h_eff / ARCSEC_TO_RAD
}

/// Analytic SCAO PSF for one wavelength and kernel size.
#[derive(Debug, Clone)]
pub struct AnalyticScaoPsf {
    config: PsfConfig,
    core: Array2<f64>,
    halo: Array2<f64>,
    core_peak: f64,
    halo_peak: f64,
    on_axis_phase_variance: f64,
    isoplanatic_angle: f64,
}

impl AnalyticScaoPsf {
    /// Builds the model, sampling the core and halo images.
    pub fn new(config: PsfConfig) -> Result<Self, PsfError> {
        config.validate()?;

        let n = config.kernel_size;
        let lambda = config.wavelength_um;
        let r0 = fried_parameter_m(&config, lambda);

        let fitting = FITTING_COEFFICIENT * (config.actuator_pitch_m / r0).powf(5.0 / 3.0);
        let residual = (2.0 * std::f64::consts::PI * config.residual_rms_nm * 1e-3 / lambda).powi(2);
        let isoplanatic_angle = isoplanatic_angle_arcsec(&config);

        let airy = ObscuredAiry::new(config.central_obscuration);
        let x_per_arcsec = ObscuredAiry::radius_scale(config.telescope_diameter_m, lambda);
        let core = sample_radial(n, config.pixel_scale_arcsec, |r| {
            airy.intensity(r * x_per_arcsec)
        });

        let halo_fwhm = 0.98 * lambda * 1e-6 / r0 / ARCSEC_TO_RAD;
        let alpha = halo_fwhm / (2.0 * (2f64.powf(1.0 / HALO_MOFFAT_BETA) - 1.0).sqrt());
        let halo = sample_radial(n, config.pixel_scale_arcsec, |r| {
            (1.0 + (r / alpha).powi(2)).powf(-HALO_MOFFAT_BETA)
        });

        let centre = [n / 2, n / 2];
        let core_peak = core[centre];
        let halo_peak = halo[centre];

        log::debug!(
            "SCAO PSF at {:.3} um, N={}: r0={:.3} m, theta0={:.2}\", sigma2={:.4} rad^2",
            lambda,
            n,
            r0,
            isoplanatic_angle,
            fitting + residual
        );

        Ok(Self {
            config,
            core,
            halo,
            core_peak,
            halo_peak,
            on_axis_phase_variance: fitting + residual,
            isoplanatic_angle,
        })
    }

    pub fn config(&self) -> &PsfConfig {
        &self.config
    }

    /// Isoplanatic angle in arcsec at this model's wavelength.
    pub fn isoplanatic_angle(&self) -> f64 {
        self.isoplanatic_angle
    }

    /// Fraction of the energy in the diffraction-limited core at an offset.
    pub fn core_fraction(&self, offset: SamplePoint) -> f64 {
        let aniso = (offset.radius() / self.isoplanatic_angle).powf(5.0 / 3.0);
        (-self.on_axis_phase_variance - aniso).exp()
    }
}

/// Samples a radial profile on an `n × n` grid centred on pixel `(n/2, n/2)`
/// and normalises it to unit sum.
fn sample_radial<F>(n: usize, pixel_scale: f64, profile: F) -> Array2<f64>
where
    F: Fn(f64) -> f64 + Sync,
{
    let c = (n / 2) as f64;
    let mut image = Array2::<f64>::zeros((n, n));
    Zip::indexed(&mut image).par_for_each(|(i, j), v| {
        let dy = (i as f64 - c) * pixel_scale;
        let dx = (j as f64 - c) * pixel_scale;
        *v = profile(dx.hypot(dy));
    });

    let total = image.sum();
    if total > 0.0 {
        image.mapv_inplace(|v| v / total);
    }
    image
}

impl PsfModel for AnalyticScaoPsf {
    fn kernel_size(&self) -> usize {
        self.config.kernel_size
    }

    fn wavelength_um(&self) -> f64 {
        self.config.wavelength_um
    }

    fn evaluate(&self, offset: SamplePoint) -> Array2<f64> {
        let s = self.core_fraction(offset);
        Zip::from(&self.core)
            .and(&self.halo)
            .par_map_collect(|&c, &h| s * c + (1.0 - s) * h)
    }

    /// Kernel peak over the diffraction-limited peak sampled on the same grid.
    fn strehl_ratio(&self, offset: SamplePoint) -> f64 {
        let s = self.core_fraction(offset);
        (s * self.core_peak + (1.0 - s) * self.halo_peak) / self.core_peak
    }

    fn header(&self) -> Header {
        let cfg = &self.config;
        let crpix = (cfg.kernel_size / 2 + 1) as i64;

        let mut header = Header::new();
        header.set_with_comment("CDELT1", cfg.pixel_scale_arcsec, "[arcsec] Pixel scale");
        header.set_with_comment("CDELT2", cfg.pixel_scale_arcsec, "[arcsec] Pixel scale");
        header.set("CUNIT1", "arcsec");
        header.set("CUNIT2", "arcsec");
        header.set("CRPIX1", crpix);
        header.set("CRPIX2", crpix);
        header.set("CRVAL1", 0.0);
        header.set("CRVAL2", 0.0);
        header.set_with_comment("PIXSCALE", cfg.pixel_scale_arcsec, "[arcsec/pixel]");
        header.set("PROFILE", cfg.profile.name());
        header.set_with_comment("SEEING", cfg.seeing_arcsec, "[arcsec] at 500 nm");
        header.set_with_comment("RESIDRMS", cfg.residual_rms_nm, "[nm] Residual wavefront");
        header.set_with_comment("ZENDIST", cfg.zenith_distance_deg, "[deg] Zenith distance");
        header.set_with_comment("STREHL0", self.strehl_ratio(SamplePoint::ON_AXIS), "On-axis Strehl");
        header
    }
}
