//! Point-spread-function models
//!
//! Grid builders and the product assembler only see the [`PsfModel`]
//! trait. A model is constructed once per wavelength and kernel size and is
//! then evaluated at any number of field offsets; evaluation takes `&self`
//! so independent offsets can be computed in parallel.
//!
//! [`AnalyticScaoPsf`] is the bundled implementation: an analytic
//! single-conjugate adaptive optics PSF built from a diffraction-limited
//! core and a seeing halo, with field dependence from anisoplanatism.

pub mod airy;
pub mod config;
pub mod profile;
pub mod scao;

pub use config::PsfConfig;
pub use profile::AtmosphereProfile;
pub use scao::AnalyticScaoPsf;

use ndarray::Array2;
use thiserror::Error;

use crate::field::SamplePoint;
use crate::product::header::Header;

/// Errors raised while configuring or constructing a PSF model.
#[derive(Error, Debug)]
pub enum PsfError {
    #[error("Invalid PSF parameter {name}: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("Failed to read PSF config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse PSF config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// An analytical PSF that can be sampled anywhere in the field.
pub trait PsfModel: Sync {
    /// Side length in pixels of the square kernels this model produces.
    fn kernel_size(&self) -> usize;

    /// Wavelength in um the model was built for.
    fn wavelength_um(&self) -> f64;

    /// Returns a freshly allocated kernel for the given field offset.
    fn evaluate(&self, offset: SamplePoint) -> Array2<f64>;

    /// Strehl ratio of the kernel at the given field offset.
    fn strehl_ratio(&self, offset: SamplePoint) -> f64;

    /// Header cards describing the sampling of this model's kernels.
    fn header(&self) -> Header;
}
