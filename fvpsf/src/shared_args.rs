use crate::psf::{AtmosphereProfile, PsfConfig, PsfError};
use clap::Parser;
use std::path::PathBuf;

/// PSF model arguments shared across binaries
///
/// Flags that are given override the values loaded from `--config`.
#[derive(Parser, Debug, Clone, Default)]
pub struct PsfArgs {
    /// JSON file with PSF construction parameters
    #[arg(long = "config")]
    pub psf_config: Option<PathBuf>,

    /// Kernel side length in pixels
    #[arg(long)]
    pub kernel_size: Option<usize>,

    /// Kernel pixel scale in arcsec
    #[arg(long)]
    pub pixel_scale: Option<f64>,

    /// Atmospheric turbulence profile
    #[arg(long, value_enum)]
    pub profile: Option<AtmosphereProfile>,

    /// Seeing FWHM at 500 nm in arcsec
    #[arg(long)]
    pub seeing: Option<f64>,

    /// Zenith distance in degrees
    #[arg(long)]
    pub zenith_distance: Option<f64>,

    /// Residual wavefront error in nm RMS
    #[arg(long)]
    pub residual_rms: Option<f64>,
}

impl PsfArgs {
    /// Builds the PSF config: defaults, then the config file, then flags.
    pub fn to_config(&self) -> Result<PsfConfig, PsfError> {
        let mut config = match &self.psf_config {
            Some(path) => {
                log::info!("Loading PSF config from {}", path.display());
                PsfConfig::from_json_file(path)?
            }
            None => PsfConfig::default(),
        };

        if let Some(n) = self.kernel_size {
            config.kernel_size = n;
        }
        if let Some(scale) = self.pixel_scale {
            config.pixel_scale_arcsec = scale;
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(seeing) = self.seeing {
            config.seeing_arcsec = seeing;
        }
        if let Some(z) = self.zenith_distance {
            config.zenith_distance_deg = z;
        }
        if let Some(rms) = self.residual_rms {
            config.residual_rms_nm = rms;
        }

        config.validate()?;
        Ok(config)
    }
}
