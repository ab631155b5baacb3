//! Renders a 5x5 mosaic of SCAO PSF kernels across the field
//!
//! Kernels are sampled every 7" out to ±14" and shown on a log stretch,
//! which makes the anisoplanatic elongation of the halo easy to see.

use clap::Parser;
use fvpsf::field::OffsetGrid;
use fvpsf::grid::kernel_grid;
use fvpsf::psf::{AnalyticScaoPsf, PsfModel};
use fvpsf::shared_args::PsfArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "PSF Grid Plot",
    about = "Plots a grid of SCAO PSF kernels across the field",
    long_about = None
)]
struct Args {
    /// Filter name used in the title and default file name
    #[arg(long, default_value = "Ks")]
    band: String,

    /// Observing wavelength in um
    #[arg(long, default_value_t = 2.15)]
    wave: f64,

    /// Output PNG (default: plots/{band}-band_psf_grid.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    psf: PsfArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Small kernels keep the mosaic quick unless a config file says otherwise
    let mut psf_args = args.psf.clone();
    if psf_args.psf_config.is_none() {
        psf_args.kernel_size.get_or_insert(128);
    }
    let config = psf_args.to_config()?.with_wavelength(args.wave);

    let output = match args.output {
        Some(path) => path,
        None => {
            std::fs::create_dir_all("plots")?;
            PathBuf::from(format!("plots/{}-band_psf_grid.png", args.band))
        }
    };

    let psf = AnalyticScaoPsf::new(config)?;
    let axis = OffsetGrid::kernel_grid_default();
    let kernels = kernel_grid(&psf, &axis, &axis);

    let title = format!("{}-band ({}um) SCAO PSFs", args.band, psf.wavelength_um());
    fvpsf::plots::plot_kernel_grid(&kernels, &axis, &axis, &title, &output)?;

    println!("Plot saved to: {}", output.display());
    Ok(())
}
