//! Strehl ratio survey of the analytic SCAO PSF
//!
//! Prints the Strehl ratio over a square grid of field offsets, the on-axis
//! Strehl for a set of kernel sizes, and optionally the nearest-sample
//! Strehl map a ring-sampled product would imply.

use clap::Parser;
use fvpsf::field::{field_positions, OffsetGrid, DEFAULT_THETA_DEG};
use fvpsf::grid::{on_axis_strehl_for_kernel_sizes, strehl_map, DEFAULT_KERNEL_SIZES};
use fvpsf::interp::{nearest_sample_map, MAP_HALF_WIDTH};
use fvpsf::psf::{AnalyticScaoPsf, PsfModel};
use fvpsf::shared_args::PsfArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Strehl Map",
    about = "Computes Strehl ratios of the analytic SCAO PSF across the field",
    long_about = None
)]
struct Args {
    /// Half width of the grid in arcsec
    #[arg(long, default_value_t = 25.0)]
    radius: f64,

    /// Grid step in arcsec
    #[arg(long, default_value_t = 3.0)]
    step: f64,

    /// Observing wavelength in um
    #[arg(long, default_value_t = 2.15)]
    wave: f64,

    /// Kernel sizes for the on-axis Strehl comparison, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_KERNEL_SIZES)]
    kernel_sizes: Vec<usize>,

    /// Also report the nearest-sample map for rings at these radii [arcsec]
    #[arg(long, value_delimiter = ',')]
    sample_radii: Vec<f64>,

    /// Save the map as a PNG (needs the `plots` feature)
    #[arg(long)]
    plot: Option<PathBuf>,

    #[command(flatten)]
    psf: PsfArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = args.psf.to_config()?.with_wavelength(args.wave);
    let axis = OffsetGrid::symmetric(args.radius, args.step)?;
    let psf = AnalyticScaoPsf::new(config)?;
    let config = psf.config();

    println!("Strehl Map");
    println!("==========");
    println!(
        "{} um, profile {}, seeing {}\", isoplanatic angle {:.2}\"",
        psf.wavelength_um(),
        config.profile,
        config.seeing_arcsec,
        psf.isoplanatic_angle()
    );
    println!();

    let map = strehl_map(&psf, &axis, &axis);
    let values = axis.values();

    print!("{:>8}", "y \\ x");
    for x in &values {
        print!("{:>7.0}", x);
    }
    println!();
    for (j, y) in values.iter().enumerate().rev() {
        print!("{:>8.0}", y);
        for i in 0..values.len() {
            print!("{:>7.3}", map[[i, j]]);
        }
        println!();
    }
    println!();

    println!("On-axis Strehl by kernel size:");
    let strehls = on_axis_strehl_for_kernel_sizes(&args.kernel_sizes, config)?;
    for (n, s) in args.kernel_sizes.iter().zip(&strehls) {
        println!("  {:>5} px: {:.4}", n, s);
    }

    if !args.sample_radii.is_empty() {
        let samples = field_positions(&args.sample_radii, DEFAULT_THETA_DEG)?;
        let sample_strehls: Vec<f64> = samples.iter().map(|&p| psf.strehl_ratio(p)).collect();
        let sampled = nearest_sample_map(&samples, &sample_strehls)?;

        let (lo, hi) = sampled
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        println!();
        println!(
            "Nearest-sample map over ±{}\" from {} samples: Strehl {:.3} to {:.3}",
            MAP_HALF_WIDTH,
            samples.len(),
            lo,
            hi
        );
    }

    if let Some(path) = args.plot {
        save_plot(&map, &axis, &path)?;
    }

    Ok(())
}

#[cfg(feature = "plots")]
fn save_plot(
    map: &ndarray::Array2<f64>,
    axis: &OffsetGrid,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fvpsf::plots::plot_strehl_map(map, axis, axis, path)?;
    println!("Plot saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "plots"))]
fn save_plot(
    _map: &ndarray::Array2<f64>,
    _axis: &OffsetGrid,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    log::warn!(
        "Built without the plots feature, not writing {}",
        path.display()
    );
    Ok(())
}
