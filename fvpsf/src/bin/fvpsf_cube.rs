//! Field-varying PSF file builder
//!
//! Samples the analytic SCAO PSF on concentric rings around the optical axis
//! at each requested wavelength and writes the multi-extension FITS product
//! used by downstream image simulators.

use clap::Parser;
use fvpsf::field::{field_positions, DEFAULT_RADII, DEFAULT_THETA_DEG};
use fvpsf::product::{build_scao_product, HeaderValue, ProductMetadata};
use fvpsf::shared_args::PsfArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "FVPSF Cube Builder",
    about = "Builds a field-varying PSF file from the analytic SCAO model",
    long_about = None
)]
struct Args {
    /// Ring radii in arcsec, comma separated
    #[arg(long, value_delimiter = ',')]
    radii: Option<Vec<f64>>,

    /// Angular spacing between samples on a ring in degrees
    #[arg(long, default_value_t = DEFAULT_THETA_DEG)]
    theta: f64,

    /// Wavelengths in um, one PSF cube each, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [1.0, 1.2, 1.6, 2.15])]
    waves: Vec<f64>,

    /// Output FITS file
    #[arg(short, long, default_value = "fvpsf.fits")]
    output: PathBuf,

    /// Replace the output file if it exists
    #[arg(long)]
    overwrite: bool,

    /// JSON file with primary header metadata
    #[arg(long)]
    metadata: Option<PathBuf>,

    #[arg(long)]
    author: Option<String>,

    #[arg(long)]
    source: Option<String>,

    #[arg(long)]
    status: Option<String>,

    /// Creation date recorded in DATE_CRE
    #[arg(long)]
    date_created: Option<String>,

    /// Extra primary header cards as KEYWORD=VALUE (repeatable)
    #[arg(long = "card", value_parser = parse_card)]
    cards: Vec<(String, HeaderValue)>,

    #[command(flatten)]
    psf: PsfArgs,
}

/// Parse `KEYWORD=VALUE`, keeping integers and floats typed.
fn parse_card(s: &str) -> Result<(String, HeaderValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected KEYWORD=VALUE, got {s}"))?;
    let value = if let Ok(i) = value.parse::<i64>() {
        HeaderValue::Int(i)
    } else if let Ok(f) = value.parse::<f64>() {
        HeaderValue::Float(f)
    } else {
        HeaderValue::Str(value.to_string())
    };
    Ok((key.trim().to_uppercase(), value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = args.psf.to_config()?;
    let radii = args.radii.unwrap_or_else(|| DEFAULT_RADII.to_vec());
    let samples = field_positions(&radii, args.theta)?;

    // Flags override the metadata file
    let mut metadata = match &args.metadata {
        Some(path) => ProductMetadata::from_json_file(path)?,
        None => ProductMetadata::default(),
    };
    if let Some(author) = args.author {
        metadata.author = author;
    }
    if let Some(date) = args.date_created {
        metadata.date_created = date;
    }
    if let Some(source) = args.source {
        metadata.source = source;
    }
    if let Some(status) = args.status {
        metadata.status = status;
    }
    metadata.extra.extend(args.cards);

    println!("FVPSF Cube Builder");
    println!("==================");
    println!("Samples: {} ({} rings every {}°)", samples.len(), radii.len(), args.theta);
    println!("Wavelengths [um]: {:?}", args.waves);
    println!(
        "Kernel: {} px at {}\"/px, profile {}",
        config.kernel_size, config.pixel_scale_arcsec, config.profile
    );
    println!();

    let product = build_scao_product(&samples, &args.waves, &metadata, &config)?;
    product.write_fits(&args.output, args.overwrite)?;

    println!(
        "Wrote {} extensions to {}",
        product.num_hdus(),
        args.output.display()
    );
    Ok(())
}
