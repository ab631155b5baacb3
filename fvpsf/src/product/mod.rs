//! Field-varying PSF products
//!
//! A product is a multi-extension file with a fixed layout:
//!
//! | HDU      | Content                                                   |
//! |----------|-----------------------------------------------------------|
//! | 0        | Header only: metadata, `ECAT`, `EDATA`, `WAVEEXT{n}`      |
//! | 1        | Catalog table `x`, `y`, `layer`, one row per sample       |
//! | 2..2+W-1 | One kernel cube per wavelength, one layer per sample      |
//!
//! Row `i` of the catalog describes layer `i` of every cube. The product is
//! assembled entirely in memory; see [`FvPsfProduct::write_fits`] for
//! persistence.

pub mod catalog;
pub mod header;
pub mod metadata;
#[cfg(feature = "fits")]
pub mod writer;

pub use catalog::PsfCatalog;
pub use header::{Header, HeaderValue};
pub use metadata::ProductMetadata;

use ndarray::{Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;
use thiserror::Error;

use crate::field::SamplePoint;
use crate::psf::{AnalyticScaoPsf, PsfConfig, PsfError, PsfModel};

/// HDU index of the catalog table.
pub const CATALOG_EXTENSION: usize = 1;

/// HDU index of the first kernel cube.
pub const FIRST_DATA_EXTENSION: usize = 2;

/// Value of the `ETYPE` primary header keyword.
pub const PRODUCT_TYPE: &str = "FVPSF";

/// Unit of the wavelengths recorded in the product.
pub const WAVELENGTH_UNIT: &str = "um";

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("Metadata keyword {0:?} is not a valid FITS keyword")]
    InvalidKeyword(String),
    #[error("Metadata keyword {0} is reserved by the product layout")]
    ReservedKeyword(String),
    #[error("Metadata keyword {0} given more than once")]
    DuplicateKeyword(String),
    #[error("At least one sample position is required")]
    NoSamples,
    #[error("At least one wavelength is required")]
    NoWavelengths,
    #[error("Kernel {index} at {wavelength_um} um has shape {found:?}, expected {expected:?}")]
    KernelShape {
        wavelength_um: f64,
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Model built for {requested} um reports {model} um")]
    WavelengthMismatch { requested: f64, model: f64 },
    #[error("Failed to read metadata {path}: {source}")]
    MetadataIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse metadata: {0}")]
    MetadataParse(#[from] serde_json::Error),
    #[error("Failed to stack kernels: {0}")]
    Stack(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Psf(#[from] PsfError),
}

/// Kernels of every sample at one wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct PsfCube {
    pub header: Header,
    pub wavelength_um: f64,
    /// Shape `(layers, ny, nx)`; layer `j` is the kernel of sample `j`
    pub data: Array3<f64>,
}

impl PsfCube {
    pub fn num_layers(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn layer(&self, j: usize) -> Option<ArrayView2<'_, f64>> {
        (j < self.num_layers()).then(|| self.data.index_axis(Axis(0), j))
    }
}

/// Borrowed view of one HDU.
#[derive(Debug, Clone, Copy)]
pub enum Hdu<'a> {
    Primary(&'a Header),
    Catalog(&'a PsfCatalog),
    Cube(&'a PsfCube),
}

impl<'a> Hdu<'a> {
    pub fn header(&self) -> &'a Header {
        match self {
            Hdu::Primary(h) => h,
            Hdu::Catalog(c) => &c.header,
            Hdu::Cube(c) => &c.header,
        }
    }
}

/// An assembled field-varying PSF product.
#[derive(Debug, Clone, PartialEq)]
pub struct FvPsfProduct {
    primary: Header,
    catalog: PsfCatalog,
    cubes: Vec<PsfCube>,
}

impl FvPsfProduct {
    /// Number of HDUs, `2 + number of wavelengths`.
    pub fn num_hdus(&self) -> usize {
        FIRST_DATA_EXTENSION + self.cubes.len()
    }

    pub fn hdu(&self, index: usize) -> Option<Hdu<'_>> {
        match index {
            0 => Some(Hdu::Primary(&self.primary)),
            CATALOG_EXTENSION => Some(Hdu::Catalog(&self.catalog)),
            _ => self.cubes.get(index - FIRST_DATA_EXTENSION).map(Hdu::Cube),
        }
    }

    pub fn hdus(&self) -> impl Iterator<Item = Hdu<'_>> {
        (0..self.num_hdus()).filter_map(move |i| self.hdu(i))
    }

    pub fn primary(&self) -> &Header {
        &self.primary
    }

    pub fn catalog(&self) -> &PsfCatalog {
        &self.catalog
    }

    /// Cubes in wavelength input order.
    pub fn cubes(&self) -> &[PsfCube] {
        &self.cubes
    }

    /// HDU index of the cube for `wavelength_um`, if present.
    pub fn extension_for_wavelength(&self, wavelength_um: f64) -> Option<usize> {
        self.cubes
            .iter()
            .position(|c| c.wavelength_um == wavelength_um)
            .map(|i| FIRST_DATA_EXTENSION + i)
    }
}

/// Assembles a product, building one model per wavelength with `make_model`.
///
/// Every model is evaluated at every sample in order; the kernels are
/// stacked into that wavelength's cube. Every kernel must be
/// `kernel_size × kernel_size` and each model must report the wavelength it
/// was built for. Any model construction failure aborts the build.
pub fn build_fvpsf_product<M, F>(
    samples: &[SamplePoint],
    wavelengths: &[f64],
    metadata: &ProductMetadata,
    make_model: F,
) -> Result<FvPsfProduct, ProductError>
where
    M: PsfModel,
    F: Fn(f64) -> Result<M, PsfError>,
{
    metadata.validate()?;
    if samples.is_empty() {
        return Err(ProductError::NoSamples);
    }
    if wavelengths.is_empty() {
        return Err(ProductError::NoWavelengths);
    }

    let mut primary = Header::new();
    metadata.write_recognised(&mut primary);
    primary.set("ETYPE", PRODUCT_TYPE);
    primary.set_with_comment(
        "ECAT",
        CATALOG_EXTENSION,
        "The extension containing the catalogue data",
    );
    primary.set_with_comment(
        "EDATA",
        FIRST_DATA_EXTENSION,
        "The first extension with real data",
    );
    for (i, &wave) in wavelengths.iter().enumerate() {
        primary.set(&wave_extension_keyword(FIRST_DATA_EXTENSION + i), wave);
    }
    metadata.write_extra(&mut primary);

    let catalog = PsfCatalog::from_samples(samples);

    let mut cubes = Vec::with_capacity(wavelengths.len());
    for (i, &wave) in wavelengths.iter().enumerate() {
        log::info!("Making PSF cube for {} um", wave);
        let model = make_model(wave)?;
        if model.wavelength_um() != wave {
            return Err(ProductError::WavelengthMismatch {
                requested: wave,
                model: model.wavelength_um(),
            });
        }
        let kernels: Vec<Array2<f64>> = samples.par_iter().map(|&p| model.evaluate(p)).collect();
        let data = stack_kernels(&kernels, model.kernel_size(), wave)?;

        let mut header = model.header();
        header.set("EXTNAME", format!("PSF_EXT{}", FIRST_DATA_EXTENSION + i));
        header.set("WAVE0", wave);
        header.set("WAVEUNIT", WAVELENGTH_UNIT);

        cubes.push(PsfCube {
            header,
            wavelength_um: wave,
            data,
        });
    }

    Ok(FvPsfProduct {
        primary,
        catalog,
        cubes,
    })
}

/// [`build_fvpsf_product`] with an [`AnalyticScaoPsf`] per wavelength.
pub fn build_scao_product(
    samples: &[SamplePoint],
    wavelengths: &[f64],
    metadata: &ProductMetadata,
    config: &PsfConfig,
) -> Result<FvPsfProduct, ProductError> {
    build_fvpsf_product(samples, wavelengths, metadata, |wave| {
        AnalyticScaoPsf::new(config.with_wavelength(wave))
    })
}

/// Primary header keyword recording the wavelength of extension `ext`.
pub fn wave_extension_keyword(ext: usize) -> String {
    format!("{}{}", metadata::WAVE_EXTENSION_PREFIX, ext)
}

fn stack_kernels(
    kernels: &[Array2<f64>],
    kernel_size: usize,
    wavelength_um: f64,
) -> Result<Array3<f64>, ProductError> {
    let expected = (kernel_size, kernel_size);
    if let Some((index, k)) = kernels.iter().enumerate().find(|(_, k)| k.dim() != expected) {
        return Err(ProductError::KernelShape {
            wavelength_um,
            index,
            expected,
            found: k.dim(),
        });
    }

    let views: Vec<ArrayView2<f64>> = kernels.iter().map(|k| k.view()).collect();
    Ok(ndarray::stack(Axis(0), &views)?)
}
