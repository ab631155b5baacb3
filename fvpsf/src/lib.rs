//! Field-varying point-spread-function products for imaging simulation
//!
//! This crate samples an analytical PSF model across the field of view and
//! packages the results for downstream simulators:
//!
//! - [`field`]: concentric-ring sample positions and rectangular offset grids
//! - [`psf`]: the [`psf::PsfModel`] contract and an analytic SCAO model
//! - [`grid`]: strehl maps, kernel grids and strehl versus kernel size
//! - [`interp`]: nearest-sample maps over the field
//! - [`product`]: the multi-extension field-varying PSF product
//!
//! # Example
//!
//! ```no_run
//! use fvpsf::field::field_positions;
//! use fvpsf::product::{build_scao_product, ProductMetadata};
//! use fvpsf::psf::PsfConfig;
//!
//! let coords = field_positions(&[1.0, 3.0, 5.0, 10.0], 60.0)?;
//! let config = PsfConfig { kernel_size: 512, ..Default::default() };
//! let product = build_scao_product(
//!     &coords,
//!     &[1.0, 1.2, 1.6, 2.15],
//!     &ProductMetadata::default(),
//!     &config,
//! )?;
//! assert_eq!(product.num_hdus(), 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod field;
pub mod grid;
pub mod interp;
#[cfg(feature = "plots")]
pub mod plots;
pub mod product;
pub mod psf;
pub mod shared_args;

pub use field::{field_positions, OffsetGrid, SamplePoint};
pub use product::{build_fvpsf_product, build_scao_product, FvPsfProduct, ProductMetadata};
pub use psf::{AnalyticScaoPsf, PsfConfig, PsfModel};
