//! FITS persistence for field-varying PSF products

use std::path::Path;

use fitsio::hdu::FitsHdu;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;
use thiserror::Error;

use super::header::{Header, HeaderValue};
use super::{FvPsfProduct, PsfCatalog, PsfCube};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),
}

impl FvPsfProduct {
    /// Writes the product as a multi-extension FITS file.
    ///
    /// Without `overwrite`, an existing file at `path` is an error. If any
    /// HDU fails to write, the partially written file is removed.
    pub fn write_fits(&self, path: &Path, overwrite: bool) -> Result<(), WriteError> {
        let mut fptr = if overwrite {
            FitsFile::create(path).overwrite().open()?
        } else {
            FitsFile::create(path).open()?
        };

        if let Err(e) = self.write_hdus(&mut fptr) {
            drop(fptr);
            if let Err(rm) = std::fs::remove_file(path) {
                log::warn!("Failed to remove partial file {}: {}", path.display(), rm);
            }
            return Err(e);
        }

        log::info!("Wrote {} HDUs to {}", self.num_hdus(), path.display());
        Ok(())
    }

    fn write_hdus(&self, fptr: &mut FitsFile) -> Result<(), WriteError> {
        let primary = fptr.primary_hdu()?;
        write_header(fptr, &primary, &self.primary)?;

        write_catalog(fptr, &self.catalog)?;
        for cube in &self.cubes {
            write_cube(fptr, cube)?;
        }
        Ok(())
    }
}

fn write_header(fptr: &mut FitsFile, hdu: &FitsHdu, header: &Header) -> Result<(), WriteError> {
    for card in header.iter() {
        // Set when the extension is created
        if card.keyword == "EXTNAME" {
            continue;
        }
        let key = card.keyword.as_str();
        match card.comment.as_deref() {
            Some(comment) => match &card.value {
                HeaderValue::Bool(v) => hdu.write_key(fptr, key, (*v as i64, comment))?,
                HeaderValue::Int(v) => hdu.write_key(fptr, key, (*v, comment))?,
                HeaderValue::Float(v) => hdu.write_key(fptr, key, (*v, comment))?,
                HeaderValue::Str(v) => hdu.write_key(fptr, key, (v.as_str(), comment))?,
            },
            None => match &card.value {
                HeaderValue::Bool(v) => hdu.write_key(fptr, key, *v as i64)?,
                HeaderValue::Int(v) => hdu.write_key(fptr, key, *v)?,
                HeaderValue::Float(v) => hdu.write_key(fptr, key, *v)?,
                HeaderValue::Str(v) => hdu.write_key(fptr, key, v.as_str())?,
            },
        }
    }
    Ok(())
}

fn write_catalog(fptr: &mut FitsFile, catalog: &PsfCatalog) -> Result<(), WriteError> {
    let columns = [
        ColumnDescription::new("x")
            .with_type(ColumnDataType::Double)
            .create()?,
        ColumnDescription::new("y")
            .with_type(ColumnDataType::Double)
            .create()?,
        ColumnDescription::new("layer")
            .with_type(ColumnDataType::Int)
            .create()?,
    ];

    let hdu = fptr.create_table(PsfCatalog::EXTNAME, &columns)?;
    hdu.write_col(fptr, "x", &catalog.x)?;
    hdu.write_col(fptr, "y", &catalog.y)?;
    hdu.write_col(fptr, "layer", &catalog.layer)?;
    write_header(fptr, &hdu, &catalog.header)
}

fn write_cube(fptr: &mut FitsFile, cube: &PsfCube) -> Result<(), WriteError> {
    let (layers, ny, nx) = cube.data.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[layers, ny, nx],
    };

    let extname = cube
        .header
        .get_str("EXTNAME")
        .map(str::to_string)
        .unwrap_or_else(|| format!("PSF_{}UM", cube.wavelength_um));
    log::debug!("Writing cube {} ({} x {} x {})", extname, layers, ny, nx);

    let hdu = fptr.create_image(extname, &description)?;
    // Iteration order is logical (row-major) regardless of memory layout
    let pixels: Vec<f64> = cube.data.iter().copied().collect();
    hdu.write_image(fptr, &pixels)?;
    write_header(fptr, &hdu, &cube.header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_positions;
    use crate::product::{build_scao_product, ProductMetadata};
    use crate::psf::PsfConfig;
    use fitsio::hdu::HduInfo;
    use fitsio::headers::HeaderValue as FitsCard;

    fn small_product() -> FvPsfProduct {
        let config = PsfConfig {
            kernel_size: 16,
            ..Default::default()
        };
        let samples = field_positions(&[3.0], 180.0).unwrap();
        let meta = ProductMetadata {
            author: "fvpsf tests".to_string(),
            ..Default::default()
        }
        .with_extra("FILTER", "Ks");
        build_scao_product(&samples, &[1.2, 2.15], &meta, &config).unwrap()
    }

    #[test]
    fn test_round_trip_layout() {
        let product = small_product();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fvpsf.fits");
        product.write_fits(&path, false).unwrap();

        let mut f = FitsFile::open(&path).unwrap();

        let primary = f.primary_hdu().unwrap();
        let ecat: i64 = primary.read_key(&mut f, "ECAT").unwrap();
        let edata: i64 = primary.read_key(&mut f, "EDATA").unwrap();
        let wave3: f64 = primary.read_key(&mut f, "WAVEEXT3").unwrap();
        let author: String = primary.read_key(&mut f, "AUTHOR").unwrap();
        assert_eq!((ecat, edata), (1, 2));
        let ecat_card: FitsCard<i64> = primary.read_key(&mut f, "ECAT").unwrap();
        assert_eq!(
            ecat_card.comment.as_deref(),
            Some("The extension containing the catalogue data")
        );
        let author_card: FitsCard<String> = primary.read_key(&mut f, "AUTHOR").unwrap();
        assert_eq!(author_card.comment, None);
        assert_eq!(wave3, 2.15);
        assert_eq!(author, "fvpsf tests");

        let cat = f.hdu(1).unwrap();
        let layers: Vec<i32> = cat.read_col(&mut f, "layer").unwrap();
        let xs: Vec<f64> = cat.read_col(&mut f, "x").unwrap();
        let numpsfs: i64 = cat.read_key(&mut f, "NUMPSFS").unwrap();
        assert_eq!(layers, vec![0, 1, 2]);
        assert_eq!(xs, product.catalog().x);
        assert_eq!(numpsfs, 3);

        let cube_hdu = f.hdu(3).unwrap();
        match &cube_hdu.info {
            HduInfo::ImageInfo { shape, .. } => assert_eq!(shape, &vec![3, 16, 16]),
            other => panic!("expected image, got {other:?}"),
        }
        let strehl: FitsCard<f64> = cube_hdu.read_key(&mut f, "STREHL0").unwrap();
        assert_eq!(strehl.comment.as_deref(), Some("On-axis Strehl"));
        let wave0: f64 = cube_hdu.read_key(&mut f, "WAVE0").unwrap();
        let unit: String = cube_hdu.read_key(&mut f, "WAVEUNIT").unwrap();
        assert_eq!(wave0, 2.15);
        assert_eq!(unit, "um");

        let pixels: Vec<f64> = cube_hdu.read_image(&mut f).unwrap();
        let expected: Vec<f64> = product.cubes()[1].data.iter().copied().collect();
        assert_eq!(pixels, expected);
    }

    #[test]
    fn test_overwrite_flag() {
        let product = small_product();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fvpsf.fits");
        product.write_fits(&path, false).unwrap();
        assert!(product.write_fits(&path, false).is_err());
        product.write_fits(&path, true).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let config = PsfConfig {
            kernel_size: 8,
            ..Default::default()
        };
        // Header strings cannot carry NUL bytes
        let meta = ProductMetadata::default().with_extra("NOTE", "bad\0value");
        let product =
            build_scao_product(&[crate::field::SamplePoint::ON_AXIS], &[2.15], &meta, &config)
                .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.fits");
        assert!(product.write_fits(&path, false).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_refused_overwrite_keeps_existing_file() {
        let product = small_product();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fvpsf.fits");
        product.write_fits(&path, false).unwrap();
        assert!(product.write_fits(&path, false).is_err());
        assert!(path.exists());
    }
}
