//! Catalog extension: sample positions and their cube layer

use super::header::Header;
use crate::field::SamplePoint;

/// Table with one row per sample, in sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct PsfCatalog {
    pub header: Header,
    /// [arcsec]
    pub x: Vec<f64>,
    /// [arcsec]
    pub y: Vec<f64>,
    /// Layer of this sample in every PSF cube
    pub layer: Vec<i32>,
}

impl PsfCatalog {
    pub const EXTNAME: &'static str = "CATALOG";

    pub fn from_samples(samples: &[SamplePoint]) -> Self {
        let mut header = Header::new();
        header.set("EXTNAME", Self::EXTNAME);
        header.set("NUMPSFS", samples.len());
        header.set("CATTYPE", "table");
        header.set("CUNIT1", "arcsec");

        Self {
            header,
            x: samples.iter().map(|p| p.x).collect(),
            y: samples.iter().map(|p| p.y).collect(),
            layer: (0..samples.len() as i32).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    /// Position of row `i`.
    pub fn position(&self, i: usize) -> Option<SamplePoint> {
        Some(SamplePoint::new(*self.x.get(i)?, *self.y.get(i)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_sample_order() {
        let samples = vec![
            SamplePoint::new(0.0, 0.0),
            SamplePoint::new(1.5, -2.0),
            SamplePoint::new(-3.0, 4.0),
        ];
        let cat = PsfCatalog::from_samples(&samples);
        assert_eq!(cat.len(), 3);
        assert_eq!(cat.layer, vec![0, 1, 2]);
        assert_eq!(cat.position(1), Some(samples[1]));
        assert_eq!(cat.position(3), None);
    }

    #[test]
    fn test_header_cards() {
        let cat = PsfCatalog::from_samples(&[SamplePoint::ON_AXIS; 4]);
        assert_eq!(cat.header.get_int("NUMPSFS"), Some(4));
        assert_eq!(cat.header.get_str("CATTYPE"), Some("table"));
        assert_eq!(cat.header.get_str("CUNIT1"), Some("arcsec"));
    }
}
