//! Nearest-sample maps over the field of view
//!
//! Assigns each pixel of a fixed 51 × 51 arcsec grid the value of the
//! closest sample position. With sample indices as values this shows which
//! sample "owns" each region of the field, a Voronoi-like partition of the
//! sampled PSF layout.

use ndarray::{Array2, Zip};
use thiserror::Error;

use crate::field::SamplePoint;

/// Half-width of the map in arcsec; pixels sit at integer offsets in
/// `[-MAP_HALF_WIDTH, MAP_HALF_WIDTH]`.
pub const MAP_HALF_WIDTH: i32 = 25;

/// Side length of the map in pixels.
pub const MAP_SIZE: usize = (2 * MAP_HALF_WIDTH + 1) as usize;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("At least one sample is required")]
    NoSamples,
    #[error("Got {samples} samples but {values} values")]
    MismatchedLengths { samples: usize, values: usize },
}

/// Offset in arcsec of map pixel `(i, j)`.
pub fn map_pixel_offset(i: usize, j: usize) -> SamplePoint {
    SamplePoint::new(
        i as f64 - MAP_HALF_WIDTH as f64,
        j as f64 - MAP_HALF_WIDTH as f64,
    )
}

/// Index of the sample closest to `point`.
///
/// Distances are compared with a strict `<`, so when two samples are
/// equally close the one listed first wins.
fn nearest_index(samples: &[SamplePoint], point: &SamplePoint) -> usize {
    let mut min_dist = f64::INFINITY;
    let mut closest_idx = 0;

    for (k, sample) in samples.iter().enumerate() {
        let dist = sample.distance_squared(point);
        if dist < min_dist {
            min_dist = dist;
            closest_idx = k;
        }
    }

    closest_idx
}

/// Nearest-neighbour map of `values` over the 51 × 51 grid.
///
/// `map[[i, j]]` holds the value of the sample nearest to offset
/// `(i - 25, j - 25)` arcsec.
pub fn nearest_sample_map<T>(samples: &[SamplePoint], values: &[T]) -> Result<Array2<T>, InterpError>
where
    T: Copy + Send + Sync + Default,
{
    if samples.is_empty() {
        return Err(InterpError::NoSamples);
    }
    if samples.len() != values.len() {
        return Err(InterpError::MismatchedLengths {
            samples: samples.len(),
            values: values.len(),
        });
    }

    let mut map = Array2::<T>::default((MAP_SIZE, MAP_SIZE));
    Zip::indexed(&mut map).par_for_each(|(i, j), v| {
        *v = values[nearest_index(samples, &map_pixel_offset(i, j))];
    });
    Ok(map)
}

/// Map of the index `0..N` of the sample owning each pixel.
pub fn sample_index_map(samples: &[SamplePoint]) -> Result<Array2<usize>, InterpError> {
    let indices: Vec<usize> = (0..samples.len()).collect();
    nearest_sample_map(samples, &indices)
}
