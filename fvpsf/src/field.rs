//! Field-of-view sampling geometry
//!
//! Offsets are angular positions in arcsec relative to the optical axis.
//! Two layouts are provided:
//!
//! - **Concentric rings**: the on-axis point followed by points spaced at a
//!   fixed angular step around circles of increasing radius. This is the
//!   layout written into field-varying PSF products.
//! - **Rectangular grids**: arange-style axes combined row-major, used for
//!   strehl maps and kernel grids.

use thiserror::Error;

/// Default ring radii in arcsec.
pub const DEFAULT_RADII: [f64; 6] = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

/// Default angular spacing between samples on a ring, in degrees.
pub const DEFAULT_THETA_DEG: f64 = 45.0;

/// Half-width and step in arcsec of the default strehl map axes.
pub const STREHL_MAP_RADIUS: f64 = 25.0;
pub const STREHL_MAP_STEP: f64 = 3.0;

/// Half-width and step in arcsec of the default kernel grid axes.
pub const KERNEL_GRID_RADIUS: f64 = 14.0;
pub const KERNEL_GRID_STEP: f64 = 7.0;

/// Errors raised while building sample layouts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Angular step must be finite and positive, got {0} deg")]
    InvalidAngleStep(f64),
    #[error("Grid step must be finite and positive, got {0}")]
    InvalidGridStep(f64),
    #[error("Grid bounds must be finite, got [{start}, {stop})")]
    InvalidGridBounds { start: f64, stop: f64 },
    #[error("Grid [{start}, {stop}) with step {step} has too many values")]
    GridTooLarge { start: f64, stop: f64, step: f64 },
}

/// Largest number of offsets a layout may hold.
const MAX_OFFSETS: usize = isize::MAX as usize / std::mem::size_of::<SamplePoint>();

/// A field offset in arcsec from the centre of the field of view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

impl SamplePoint {
    pub const ON_AXIS: SamplePoint = SamplePoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Angular distance from the optical axis in arcsec.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared distance to another offset.
    pub fn distance_squared(&self, other: &SamplePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for SamplePoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Generates the positions at which a field-varying PSF is sampled.
///
/// The first point is always the field centre. Each radius then contributes
/// `ceil(360 / theta_deg)` points at angles `0, θ, 2θ, ...` below 360°,
/// walking radii in the order given. Radii are used as-is: zero or negative
/// values produce degenerate or mirrored rings rather than an error.
///
/// # Arguments
/// * `radii` - Ring radii in arcsec
/// * `theta_deg` - Angular spacing between samples on a ring in degrees
///
/// # Example
/// ```
/// use fvpsf::field::field_positions;
///
/// let coords = field_positions(&[5.0], 90.0).unwrap();
/// assert_eq!(coords.len(), 5);
/// ```
pub fn field_positions(radii: &[f64], theta_deg: f64) -> Result<Vec<SamplePoint>, FieldError> {
    if !theta_deg.is_finite() || theta_deg <= 0.0 {
        return Err(FieldError::InvalidAngleStep(theta_deg));
    }
    // Tiny steps give more ring points than a Vec can hold
    radii
        .len()
        .checked_mul(steps_per_ring(theta_deg))
        .and_then(|n| n.checked_add(1))
        .filter(|&n| n <= MAX_OFFSETS)
        .ok_or(FieldError::InvalidAngleStep(theta_deg))?;

    Ok(ring_positions(radii, theta_deg))
}

/// Ring layout with [`DEFAULT_RADII`] and [`DEFAULT_THETA_DEG`].
pub fn default_field_positions() -> Vec<SamplePoint> {
    ring_positions(&DEFAULT_RADII, DEFAULT_THETA_DEG)
}

fn steps_per_ring(theta_deg: f64) -> usize {
    (360.0 / theta_deg).ceil() as usize
}

fn ring_positions(radii: &[f64], theta_deg: f64) -> Vec<SamplePoint> {
    let steps_per_ring = steps_per_ring(theta_deg);
    let mut coords = Vec::with_capacity(1 + radii.len() * steps_per_ring);
    coords.push(SamplePoint::ON_AXIS);

    for &r in radii {
        for k in 0..steps_per_ring {
            let angle = (k as f64 * theta_deg).to_radians();
            coords.push(SamplePoint::new(r * angle.cos(), r * angle.sin()));
        }
    }

    coords
}

/// One axis of a rectangular offset grid: `start, start + step, ...` strictly
/// below `stop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetGrid {
    start: f64,
    stop: f64,
    step: f64,
}

impl OffsetGrid {
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self, FieldError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(FieldError::InvalidGridStep(step));
        }
        if !start.is_finite() || !stop.is_finite() {
            return Err(FieldError::InvalidGridBounds { start, stop });
        }
        let grid = Self { start, stop, step };
        if grid.len() > MAX_OFFSETS {
            return Err(FieldError::GridTooLarge { start, stop, step });
        }
        Ok(grid)
    }

    /// Axis covering `[-r, r + dr)`, the strehl map convention.
    ///
    /// With `r = 25, dr = 3` this yields 18 values from -25 to 26.
    pub fn symmetric(r: f64, dr: f64) -> Result<Self, FieldError> {
        Self::new(-r, r + dr, dr)
    }

    /// Axis covering `[-r, r + 1)`, the kernel grid convention.
    ///
    /// With `r = 14, dr = 7` this yields -14, -7, 0, 7, 14.
    pub fn inclusive(r: f64, dr: f64) -> Result<Self, FieldError> {
        Self::new(-r, r + 1.0, dr)
    }

    /// `[-25, 28)` in steps of 3 arcsec.
    pub fn strehl_map_default() -> Self {
        Self {
            start: -STREHL_MAP_RADIUS,
            stop: STREHL_MAP_RADIUS + STREHL_MAP_STEP,
            step: STREHL_MAP_STEP,
        }
    }

    /// `[-14, 15)` in steps of 7 arcsec.
    pub fn kernel_grid_default() -> Self {
        Self {
            start: -KERNEL_GRID_RADIUS,
            stop: KERNEL_GRID_RADIUS + 1.0,
            step: KERNEL_GRID_STEP,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        if self.stop <= self.start {
            return 0;
        }
        ((self.stop - self.start) / self.step).ceil() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.len())
            .map(|k| self.start + k as f64 * self.step)
            .collect()
    }
}

/// Combines two axes into offsets in row-major order: the outer loop runs
/// over `x_axis`, the inner loop over `y_axis`.
pub fn grid_points(x_axis: &OffsetGrid, y_axis: &OffsetGrid) -> Vec<SamplePoint> {
    let ys = y_axis.values();
    x_axis
        .values()
        .into_iter()
        .flat_map(|x| ys.iter().map(move |&y| SamplePoint::new(x, y)))
        .collect()
}
