//! Strehl maps and kernel grids over rectangular offset grids
//!
//! Every cell is an independent model evaluation, so cells are computed in
//! parallel; results are always returned in row-major order with the first
//! axis (x) outermost.

use ndarray::{Array2, Zip};
use rayon::prelude::*;

use crate::field::{grid_points, OffsetGrid, SamplePoint};
use crate::psf::{AnalyticScaoPsf, PsfConfig, PsfError, PsfModel};

/// Kernel sizes compared by [`on_axis_strehl_for_kernel_sizes`] by default.
pub const DEFAULT_KERNEL_SIZES: [usize; 3] = [128, 512, 2048];

/// Strehl ratio at every cell of the grid.
///
/// The result has shape `(x_axis.len(), y_axis.len())` with
/// `map[[i, j]]` the Strehl ratio at `(x_i, y_j)`.
pub fn strehl_map<M: PsfModel>(model: &M, x_axis: &OffsetGrid, y_axis: &OffsetGrid) -> Array2<f64> {
    let xs = x_axis.values();
    let ys = y_axis.values();

    let mut map = Array2::<f64>::zeros((xs.len(), ys.len()));
    Zip::indexed(&mut map).par_for_each(|(i, j), v| {
        *v = model.strehl_ratio(SamplePoint::new(xs[i], ys[j]));
    });
    map
}

/// Strehl map over the default ±25" axes with a 3" step (18 × 18 cells).
pub fn default_strehl_map<M: PsfModel>(model: &M) -> Array2<f64> {
    let axis = OffsetGrid::strehl_map_default();
    strehl_map(model, &axis, &axis)
}

/// Kernel at every cell of the grid, flattened row-major.
pub fn kernel_grid<M: PsfModel>(
    model: &M,
    x_axis: &OffsetGrid,
    y_axis: &OffsetGrid,
) -> Vec<Array2<f64>> {
    let points = grid_points(x_axis, y_axis);
    log::debug!("Sampling {} kernels", points.len());
    points.par_iter().map(|&offset| model.evaluate(offset)).collect()
}

/// Kernel grid over the default ±14" axes with a 7" step (5 × 5 kernels).
pub fn default_kernel_grid<M: PsfModel>(model: &M) -> Vec<Array2<f64>> {
    let axis = OffsetGrid::kernel_grid_default();
    kernel_grid(model, &axis, &axis)
}

/// On-axis Strehl ratio for each kernel size, in input order.
///
/// The kernel size is a construction parameter, so each size gets a fresh
/// model built from `config`.
pub fn on_axis_strehl_for_kernel_sizes(
    sizes: &[usize],
    config: &PsfConfig,
) -> Result<Vec<f64>, PsfError> {
    sizes
        .iter()
        .map(|&n| {
            let psf = AnalyticScaoPsf::new(config.with_kernel_size(n))?;
            Ok(psf.strehl_ratio(SamplePoint::ON_AXIS))
        })
        .collect()
}
