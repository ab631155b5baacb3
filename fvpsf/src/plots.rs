//! PNG diagnostics for strehl maps and kernel grids

use std::error::Error;
use std::path::Path;

use ndarray::Array2;
use plotters::prelude::*;

use crate::field::OffsetGrid;

/// Dynamic range shown in kernel mosaics, in decades below the peak
const KERNEL_DECADES: f64 = 6.0;

/// Blue (low) to red (high) for `t` in `[0, 1]`.
fn heat_color(t: f64) -> HSLColor {
    let t = t.clamp(0.0, 1.0);
    HSLColor((1.0 - t) * 0.7, 0.9, 0.5)
}

/// Mosaic of kernels on a log10 scale, one panel per grid cell.
///
/// `kernels` are ordered as returned by [`crate::grid::kernel_grid`]: x
/// outermost. Panels are laid out with x increasing to the right and y
/// increasing upward; inside each panel the first kernel row is at the bottom.
pub fn plot_kernel_grid(
    kernels: &[Array2<f64>],
    x_axis: &OffsetGrid,
    y_axis: &OffsetGrid,
    title: &str,
    save_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let xs = x_axis.values();
    let ys = y_axis.values();
    if kernels.len() != xs.len() * ys.len() {
        return Err(format!(
            "{} kernels do not fill a {} x {} grid",
            kernels.len(),
            xs.len(),
            ys.len()
        )
        .into());
    }
    if kernels.is_empty() {
        return Err("No kernels to plot".into());
    }

    let peak = kernels
        .iter()
        .flat_map(|k| k.iter())
        .cloned()
        .fold(f64::MIN, f64::max);
    let log_hi = peak.max(f64::MIN_POSITIVE).log10();
    let log_lo = log_hi - KERNEL_DECADES;

    let panel_px = 160u32;
    let width = panel_px * xs.len() as u32;
    let height = panel_px * ys.len() as u32 + 40;

    let root = BitMapBackend::new(save_path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 24).into_font().color(&BLACK))?;

    let panels = root.split_evenly((ys.len(), xs.len()));
    for (row, y_idx) in (0..ys.len()).rev().enumerate() {
        for (x_idx, &x) in xs.iter().enumerate() {
            let panel = &panels[row * xs.len() + x_idx];
            let label = format!("({:+.0}\", {:+.0}\")", x, ys[y_idx]);
            let panel = panel.titled(&label, ("sans-serif", 12))?;

            let kernel = &kernels[x_idx * ys.len() + y_idx];
            let (n_rows, n_cols) = kernel.dim();
            let (w, h) = panel.dim_in_pixel();
            for py in 0..h {
                // Kernel row 0 at the bottom of the panel
                let k_row = (h - 1 - py) as usize * n_rows / h as usize;
                for px in 0..w {
                    let k_col = px as usize * n_cols / w as usize;
                    let v = kernel[[k_row, k_col]].max(f64::MIN_POSITIVE).log10();
                    let t = (v - log_lo) / (log_hi - log_lo);
                    panel.draw_pixel((px as i32, py as i32), &heat_color(t))?;
                }
            }
        }
    }

    root.present()?;
    log::info!("Kernel grid saved to {}", save_path.display());
    Ok(())
}

/// Colour map of strehl ratios, `map[[i, j]]` drawn at `(x_i, y_j)`.
pub fn plot_strehl_map(
    map: &Array2<f64>,
    x_axis: &OffsetGrid,
    y_axis: &OffsetGrid,
    save_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let xs = x_axis.values();
    let ys = y_axis.values();
    if map.dim() != (xs.len(), ys.len()) || map.is_empty() {
        return Err(format!(
            "Strehl map of shape {:?} does not match {} x {} axes",
            map.dim(),
            xs.len(),
            ys.len()
        )
        .into());
    }

    let lo = map.iter().cloned().fold(f64::MAX, f64::min);
    let hi = map.iter().cloned().fold(f64::MIN, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let half_x = x_axis.step() / 2.0;
    let half_y = y_axis.step() / 2.0;
    let x_range = (xs[0] - half_x)..(xs[xs.len() - 1] + half_x);
    let y_range = (ys[0] - half_y)..(ys[ys.len() - 1] + half_y);

    let root = BitMapBackend::new(save_path, (900, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Strehl ratio ({:.3} to {:.3})", lo, hi),
            ("sans-serif", 28).into_font().color(&BLACK),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("X offset [arcsec]")
        .y_desc("Y offset [arcsec]")
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(map.indexed_iter().map(|((i, j), &s)| {
        let (x, y) = (xs[i], ys[j]);
        Rectangle::new(
            [(x - half_x, y - half_y), (x + half_x, y + half_y)],
            heat_color((s - lo) / span).filled(),
        )
    }))?;

    root.present()?;
    log::info!("Strehl map saved to {}", save_path.display());
    Ok(())
}
