use rayon::prelude::*;
use tracing::debug;

use crate::colormap::dose_color;
use crate::consts::{DOSE_OVERLAY_ALPHA, PARALLEL_PIXEL_THRESHOLD};
use crate::geometry::{pixel_mapping, PixelMapping};
use crate::overlay::raster::{blit_scaled, Rgba8Raster};
use crate::slice_match::nearest_slice;
use crate::units::DoseDisplay;
use crate::volume::Volume;

/// A rendered dose wash: a raster at the dose grid's native resolution plus
/// its placement in reference (CT) pixel space.
#[derive(Clone, Debug)]
pub struct DoseOverlay {
    pub raster: Rgba8Raster,
    pub mapping: PixelMapping,
    /// Global opacity, post-multiplied over the whole placed image.
    pub opacity: f64,
    /// Dose slice index that matched the CT slice.
    pub dose_slice: usize,
}

impl DoseOverlay {
    /// Place the wash into a CT-pixel-space canvas with smoothing.
    pub fn composite_into(&self, canvas: &mut Rgba8Raster) {
        blit_scaled(&self.raster, canvas, self.mapping, self.opacity);
    }
}

/// Render the dose wash for one CT slice.
///
/// Returns `None` whenever there is nothing to draw: the CT slice index is
/// out of range, no dose slice lies within `z_tolerance` of the CT slice's
/// Z, the dose grid is degenerate, or the effective range is empty. None of
/// these are errors; the caller clears the canvas.
pub fn render_dose_overlay(
    dose: &Volume,
    ct: &Volume,
    slice_index: usize,
    display: &DoseDisplay,
    opacity: f64,
    z_tolerance: f64,
) -> Option<DoseOverlay> {
    let target_z = *ct.z_positions.get(slice_index)?;
    let dose_slice = match nearest_slice(target_z, &dose.z_positions, z_tolerance) {
        Some(i) => i,
        None => {
            debug!(slice_index, target_z, "no dose slice within tolerance");
            return None;
        }
    };

    let rows = dose.rows();
    let cols = dose.cols();
    if rows == 0 || cols == 0 {
        return None;
    }

    let (min, max) = display.effective_range();
    if max <= min || max <= 0.0 {
        return None;
    }
    let min = min as f32;
    let max = max as f32;

    let slice = dose.slice(dose_slice).ok()?;
    let mut pixels = vec![0u8; rows * cols * 4];

    let colorize_row = |r: usize, row_px: &mut [u8]| {
        for c in 0..cols {
            let v = slice[(r, c)];
            if v >= min {
                let [cr, cg, cb] = dose_color(v, max);
                let p = c * 4;
                row_px[p] = cr;
                row_px[p + 1] = cg;
                row_px[p + 2] = cb;
                row_px[p + 3] = DOSE_OVERLAY_ALPHA;
            }
        }
    };

    if rows * cols >= PARALLEL_PIXEL_THRESHOLD {
        pixels
            .par_chunks_mut(cols * 4)
            .enumerate()
            .for_each(|(r, row_px)| colorize_row(r, row_px));
    } else {
        for (r, row_px) in pixels.chunks_mut(cols * 4).enumerate() {
            colorize_row(r, row_px);
        }
    }

    let image = image::RgbaImage::from_raw(cols as u32, rows as u32, pixels)
        .expect("buffer size matches dimensions");

    Some(DoseOverlay {
        raster: Rgba8Raster::from_image(image),
        mapping: pixel_mapping(dose, ct),
        opacity,
        dose_slice,
    })
}
