use std::collections::HashMap;

use crate::consts::CONTOUR_STROKE_WIDTH;
use crate::geometry::world_to_pixel;
use crate::overlay::raster::Rgba8Raster;
use crate::volume::{z_key, Polygon, Rgb8, StructureSet, Volume};

/// Outline of one visible ROI on the current slice, in reference (CT) pixel
/// coordinates. Polygons are implicitly closed.
#[derive(Clone, Debug)]
pub struct RoiStroke {
    pub name: String,
    pub color: Rgb8,
    /// Stroke width in reference pixel units, already divided by the
    /// display zoom so the on-screen width stays constant.
    pub width_px: f64,
    pub polygons: Vec<Polygon>,
}

/// All ROI outlines resolved for one slice.
#[derive(Clone, Debug, Default)]
pub struct StructureOverlay {
    pub strokes: Vec<RoiStroke>,
}

impl StructureOverlay {
    /// Stroke every polygon into a CT-pixel-space canvas.
    pub fn composite_into(&self, canvas: &mut Rgba8Raster) {
        for stroke in &self.strokes {
            for poly in &stroke.polygons {
                stroke_closed_polygon(canvas, poly, stroke.color, stroke.width_px);
            }
        }
    }
}

/// Resolve contour outlines for one CT slice.
///
/// Lookup per ROI is two-tier: exact match on the Z coordinate formatted to
/// two decimals, then a scan over the contour keys in file order accepting
/// the first whose parsed value lies within `z_tolerance` of the target.
/// ROIs toggled off are skipped; names without a visibility entry are
/// treated as visible. Returns `None` only when the slice index is out of
/// range; an overlay with no strokes just clears the canvas.
pub fn render_structure_overlay(
    set: &StructureSet,
    visibility: &HashMap<String, bool>,
    ct: &Volume,
    slice_index: usize,
    zoom_scale: f64,
) -> Option<StructureOverlay> {
    render_structure_overlay_with_tolerance(
        set,
        visibility,
        ct,
        slice_index,
        zoom_scale,
        crate::consts::STRUCT_Z_TOLERANCE_MM,
    )
}

pub fn render_structure_overlay_with_tolerance(
    set: &StructureSet,
    visibility: &HashMap<String, bool>,
    ct: &Volume,
    slice_index: usize,
    zoom_scale: f64,
    z_tolerance: f64,
) -> Option<StructureOverlay> {
    let target_z = *ct.z_positions.get(slice_index)?;
    let exact_key = z_key(target_z);
    let zoom = if zoom_scale > 0.0 { zoom_scale } else { 1.0 };
    let width_px = CONTOUR_STROKE_WIDTH / zoom;

    let mut strokes = Vec::new();
    for (name, roi) in set.iter() {
        if visibility.get(name) == Some(&false) {
            continue;
        }

        let polygons = roi.contours_at_key(&exact_key).or_else(|| {
            roi.contours.iter().find_map(|(key, polys)| {
                let parsed: f64 = key.parse().ok()?;
                ((parsed - target_z).abs() < z_tolerance).then_some(polys)
            })
        });

        if let Some(polygons) = polygons {
            let pixel_polys = polygons
                .iter()
                .map(|poly| {
                    poly.iter()
                        .map(|&p| world_to_pixel(p, ct.origin, ct.spacing))
                        .collect()
                })
                .collect();
            strokes.push(RoiStroke {
                name: name.to_string(),
                color: roi.color,
                width_px,
                polygons: pixel_polys,
            });
        }
    }

    Some(StructureOverlay { strokes })
}

/// Stroke a closed polygon outline with an anti-aliased pen.
///
/// Coverage per pixel is derived from the distance to the nearest segment,
/// so strokes stay clean at sub-pixel widths. Degenerate polygons (fewer
/// than two points) are skipped.
fn stroke_closed_polygon(canvas: &mut Rgba8Raster, poly: &Polygon, color: Rgb8, width_px: f64) {
    if poly.len() < 2 {
        return;
    }
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        stroke_segment(canvas, a, b, color, width_px);
    }
}

fn stroke_segment(canvas: &mut Rgba8Raster, a: [f64; 2], b: [f64; 2], color: Rgb8, width_px: f64) {
    let half = (width_px / 2.0).max(0.0);
    let pad = half + 1.0;

    let x_min = (a[0].min(b[0]) - pad).floor().max(0.0) as u32;
    let y_min = (a[1].min(b[1]) - pad).floor().max(0.0) as u32;
    let x_max = ((a[0].max(b[0]) + pad).ceil().max(0.0) as u32).min(canvas.width());
    let y_max = ((a[1].max(b[1]) + pad).ceil().max(0.0) as u32).min(canvas.height());

    for y in y_min..y_max {
        for x in x_min..x_max {
            let p = [x as f64 + 0.5, y as f64 + 0.5];
            let dist = point_segment_distance(p, a, b);
            let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let alpha = (coverage * 255.0).round() as u8;
                canvas.blend(x, y, [color[0], color[1], color[2], alpha]);
            }
        }
    }
}

fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len_sq > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1]];
    let d = [p[0] - closest[0], p[1] - closest[1]];
    (d[0] * d[0] + d[1] * d[1]).sqrt()
}
