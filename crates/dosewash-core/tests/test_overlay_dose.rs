mod common;

use common::{make_volume, make_volume_with};
use dosewash_core::overlay::dose::render_dose_overlay;
use dosewash_core::overlay::raster::Rgba8Raster;
use dosewash_core::units::{DoseDisplay, DoseUnit};

fn display(min: f64, max: f64) -> DoseDisplay {
    let mut d = DoseDisplay::new();
    d.set_range(min, max);
    d
}

fn ct_4slices() -> dosewash_core::volume::Volume {
    make_volume(8, 8, [0.0, 0.0], [1.0, 1.0], vec![0.0, 5.0, 10.0, 15.0], 100.0)
}

fn dose_at_10_5(value: f32) -> dosewash_core::volume::Volume {
    make_volume(4, 4, [0.0, 0.0], [2.0, 2.0], vec![10.5], value)
}

// ---------------------------------------------------------------------------
// slice resolution
// ---------------------------------------------------------------------------

#[test]
fn test_resolves_dose_slice_within_tolerance() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    let overlay = render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 1.0, 2.0)
        .expect("z=10 vs 10.5 is within 2.0");
    assert_eq!(overlay.dose_slice, 0);
}

#[test]
fn test_none_when_no_slice_in_tolerance() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    assert!(render_dose_overlay(&dose, &ct, 0, &display(20.0, 60.0), 1.0, 2.0).is_none());
}

#[test]
fn test_none_for_out_of_range_ct_slice() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    assert!(render_dose_overlay(&dose, &ct, 99, &display(20.0, 60.0), 1.0, 2.0).is_none());
}

// ---------------------------------------------------------------------------
// thresholding and colorization
// ---------------------------------------------------------------------------

#[test]
fn test_voxels_below_min_are_transparent() {
    let ct = ct_4slices();
    // Left half 10 (below min 20), right half 30.
    let dose = make_volume_with(4, 4, [0.0, 0.0], [2.0, 2.0], vec![10.5], |_, _, c| {
        if c < 2 {
            10.0
        } else {
            30.0
        }
    });
    let overlay =
        render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 1.0, 2.0).unwrap();
    assert_eq!(overlay.raster.get(0, 0)[3], 0, "value 10 is transparent");
    // ratio 30/60 = 0.5 -> pure green at the fixed wash alpha
    assert_eq!(overlay.raster.get(3, 0), [0, 255, 0, 200]);
}

#[test]
fn test_relative_unit_thresholds_in_absolute_gy() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    // 80%..120% of norm 50 -> effective 40..60 Gy: voxel 30 is below min.
    let mut d = DoseDisplay::new();
    d.set_normalization(50.0);
    d.set_unit(DoseUnit::Relative);
    d.set_range(80.0, 120.0);
    let overlay = render_dose_overlay(&dose, &ct, 2, &d, 1.0, 2.0).unwrap();
    assert_eq!(overlay.raster.get(1, 1)[3], 0);
}

// ---------------------------------------------------------------------------
// degenerate input guards
// ---------------------------------------------------------------------------

#[test]
fn test_none_when_range_empty() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    assert!(render_dose_overlay(&dose, &ct, 2, &display(60.0, 60.0), 1.0, 2.0).is_none());
    assert!(render_dose_overlay(&dose, &ct, 2, &display(60.0, 20.0), 1.0, 2.0).is_none());
}

#[test]
fn test_none_for_zero_sized_grid() {
    let ct = ct_4slices();
    let dose = make_volume(0, 4, [0.0, 0.0], [2.0, 2.0], vec![10.5], 0.0);
    assert!(render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 1.0, 2.0).is_none());
}

// ---------------------------------------------------------------------------
// placement and compositing
// ---------------------------------------------------------------------------

#[test]
fn test_mapping_scales_dose_grid_onto_ct() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    let overlay =
        render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 1.0, 2.0).unwrap();
    assert_eq!(overlay.mapping.offset_x, 0.0);
    assert_eq!(overlay.mapping.scale_x, 2.0);
    assert_eq!(overlay.mapping.scale_y, 2.0);
}

#[test]
fn test_composite_covers_scaled_region() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    let overlay =
        render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 1.0, 2.0).unwrap();

    let mut canvas = Rgba8Raster::new(8, 8);
    overlay.composite_into(&mut canvas);
    // Interior of the uniform wash: bilinear of identical pixels.
    assert_eq!(canvas.get(4, 4), [0, 255, 0, 200]);
    assert!(canvas.get(0, 0)[3] > 0, "origin-aligned corner is covered");
}

#[test]
fn test_opacity_post_multiplies_alpha() {
    let ct = ct_4slices();
    let dose = dose_at_10_5(30.0);
    let overlay =
        render_dose_overlay(&dose, &ct, 2, &display(20.0, 60.0), 0.5, 2.0).unwrap();

    // Per-voxel alpha stays 200; opacity applies at composite time.
    assert_eq!(overlay.raster.get(1, 1)[3], 200);
    let mut canvas = Rgba8Raster::new(8, 8);
    overlay.composite_into(&mut canvas);
    assert_eq!(canvas.get(4, 4)[3], 100);
}
