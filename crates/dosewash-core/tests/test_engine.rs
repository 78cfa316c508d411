mod common;

use common::write_case_dir;
use dosewash_core::engine::{EngineConfig, OverlayEngine};
use dosewash_core::error::DosewashError;
use dosewash_core::io::case::CaseSource;
use dosewash_core::units::DoseUnit;
use dosewash_core::viewport::ViewportKey;

fn open_engine(dir: &tempfile::TempDir) -> OverlayEngine {
    OverlayEngine::open_case(CaseSource::new(dir.path()), EngineConfig::default()).unwrap()
}

fn canvas_has_pixels(canvas: &dosewash_core::overlay::raster::Rgba8Raster) -> bool {
    (0..canvas.height()).any(|y| (0..canvas.width()).any(|x| canvas.get(x, y)[3] > 0))
}

// ---------------------------------------------------------------------------
// case open
// ---------------------------------------------------------------------------

#[test]
fn test_open_case_starts_at_middle_slice() {
    let dir = write_case_dir();
    let engine = open_engine(&dir);
    assert_eq!(engine.session().slice_index, 2);
    assert_eq!(engine.session().ct.as_ref().unwrap().slice_count(), 4);
}

// ---------------------------------------------------------------------------
// dose selection and rendering
// ---------------------------------------------------------------------------

#[test]
fn test_select_dose_and_render_matching_slice() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();

    // Slice 2 (z=10) matches the dose plane at 10.5.
    engine.render_slice(2).unwrap();
    assert_eq!(engine.resolve_dose_slice(ViewportKey::Left), Some(0));
    let vp = engine.viewport(ViewportKey::Left);
    assert_eq!(vp.dose_id.as_deref(), Some("planA"));
    assert!(canvas_has_pixels(&vp.dose_canvas));
    // Uniform 30 Gy at range 20..60 -> green at wash alpha x opacity 0.5.
    assert_eq!(vp.dose_canvas.get(4, 4), [0, 255, 0, 100]);
}

#[test]
fn test_render_unmatched_slice_clears_dose_canvas() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();

    engine.render_slice(0).unwrap();
    assert_eq!(engine.resolve_dose_slice(ViewportKey::Left), None);
    assert!(!canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
}

#[test]
fn test_prescription_resets_normalization_on_load() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_normalization_dose(45.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    // planA declares a 50 Gy prescription.
    assert_eq!(engine.session().display.normalization_dose(), 50.0);
}

#[test]
fn test_deselect_dose_clears_state_and_canvas() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    engine.select_dose(ViewportKey::Left, None).unwrap();
    let vp = engine.viewport(ViewportKey::Left);
    assert!(vp.dose_id.is_none());
    assert!(vp.dose_volume.is_none());
    assert!(!canvas_has_pixels(&vp.dose_canvas));
}

#[test]
fn test_unknown_dose_leaves_viewport_unchanged() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    let err = engine.select_dose(ViewportKey::Left, Some("missing")).unwrap_err();
    assert!(matches!(err, DosewashError::UnknownDoseId(_)));
    let vp = engine.viewport(ViewportKey::Left);
    assert_eq!(vp.dose_id.as_deref(), Some("planA"));
    assert!(vp.dose_volume.is_some());
}

#[test]
fn test_viewports_are_independent() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
    assert!(!canvas_has_pixels(&engine.viewport(ViewportKey::Right).dose_canvas));
    assert!(engine.viewport(ViewportKey::Right).dose_id.is_none());
}

// ---------------------------------------------------------------------------
// threshold, unit, opacity
// ---------------------------------------------------------------------------

#[test]
fn test_threshold_above_voxels_hides_wash() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    engine.set_threshold(40.0, 60.0);
    assert!(!canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));

    engine.set_threshold(20.0, 60.0);
    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
}

#[test]
fn test_relative_threshold_uses_normalization() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    engine.set_unit(DoseUnit::Relative);
    // 80%..120% of the 50 Gy prescription -> 40..60 Gy: hides the 30 Gy wash.
    engine.set_threshold(80.0, 120.0);
    assert!(!canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
    // 40%..120% -> 20..60 Gy: visible again.
    engine.set_threshold(40.0, 120.0);
    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
}

#[test]
fn test_opacity_scales_composited_alpha() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    engine.set_opacity(1.0);
    assert_eq!(engine.viewport(ViewportKey::Left).dose_canvas.get(4, 4)[3], 200);
    engine.set_opacity(0.25);
    assert_eq!(engine.viewport(ViewportKey::Left).dose_canvas.get(4, 4)[3], 50);
}

#[test]
fn test_render_slice_out_of_range() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    let err = engine.render_slice(4).unwrap_err();
    assert!(matches!(err, DosewashError::SliceIndexOutOfRange { .. }));
    // The cursor is unchanged after the failed call.
    assert_eq!(engine.session().slice_index, 2);
}

// ---------------------------------------------------------------------------
// structures
// ---------------------------------------------------------------------------

#[test]
fn test_select_structure_draws_contours() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_structure(ViewportKey::Left, Some("anatomy")).unwrap();
    engine.render_slice(2).unwrap();

    let vp = engine.viewport(ViewportKey::Left);
    assert!(canvas_has_pixels(&vp.struct_canvas));
    // PTV is red; its top edge runs through pixel (4,2).
    assert_eq!(vp.struct_canvas.get(4, 2)[0], 255);
    // Both ROIs were seeded visible.
    assert!(vp.is_roi_visible("PTV"));
    assert!(vp.is_roi_visible("Cord"));
}

#[test]
fn test_hide_roi_removes_its_stroke() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_structure(ViewportKey::Left, Some("anatomy")).unwrap();
    engine.render_slice(2).unwrap();

    // Only PTV has a contour at z=10; hiding it empties the canvas.
    engine.set_roi_visible(ViewportKey::Left, "PTV", false);
    assert!(!canvas_has_pixels(&engine.viewport(ViewportKey::Left).struct_canvas));
}

#[test]
fn test_toggle_all_roundtrip() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.select_structure(ViewportKey::Left, Some("anatomy")).unwrap();

    engine.set_roi_visible(ViewportKey::Left, "Cord", false);
    engine.toggle_all_roi(ViewportKey::Left);
    let vp = engine.viewport(ViewportKey::Left);
    assert!(vp.is_roi_visible("PTV") && vp.is_roi_visible("Cord"));

    engine.toggle_all_roi(ViewportKey::Left);
    let vp = engine.viewport(ViewportKey::Left);
    assert!(!vp.is_roi_visible("PTV") && !vp.is_roi_visible("Cord"));
}

// ---------------------------------------------------------------------------
// observer entry points
// ---------------------------------------------------------------------------

#[test]
fn test_base_image_rendered_redraws_viewport() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    // Zoom changes are applied on the next base-image notification.
    engine.select_structure(ViewportKey::Left, Some("anatomy")).unwrap();
    engine.set_zoom_scale(4.0);
    engine.on_base_image_rendered(ViewportKey::Left);
    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Left).struct_canvas));
}

#[test]
fn test_parameter_changed_redraws_both_viewports() {
    let dir = write_case_dir();
    let mut engine = open_engine(&dir);
    engine.set_threshold(20.0, 60.0);
    engine.select_dose(ViewportKey::Left, Some("planA")).unwrap();
    engine.select_dose(ViewportKey::Right, Some("planA")).unwrap();
    engine.render_slice(2).unwrap();

    engine.on_parameter_changed();
    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Left).dose_canvas));
    assert!(canvas_has_pixels(&engine.viewport(ViewportKey::Right).dose_canvas));
}
