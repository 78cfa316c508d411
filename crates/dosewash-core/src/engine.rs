use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{DEFAULT_NORMALIZATION_DOSE, DOSE_Z_TOLERANCE_MM, STRUCT_Z_TOLERANCE_MM};
use crate::error::{DosewashError, Result};
use crate::io::case::CaseSource;
use crate::io::manifest::CaseManifest;
use crate::overlay::dose::render_dose_overlay;
use crate::overlay::structures::render_structure_overlay_with_tolerance;
use crate::session::Session;
use crate::slice_match::nearest_slice;
use crate::units::DoseUnit;
use crate::viewport::{ViewportKey, ViewportState};

/// Engine tuning knobs, loadable from a TOML file by hosts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max |z| distance (mm) for CT-to-dose slice matching.
    pub dose_z_tolerance: f64,
    /// Max |z| distance (mm) for approximate contour key lookup.
    pub struct_z_tolerance: f64,
    /// Normalization dose (Gy) before any prescription is seen.
    pub default_normalization: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dose_z_tolerance: DOSE_Z_TOLERANCE_MM,
            struct_z_tolerance: STRUCT_Z_TOLERANCE_MM,
            default_normalization: DEFAULT_NORMALIZATION_DOSE,
        }
    }
}

/// The overlay compositing engine: one case, two independently configured
/// viewports under a shared slice cursor.
///
/// All operations run synchronously on the caller's thread. Selection
/// loads replace only the addressed viewport's state; a host performing
/// loads elsewhere and applying them out of order gets last-writer-wins.
/// Hosts wire their event sources to [`OverlayEngine::on_base_image_rendered`]
/// and [`OverlayEngine::on_parameter_changed`]; no implicit listeners exist.
pub struct OverlayEngine {
    config: EngineConfig,
    source: CaseSource,
    manifest: CaseManifest,
    session: Session,
    left: ViewportState,
    right: ViewportState,
}

impl OverlayEngine {
    /// Load a case directory (manifest + CT volume) and start at the middle
    /// slice. Dose/structure sets are loaded on selection.
    pub fn open_case(source: CaseSource, config: EngineConfig) -> Result<Self> {
        Self::open_case_with_progress(source, config, |_, _| {})
    }

    pub fn open_case_with_progress(
        source: CaseSource,
        config: EngineConfig,
        progress: impl FnMut(usize, usize),
    ) -> Result<Self> {
        let manifest = source.load_manifest()?;
        let ct = source.load_ct(&manifest, progress)?;
        info!(
            case = manifest.id.as_deref().unwrap_or("unnamed"),
            slices = ct.slice_count(),
            "case opened"
        );

        let mut session = Session::new();
        session.slice_index = ct.slice_count() / 2;
        session.display.set_normalization(config.default_normalization);
        session.ct = Some(ct);

        Ok(Self {
            config,
            source,
            manifest,
            session,
            left: ViewportState::new(),
            right: ViewportState::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn manifest(&self) -> &CaseManifest {
        &self.manifest
    }

    pub fn viewport(&self, key: ViewportKey) -> &ViewportState {
        match key {
            ViewportKey::Left => &self.left,
            ViewportKey::Right => &self.right,
        }
    }

    /// Move the shared slice cursor and re-render both viewports.
    pub fn render_slice(&mut self, index: usize) -> Result<()> {
        let total = self
            .session
            .ct
            .as_ref()
            .map(|ct| ct.slice_count())
            .unwrap_or(0);
        if index >= total {
            return Err(DosewashError::SliceIndexOutOfRange { index, total });
        }
        self.session.slice_index = index;
        self.redraw_all();
        Ok(())
    }

    /// Set the threshold range, interpreted in the active unit.
    pub fn set_threshold(&mut self, min: f64, max: f64) {
        self.session.display.set_range(min, max);
        self.on_parameter_changed();
    }

    pub fn set_opacity(&mut self, value: f64) {
        self.session.opacity = value.clamp(0.0, 1.0);
        self.on_parameter_changed();
    }

    pub fn set_unit(&mut self, unit: DoseUnit) {
        self.session.display.set_unit(unit);
        self.on_parameter_changed();
    }

    pub fn set_normalization_dose(&mut self, value: f64) {
        self.session.display.set_normalization(value);
        self.on_parameter_changed();
    }

    /// Record the display component's current zoom. The host signals the
    /// accompanying redraw via [`Self::on_base_image_rendered`] once its own
    /// transform pass has run, keeping overlays pixel-aligned with the base.
    pub fn set_zoom_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.session.zoom_scale = scale;
        }
    }

    /// Select a dose set for one viewport (`None` clears the selection).
    pub fn select_dose(&mut self, key: ViewportKey, id: Option<&str>) -> Result<()> {
        self.select_dose_with_progress(key, id, |_, _| {})
    }

    pub fn select_dose_with_progress(
        &mut self,
        key: ViewportKey,
        id: Option<&str>,
        progress: impl FnMut(usize, usize),
    ) -> Result<()> {
        let Some(id) = id.filter(|s| !s.is_empty()) else {
            let vp = self.viewport_mut(key);
            vp.dose_id = None;
            vp.dose_volume = None;
            vp.dose_meta = None;
            self.redraw(key);
            return Ok(());
        };

        let (volume, meta) = self.source.load_dose(&self.manifest, id, progress)?;
        self.session.display.on_dose_loaded(&meta);

        let vp = self.viewport_mut(key);
        vp.dose_id = Some(id.to_string());
        vp.dose_volume = Some(volume);
        vp.dose_meta = Some(meta);
        self.redraw(key);
        Ok(())
    }

    /// Select a structure set for one viewport (`None` clears it). ROI
    /// visibility entries persist across selections by name.
    pub fn select_structure(&mut self, key: ViewportKey, id: Option<&str>) -> Result<()> {
        let Some(id) = id.filter(|s| !s.is_empty()) else {
            let vp = self.viewport_mut(key);
            vp.struct_id = None;
            vp.struct_data = None;
            self.redraw(key);
            return Ok(());
        };

        let set = self.source.load_structures(&self.manifest, id)?;
        let vp = self.viewport_mut(key);
        vp.mark_rois_seen(&set);
        vp.struct_id = Some(id.to_string());
        vp.struct_data = Some(set);
        self.redraw(key);
        Ok(())
    }

    pub fn set_roi_visible(&mut self, key: ViewportKey, name: &str, visible: bool) {
        self.viewport_mut(key).set_roi_visible(name, visible);
        self.redraw(key);
    }

    pub fn toggle_all_roi(&mut self, key: ViewportKey) {
        self.viewport_mut(key).toggle_all_roi();
        self.redraw(key);
    }

    /// Host notification: the base image of one viewport was just rendered.
    pub fn on_base_image_rendered(&mut self, key: ViewportKey) {
        self.redraw(key);
    }

    /// Host notification: a shared display parameter changed.
    pub fn on_parameter_changed(&mut self) {
        self.redraw_all();
    }

    /// Dose slice index that would be drawn for a viewport at the current
    /// cursor, if any.
    pub fn resolve_dose_slice(&self, key: ViewportKey) -> Option<usize> {
        let ct = self.session.ct.as_ref()?;
        let dose = self.viewport(key).dose_volume.as_ref()?;
        let target_z = *ct.z_positions.get(self.session.slice_index)?;
        nearest_slice(target_z, &dose.z_positions, self.config.dose_z_tolerance)
    }

    fn viewport_mut(&mut self, key: ViewportKey) -> &mut ViewportState {
        match key {
            ViewportKey::Left => &mut self.left,
            ViewportKey::Right => &mut self.right,
        }
    }

    fn redraw(&mut self, key: ViewportKey) {
        let vp = match key {
            ViewportKey::Left => &mut self.left,
            ViewportKey::Right => &mut self.right,
        };
        redraw_viewport(&self.config, &self.session, vp);
    }

    fn redraw_all(&mut self) {
        redraw_viewport(&self.config, &self.session, &mut self.left);
        redraw_viewport(&self.config, &self.session, &mut self.right);
    }
}

/// Re-render one viewport's overlay canvases against the shared session.
///
/// Canvases are sized to the CT pixel grid and cleared first; every "draw
/// nothing" outcome (no selection, no Z match, degenerate range) leaves the
/// canvas transparent.
fn redraw_viewport(config: &EngineConfig, session: &Session, vp: &mut ViewportState) {
    let Some(ct) = &session.ct else {
        return;
    };
    let (w, h) = (ct.cols() as u32, ct.rows() as u32);
    vp.dose_canvas.ensure_size(w, h);
    vp.struct_canvas.ensure_size(w, h);
    vp.dose_canvas.clear();
    vp.struct_canvas.clear();

    if let Some(dose) = &vp.dose_volume {
        if let Some(overlay) = render_dose_overlay(
            dose,
            ct,
            session.slice_index,
            &session.display,
            session.opacity,
            config.dose_z_tolerance,
        ) {
            overlay.composite_into(&mut vp.dose_canvas);
        }
    }

    if let Some(set) = &vp.struct_data {
        if let Some(overlay) = render_structure_overlay_with_tolerance(
            set,
            &vp.roi_visibility,
            ct,
            session.slice_index,
            session.zoom_scale,
            config.struct_z_tolerance,
        ) {
            overlay.composite_into(&mut vp.struct_canvas);
        }
    }
}
