use std::collections::HashMap;

use crate::overlay::raster::Rgba8Raster;
use crate::volume::{DoseMeta, StructureSet, Volume};

/// Identifies one of the two synchronized viewports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportKey {
    Left,
    Right,
}

impl ViewportKey {
    pub const ALL: [ViewportKey; 2] = [ViewportKey::Left, ViewportKey::Right];
}

/// Per-viewport mutable state: selected sets, decoded volumes, ROI toggles,
/// and the two output canvases. Owns no rendering logic.
///
/// `roi_visibility` is keyed by ROI name and never pruned: entries for names
/// absent from the currently loaded set are orphaned but kept, so a user's
/// toggles are recalled when a set containing those names is selected again.
#[derive(Debug, Default)]
pub struct ViewportState {
    pub dose_id: Option<String>,
    pub struct_id: Option<String>,
    pub dose_volume: Option<Volume>,
    pub dose_meta: Option<DoseMeta>,
    pub struct_data: Option<StructureSet>,
    pub roi_visibility: HashMap<String, bool>,
    pub dose_canvas: Rgba8Raster,
    pub struct_canvas: Rgba8Raster,
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// ROIs with no entry yet are visible.
    pub fn is_roi_visible(&self, name: &str) -> bool {
        *self.roi_visibility.get(name).unwrap_or(&true)
    }

    pub fn set_roi_visible(&mut self, name: &str, visible: bool) {
        self.roi_visibility.insert(name.to_string(), visible);
    }

    /// Seed default-true visibility entries for every ROI in a newly loaded
    /// set, without touching existing toggles.
    pub fn mark_rois_seen(&mut self, set: &StructureSet) {
        for name in set.names() {
            self.roi_visibility.entry(name.to_string()).or_insert(true);
        }
    }

    /// If any ROI in the current set is hidden, show them all; otherwise
    /// hide them all. Only names in the current set are touched.
    pub fn toggle_all_roi(&mut self) {
        let Some(set) = &self.struct_data else {
            return;
        };
        let any_hidden = set
            .names()
            .any(|n| self.roi_visibility.get(n) == Some(&false));
        let names: Vec<String> = set.names().map(str::to_string).collect();
        for name in names {
            self.roi_visibility.insert(name, any_hidden);
        }
    }
}
