use crate::units::DoseDisplay;
use crate::volume::Volume;

/// State shared by both viewports: the CT volume, the slice cursor, the
/// dose display unit/thresholds, and overlay opacity.
#[derive(Debug)]
pub struct Session {
    pub ct: Option<Volume>,
    /// Current CT slice, shared across viewports.
    pub slice_index: usize,
    pub display: DoseDisplay,
    /// Global overlay opacity in [0, 1].
    pub opacity: f64,
    /// Current display zoom, pushed in by the host display component.
    /// Contour stroke width is divided by this to stay constant on screen.
    pub zoom_scale: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            ct: None,
            slice_index: 0,
            display: DoseDisplay::new(),
            opacity: 0.5,
            zoom_scale: 1.0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
