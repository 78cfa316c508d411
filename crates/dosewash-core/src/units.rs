use serde::{Deserialize, Serialize};

use crate::consts::{
    ABSOLUTE_SLIDER_HEADROOM, DEFAULT_NORMALIZATION_DOSE, RELATIVE_SLIDER_MAX,
};
use crate::volume::DoseMeta;

/// Display unit for dose thresholds and readouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseUnit {
    /// Physical dose (Gy).
    Absolute,
    /// Percent of the normalization dose.
    Relative,
}

/// Threshold-slider state in the active unit, with unit switching and the
/// absolute effective range used for rendering.
///
/// Raw voxel data is always stored and compared in absolute Gy; only this
/// UI-facing range is unit-dependent.
#[derive(Clone, Debug)]
pub struct DoseDisplay {
    unit: DoseUnit,
    normalization_dose: f64,
    /// (min, max) in the active unit.
    range: (f64, f64),
    slider_max: f64,
    slider_step: f64,
    volume_max_dose: Option<f64>,
}

impl Default for DoseDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DoseDisplay {
    pub fn new() -> Self {
        Self {
            unit: DoseUnit::Absolute,
            normalization_dose: DEFAULT_NORMALIZATION_DOSE,
            range: (0.0, DEFAULT_NORMALIZATION_DOSE),
            slider_max: DEFAULT_NORMALIZATION_DOSE * ABSOLUTE_SLIDER_HEADROOM,
            slider_step: 0.1,
            volume_max_dose: None,
        }
    }

    pub fn unit(&self) -> DoseUnit {
        self.unit
    }

    pub fn normalization_dose(&self) -> f64 {
        self.normalization_dose
    }

    /// (min, max) in the active unit, as shown on the sliders.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn slider_max(&self) -> f64 {
        self.slider_max
    }

    pub fn slider_step(&self) -> f64 {
        self.slider_step
    }

    /// Switch the active unit, rescaling the range bounds in place.
    ///
    /// Requesting the current unit is a no-op. Absolute values are kept at
    /// 0.1 Gy resolution, relative values at whole percent.
    pub fn set_unit(&mut self, unit: DoseUnit) {
        if self.unit == unit {
            return;
        }
        let norm = self.normalization_dose;
        let (min, max) = self.range;
        self.unit = unit;
        match unit {
            DoseUnit::Relative => {
                self.range = (round_percent(min / norm * 100.0), round_percent(max / norm * 100.0));
                self.slider_max = RELATIVE_SLIDER_MAX;
                self.slider_step = 1.0;
            }
            DoseUnit::Absolute => {
                self.range = (round_gy(min / 100.0 * norm), round_gy(max / 100.0 * norm));
                self.slider_max = round_gy(self.absolute_slider_max());
                self.slider_step = 0.1;
            }
        }
    }

    /// Set the threshold range, interpreted in the active unit.
    pub fn set_range(&mut self, min: f64, max: f64) {
        self.range = (min, max);
    }

    pub fn set_normalization(&mut self, value: f64) {
        if value > 0.0 {
            self.normalization_dose = value;
        }
    }

    /// Record a freshly selected dose set.
    ///
    /// The slider ceiling follows the set's maximum, and a declared
    /// prescription overwrites the normalization dose (prescription wins on
    /// load).
    pub fn on_dose_loaded(&mut self, meta: &DoseMeta) {
        self.volume_max_dose = Some(meta.max_dose);
        if let Some(rx) = meta.prescription {
            if rx > 0.0 {
                self.normalization_dose = rx;
            }
        }
        if self.unit == DoseUnit::Absolute {
            self.slider_max = round_gy(self.absolute_slider_max());
        }
    }

    /// The absolute (Gy) min/max used for thresholding and colorization.
    pub fn effective_range(&self) -> (f64, f64) {
        match self.unit {
            DoseUnit::Absolute => self.range,
            DoseUnit::Relative => (
                self.range.0 / 100.0 * self.normalization_dose,
                self.range.1 / 100.0 * self.normalization_dose,
            ),
        }
    }

    fn absolute_slider_max(&self) -> f64 {
        self.volume_max_dose.unwrap_or(self.normalization_dose) * ABSOLUTE_SLIDER_HEADROOM
    }
}

fn round_gy(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round_percent(v: f64) -> f64 {
    v.round()
}
