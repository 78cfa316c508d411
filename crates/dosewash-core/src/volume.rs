use ndarray::{Array3, ArrayView2};

use crate::error::{DosewashError, Result};

/// A scalar volume on a regular axis-aligned grid.
///
/// Samples are f32, shape = (slices, rows, cols). Slice spacing is carried
/// as an explicit Z position per slice; slices are not required to be
/// uniformly spaced.
#[derive(Clone, Debug)]
pub struct Volume {
    /// Sample data, slice-major then row-major.
    pub data: Array3<f32>,
    /// World (x, y) of pixel (0,0) of every slice.
    pub origin: [f64; 2],
    /// World units per pixel (dx, dy), constant across slices.
    pub spacing: [f64; 2],
    /// World Z per slice index.
    pub z_positions: Vec<f64>,
}

impl Volume {
    /// Build a volume from a flat slice-major sample buffer.
    ///
    /// Validates that the buffer length matches `rows * cols *
    /// z_positions.len()` and that spacing is strictly positive.
    pub fn from_flat(
        data: Vec<f32>,
        rows: usize,
        cols: usize,
        origin: [f64; 2],
        spacing: [f64; 2],
        z_positions: Vec<f64>,
    ) -> Result<Self> {
        if spacing[0] <= 0.0 || spacing[1] <= 0.0 {
            return Err(DosewashError::InvalidSpacing {
                dx: spacing[0],
                dy: spacing[1],
            });
        }
        let expected = rows * cols * z_positions.len();
        if data.len() != expected {
            return Err(DosewashError::InvalidVolume {
                expected,
                actual: data.len(),
            });
        }
        let data = Array3::from_shape_vec((z_positions.len(), rows, cols), data)
            .expect("buffer length checked against shape");
        Ok(Self {
            data,
            origin,
            spacing,
            z_positions,
        })
    }

    pub fn slice_count(&self) -> usize {
        self.z_positions.len()
    }

    pub fn rows(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn cols(&self) -> usize {
        self.data.shape()[2]
    }

    /// Row-major view of one slice.
    pub fn slice(&self, index: usize) -> Result<ArrayView2<'_, f32>> {
        if index >= self.slice_count() {
            return Err(DosewashError::SliceIndexOutOfRange {
                index,
                total: self.slice_count(),
            });
        }
        Ok(self.data.index_axis(ndarray::Axis(0), index))
    }

    /// World Z of a slice.
    pub fn z_at(&self, index: usize) -> Result<f64> {
        self.z_positions
            .get(index)
            .copied()
            .ok_or(DosewashError::SliceIndexOutOfRange {
                index,
                total: self.slice_count(),
            })
    }
}

/// Dose-set metadata carried alongside its `Volume`.
#[derive(Clone, Debug)]
pub struct DoseMeta {
    /// Ceiling of the set (Gy).
    pub max_dose: f64,
    /// Dose defining 100% for relative display, when the plan declares one.
    pub prescription: Option<f64>,
}

/// 8-bit RGB color of an ROI outline.
pub type Rgb8 = [u8; 3];

/// Parse a `#RRGGBB` CSS color string.
pub fn parse_color(s: &str) -> Result<Rgb8> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| DosewashError::InvalidColor(s.to_string()))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DosewashError::InvalidColor(s.to_string()));
    }
    let channel = |r: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[r], 16).expect("hex digits checked above")
    };
    Ok([channel(0..2), channel(2..4), channel(4..6)])
}

/// Closed contour polygon, world (x, y) points. The closing edge from the
/// last point back to the first is implicit.
pub type Polygon = Vec<[f64; 2]>;

/// One named structure: outline color plus contours keyed by Z.
///
/// Contour keys are the Z coordinate formatted to exactly two decimals, and
/// their file order is preserved: approximate lookup scans in insertion
/// order and takes the first key within tolerance.
#[derive(Clone, Debug)]
pub struct Roi {
    pub color: Rgb8,
    pub contours: Vec<(String, Vec<Polygon>)>,
}

impl Roi {
    /// Exact lookup by 2-decimal Z key.
    pub fn contours_at_key(&self, key: &str) -> Option<&Vec<Polygon>> {
        self.contours
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, p)| p)
    }
}

/// A structure set: ROI name -> contour data, insertion-ordered.
#[derive(Clone, Debug, Default)]
pub struct StructureSet {
    rois: Vec<(String, Roi)>,
}

impl StructureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ROI, replacing any existing one with the same name.
    pub fn insert(&mut self, name: String, roi: Roi) {
        if let Some(slot) = self.rois.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = roi;
        } else {
            self.rois.push((name, roi));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Roi> {
        self.rois
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Roi)> {
        self.rois.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rois.iter().map(|(n, _)| n.as_str())
    }
}

/// Format a world Z the way contour keys are written: two decimals.
pub fn z_key(z: f64) -> String {
    format!("{z:.2}")
}
