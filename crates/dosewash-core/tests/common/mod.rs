#![allow(dead_code)]

use std::fs;
use std::path::Path;

use dosewash_core::volume::{Polygon, Roi, StructureSet, Volume};

/// Uniform-valued volume on a given grid.
pub fn make_volume(
    rows: usize,
    cols: usize,
    origin: [f64; 2],
    spacing: [f64; 2],
    z_positions: Vec<f64>,
    fill: f32,
) -> Volume {
    let data = vec![fill; rows * cols * z_positions.len()];
    Volume::from_flat(data, rows, cols, origin, spacing, z_positions).unwrap()
}

/// Volume with per-sample values from `f(slice, row, col)`.
pub fn make_volume_with(
    rows: usize,
    cols: usize,
    origin: [f64; 2],
    spacing: [f64; 2],
    z_positions: Vec<f64>,
    f: impl Fn(usize, usize, usize) -> f32,
) -> Volume {
    let mut data = Vec::with_capacity(rows * cols * z_positions.len());
    for s in 0..z_positions.len() {
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(s, r, c));
            }
        }
    }
    Volume::from_flat(data, rows, cols, origin, spacing, z_positions).unwrap()
}

/// 8x8 CT with unit spacing at the world origin and slices at z = 0, 5, 10, 15.
pub fn make_ct() -> Volume {
    make_volume(8, 8, [0.0, 0.0], [1.0, 1.0], vec![0.0, 5.0, 10.0, 15.0], 100.0)
}

/// One square ROI with a single contour entry.
pub fn make_roi(color: [u8; 3], z_key: &str, poly: Polygon) -> Roi {
    Roi {
        color,
        contours: vec![(z_key.to_string(), vec![poly])],
    }
}

pub fn square_poly(x0: f64, y0: f64, size: f64) -> Polygon {
    vec![
        [x0, y0],
        [x0 + size, y0],
        [x0 + size, y0 + size],
        [x0, y0 + size],
    ]
}

pub fn make_struct_set() -> StructureSet {
    let mut set = StructureSet::new();
    set.insert(
        "PTV".to_string(),
        make_roi([255, 0, 0], "10.00", square_poly(2.0, 2.0, 4.0)),
    );
    set.insert(
        "Cord".to_string(),
        make_roi([0, 255, 0], "0.00", square_poly(1.0, 1.0, 2.0)),
    );
    set
}

// ---------------------------------------------------------------------------
// On-disk case fixtures
// ---------------------------------------------------------------------------

pub fn write_i16_volume(path: &Path, samples: &[i16]) {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

pub fn write_f32_volume(path: &Path, samples: &[f32]) {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

pub const CASE_MANIFEST: &str = r#"{
  "id": "case1",
  "ct": {
    "rows": 8, "cols": 8, "count": 4,
    "spacing": [1.0, 1.0],
    "origin": [0.0, 0.0, 0.0],
    "z_positions": [0.0, 5.0, 10.0, 15.0]
  },
  "doses": {
    "planA": {
      "filename": "planA.bin",
      "rows": 4, "cols": 4,
      "spacing": [2.0, 2.0],
      "origin": [0.0, 0.0, 10.5],
      "z_positions": [10.5],
      "max_dose": 60.0,
      "prescription": 50.0
    }
  },
  "structs": { "anatomy": "anatomy.json" }
}"#;

pub const CASE_STRUCTURES: &str = r#"{
  "PTV": {
    "color": "#FF0000",
    "contours": { "10.00": [[[2.0, 2.0], [6.0, 2.0], [6.0, 6.0], [2.0, 6.0]]] }
  },
  "Cord": {
    "color": "#00FF00",
    "contours": { "0.00": [[[1.0, 1.0], [3.0, 1.0], [2.0, 3.0]]] }
  }
}"#;

/// Write a complete synthetic case directory: manifest, CT (value 100
/// everywhere), one dose set (value 30 everywhere), one structure set.
pub fn write_case_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("manifest.json"), CASE_MANIFEST).unwrap();
    write_i16_volume(&dir.path().join("ct.bin"), &[100i16; 8 * 8 * 4]);
    write_f32_volume(&dir.path().join("planA.bin"), &[30.0f32; 4 * 4]);
    fs::write(dir.path().join("anatomy.json"), CASE_STRUCTURES).unwrap();
    dir
}
