use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DosewashError, Result};
use crate::volume::{parse_color, Polygon, Roi, StructureSet};

#[derive(Deserialize)]
struct RoiFile {
    color: String,
    contours: serde_json::Map<String, Value>,
}

/// Parse a structure-set JSON file: ROI name -> color + contours keyed by
/// 2-decimal Z.
///
/// Both the ROI order and the contour-key order of the file are preserved;
/// approximate Z lookup depends on scanning keys in their original order.
pub fn read_structure_set(path: &Path) -> Result<StructureSet> {
    let text = fs::read_to_string(path)?;
    parse_structure_set(&text)
}

pub fn parse_structure_set(text: &str) -> Result<StructureSet> {
    let parsed: serde_json::Map<String, Value> = serde_json::from_str(text)?;

    let mut set = StructureSet::new();
    for (name, value) in parsed {
        let roi_file: RoiFile = serde_json::from_value(value)?;
        let color = parse_color(&roi_file.color)?;

        let mut contours = Vec::with_capacity(roi_file.contours.len());
        for (z_key, polys) in roi_file.contours {
            let polygons: Vec<Polygon> = serde_json::from_value(polys).map_err(|e| {
                DosewashError::InvalidManifest(format!("contours[{z_key}] of {name}: {e}"))
            })?;
            contours.push((z_key, polygons));
        }

        set.insert(name, Roi { color, contours });
    }
    Ok(set)
}
