use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DosewashError, Result};

/// `manifest.json` written by the export backend: CT geometry plus the
/// available dose and structure sets of one case.
#[derive(Clone, Debug, Deserialize)]
pub struct CaseManifest {
    #[serde(default)]
    pub id: Option<String>,
    pub ct: CtEntry,
    #[serde(default)]
    pub doses: BTreeMap<String, DoseEntry>,
    #[serde(default)]
    pub structs: BTreeMap<String, String>,
}

/// CT volume geometry. `origin` may carry a third (Z) component in exports;
/// only X/Y are used here, Z per slice comes from `z_positions`.
#[derive(Clone, Debug, Deserialize)]
pub struct CtEntry {
    pub rows: usize,
    pub cols: usize,
    pub count: usize,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub z_positions: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DoseEntry {
    pub filename: String,
    pub rows: usize,
    pub cols: usize,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub z_positions: Vec<f64>,
    pub max_dose: f64,
    #[serde(default)]
    pub prescription: Option<f64>,
}

impl CaseManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let manifest: CaseManifest = serde_json::from_str(&text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        validate_geometry("ct", &self.ct.spacing, &self.ct.origin)?;
        if self.ct.z_positions.len() != self.ct.count {
            return Err(DosewashError::InvalidManifest(format!(
                "ct: {} z_positions for count {}",
                self.ct.z_positions.len(),
                self.ct.count
            )));
        }
        for (id, dose) in &self.doses {
            validate_geometry(id, &dose.spacing, &dose.origin)?;
        }
        Ok(())
    }
}

fn validate_geometry(what: &str, spacing: &[f64], origin: &[f64]) -> Result<()> {
    if spacing.len() < 2 || origin.len() < 2 {
        return Err(DosewashError::InvalidManifest(format!(
            "{what}: spacing/origin need at least 2 components"
        )));
    }
    if spacing[0] <= 0.0 || spacing[1] <= 0.0 {
        return Err(DosewashError::InvalidSpacing {
            dx: spacing[0],
            dy: spacing[1],
        });
    }
    Ok(())
}

/// First two components of a manifest origin/spacing vector.
pub fn xy(v: &[f64]) -> [f64; 2] {
    [v[0], v[1]]
}

/// Load the case-id list (`cases.json`) the backend writes next to the case
/// directories.
pub fn load_case_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
