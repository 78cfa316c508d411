use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DosewashError, Result};
use crate::io::manifest::{load_case_list, CaseManifest};
use crate::io::structures::read_structure_set;
use crate::io::volume_bin::{read_ct_volume, read_dose_volume};
use crate::volume::{DoseMeta, StructureSet, Volume};

/// Loader for one exported case directory (`manifest.json`, `ct.bin`, dose
/// `.bin` files, structure `.json` files).
#[derive(Clone, Debug)]
pub struct CaseSource {
    dir: PathBuf,
}

impl CaseSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_manifest(&self) -> Result<CaseManifest> {
        CaseManifest::load(&self.dir.join("manifest.json"))
    }

    /// Decode `ct.bin` against the manifest's CT geometry.
    pub fn load_ct(
        &self,
        manifest: &CaseManifest,
        progress: impl FnMut(usize, usize),
    ) -> Result<Volume> {
        let volume = read_ct_volume(&self.dir.join("ct.bin"), &manifest.ct, progress)?;
        info!(
            slices = volume.slice_count(),
            rows = volume.rows(),
            cols = volume.cols(),
            "loaded CT volume"
        );
        Ok(volume)
    }

    /// Decode one dose set by manifest id.
    pub fn load_dose(
        &self,
        manifest: &CaseManifest,
        id: &str,
        progress: impl FnMut(usize, usize),
    ) -> Result<(Volume, DoseMeta)> {
        let entry = manifest
            .doses
            .get(id)
            .ok_or_else(|| DosewashError::UnknownDoseId(id.to_string()))?;
        let volume = read_dose_volume(&self.dir.join(&entry.filename), entry, progress)?;
        let meta = DoseMeta {
            max_dose: entry.max_dose,
            prescription: entry.prescription,
        };
        info!(id, max_dose = meta.max_dose, "loaded dose volume");
        Ok((volume, meta))
    }

    /// Parse one structure set by manifest id.
    pub fn load_structures(&self, manifest: &CaseManifest, id: &str) -> Result<StructureSet> {
        let filename = manifest
            .structs
            .get(id)
            .ok_or_else(|| DosewashError::UnknownStructId(id.to_string()))?;
        let set = read_structure_set(&self.dir.join(filename))?;
        info!(id, rois = set.len(), "loaded structure set");
        Ok(set)
    }
}

/// Enumerate case directories under an export root.
///
/// Prefers the backend's `cases.json` listing when present, otherwise scans
/// for subdirectories containing a `manifest.json`.
pub fn list_cases(root: &Path) -> Result<Vec<String>> {
    let listing = root.join("cases.json");
    if listing.is_file() {
        return load_case_list(&listing);
    }

    let mut cases = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.path().join("manifest.json").is_file() {
            cases.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    cases.sort();
    Ok(cases)
}
