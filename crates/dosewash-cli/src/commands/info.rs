use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dosewash_core::io::case::CaseSource;
use dosewash_core::io::structures::read_structure_set;

#[derive(Args)]
pub struct InfoArgs {
    /// Case directory (contains manifest.json)
    pub case_dir: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = CaseSource::new(&args.case_dir);
    let manifest = source
        .load_manifest()
        .with_context(|| format!("Failed to read manifest in {}", args.case_dir.display()))?;

    // ROI counts come from the structure files themselves.
    let mut struct_rois = Vec::new();
    for (id, filename) in &manifest.structs {
        let count = read_structure_set(&args.case_dir.join(filename))
            .map(|set| set.len())
            .unwrap_or(0);
        struct_rois.push((id.clone(), count));
    }

    crate::summary::print_case_summary(&manifest, &struct_rois);

    Ok(())
}
