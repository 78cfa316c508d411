use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dosewash_core::io::case::list_cases;

#[derive(Args)]
pub struct CasesArgs {
    /// Export root containing case directories (or a cases.json listing)
    pub root: PathBuf,
}

pub fn run(args: &CasesArgs) -> Result<()> {
    let cases = list_cases(&args.root)
        .with_context(|| format!("Failed to list cases under {}", args.root.display()))?;

    if cases.is_empty() {
        println!("No cases found under {}", args.root.display());
        return Ok(());
    }

    for case in &cases {
        println!("{case}");
    }
    println!("({} case(s))", cases.len());

    Ok(())
}
