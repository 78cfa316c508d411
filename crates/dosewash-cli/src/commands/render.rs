use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use image::{ImageFormat, Rgba, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};

use dosewash_core::consts::{DEFAULT_WINDOW_CENTER, DEFAULT_WINDOW_WIDTH};
use dosewash_core::engine::{EngineConfig, OverlayEngine};
use dosewash_core::io::case::CaseSource;
use dosewash_core::overlay::raster::Rgba8Raster;
use dosewash_core::units::DoseUnit;
use dosewash_core::viewport::ViewportKey;
use dosewash_core::volume::Volume;

#[derive(Clone, ValueEnum)]
pub enum UnitArg {
    Gy,
    Percent,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Case directory (contains manifest.json)
    pub case_dir: PathBuf,

    /// CT slice index (defaults to the middle slice)
    #[arg(long)]
    pub slice: Option<usize>,

    /// Dose set id to overlay
    #[arg(long)]
    pub dose: Option<String>,

    /// Structure set id to overlay
    #[arg(long)]
    pub structures: Option<String>,

    /// Threshold minimum, in the active unit
    #[arg(long)]
    pub min: Option<f64>,

    /// Threshold maximum, in the active unit
    #[arg(long)]
    pub max: Option<f64>,

    /// Dose display unit
    #[arg(long, value_enum, default_value = "gy")]
    pub unit: UnitArg,

    /// Normalization dose (Gy) for percent mode; overrides the prescription
    #[arg(long)]
    pub norm: Option<f64>,

    /// Overlay opacity (0-1)
    #[arg(long, default_value = "0.5")]
    pub opacity: f64,

    /// CT display window width (HU)
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    pub window: f64,

    /// CT display window center (HU)
    #[arg(long, default_value_t = DEFAULT_WINDOW_CENTER)]
    pub level: f64,

    /// Hide an ROI by name (repeatable)
    #[arg(long)]
    pub hide: Vec<String>,

    /// Engine config TOML (tolerances, default normalization)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "slice.png")]
    pub output: PathBuf,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str::<EngineConfig>(&text)
                .with_context(|| format!("Invalid engine config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let source = CaseSource::new(&args.case_dir);
    let pb = progress_bar("Loading CT")?;
    let mut engine = OverlayEngine::open_case_with_progress(source, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .with_context(|| format!("Failed to open case {}", args.case_dir.display()))?;
    pb.finish_and_clear();

    match args.unit {
        UnitArg::Gy => engine.set_unit(DoseUnit::Absolute),
        UnitArg::Percent => engine.set_unit(DoseUnit::Relative),
    }

    if let Some(id) = &args.dose {
        let pb = progress_bar("Loading dose")?;
        engine
            .select_dose_with_progress(ViewportKey::Left, Some(id), |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .with_context(|| format!("Failed to load dose set '{id}'"))?;
        pb.finish_and_clear();
    }

    // Applied after the dose load so an explicit --norm outlives the
    // prescription-wins-on-load reset.
    if let Some(norm) = args.norm {
        engine.set_normalization_dose(norm);
    }
    if let (Some(min), Some(max)) = (args.min, args.max) {
        engine.set_threshold(min, max);
    }

    if let Some(id) = &args.structures {
        engine
            .select_structure(ViewportKey::Left, Some(id))
            .with_context(|| format!("Failed to load structure set '{id}'"))?;
    }
    for name in &args.hide {
        engine.set_roi_visible(ViewportKey::Left, name, false);
    }

    engine.set_opacity(args.opacity);

    let slice_index = args.slice.unwrap_or(engine.session().slice_index);
    engine.render_slice(slice_index)?;

    let ct = engine
        .session()
        .ct
        .as_ref()
        .expect("CT volume present after open_case");
    let slice_total = ct.slice_count();
    let slice_z = ct.z_at(slice_index)?;

    let mut composed = window_level_base(ct, slice_index, args.window, args.level)?;
    let vp = engine.viewport(ViewportKey::Left);
    composed.composite_over(&vp.dose_canvas);
    composed.composite_over(&vp.struct_canvas);

    composed
        .as_image()
        .save_with_format(&args.output, ImageFormat::Png)?;
    println!("Saved to {}", args.output.display());

    let (rois_visible, rois_total) = match &vp.struct_data {
        Some(set) => (
            set.names().filter(|n| vp.is_roi_visible(n)).count(),
            set.len(),
        ),
        None => (0, 0),
    };
    crate::summary::print_render_summary(&crate::summary::RenderSummary {
        slice_index,
        slice_total,
        slice_z,
        dose_id: vp.dose_id.as_deref(),
        dose_slice: engine.resolve_dose_slice(ViewportKey::Left),
        unit: engine.session().display.unit(),
        effective_range: engine.session().display.effective_range(),
        rois_visible,
        rois_total,
    });

    Ok(())
}

/// Grayscale window/level pass over one CT slice.
///
/// The interactive host owns this concern; the offline renderer needs a base
/// image underneath the overlays, so a plain linear window is applied here.
fn window_level_base(ct: &Volume, index: usize, window: f64, level: f64) -> Result<Rgba8Raster> {
    if window <= 0.0 {
        bail!("window width must be > 0");
    }
    let slice = ct.slice(index)?;
    let lo = level - window / 2.0;

    let mut img = RgbaImage::new(ct.cols() as u32, ct.rows() as u32);
    for (r, row) in slice.outer_iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            let g = (((*v as f64 - lo) / window).clamp(0.0, 1.0) * 255.0) as u8;
            img.put_pixel(c as u32, r as u32, Rgba([g, g, g, 255]));
        }
    }
    Ok(Rgba8Raster::from_image(img))
}

fn progress_bar(label: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!("{label} [{{bar:40}}] {{pos}}/{{len}}"))?
            .progress_chars("=> "),
    );
    Ok(pb)
}
