use console::Style;
use dosewash_core::io::manifest::CaseManifest;
use dosewash_core::units::DoseUnit;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    accent: Style,
    dim: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            accent: Style::new().green(),
            dim: Style::new().dim().yellow(),
        }
    }
}

pub fn print_case_summary(manifest: &CaseManifest, struct_rois: &[(String, usize)]) {
    let s = Styles::new();

    println!();
    println!(
        "  {}",
        s.title
            .apply_to(manifest.id.as_deref().unwrap_or("Case summary"))
    );
    println!();

    let ct = &manifest.ct;
    println!(
        "  {:<14}{}",
        s.label.apply_to("CT grid"),
        s.value
            .apply_to(format!("{}x{} x {} slices", ct.rows, ct.cols, ct.count))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Spacing"),
        s.value
            .apply_to(format!("{:.3} x {:.3} mm", ct.spacing[0], ct.spacing[1]))
    );
    if let (Some(first), Some(last)) = (ct.z_positions.first(), ct.z_positions.last()) {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Z range"),
            s.value.apply_to(format!("{first:.2} .. {last:.2} mm"))
        );
    }

    println!();
    println!("  {}", s.title.apply_to("Dose sets"));
    if manifest.doses.is_empty() {
        println!("  {}", s.dim.apply_to("(none)"));
    }
    for (id, dose) in &manifest.doses {
        let rx = dose
            .prescription
            .map(|p| format!("Rx {p:.1} Gy"))
            .unwrap_or_else(|| "no prescription".to_string());
        println!(
            "  {:<14}{}  {}",
            s.accent.apply_to(id),
            s.value.apply_to(format!(
                "{}x{} x {} slices, max {:.1} Gy",
                dose.rows,
                dose.cols,
                dose.z_positions.len(),
                dose.max_dose
            )),
            s.label.apply_to(rx)
        );
    }

    println!();
    println!("  {}", s.title.apply_to("Structure sets"));
    if struct_rois.is_empty() {
        println!("  {}", s.dim.apply_to("(none)"));
    }
    for (id, rois) in struct_rois {
        println!(
            "  {:<14}{}",
            s.accent.apply_to(id),
            s.value.apply_to(format!("{rois} ROI(s)"))
        );
    }
    println!();
}

/// Everything the render command reports after writing its PNG.
pub struct RenderSummary<'a> {
    pub slice_index: usize,
    pub slice_total: usize,
    pub slice_z: f64,
    pub dose_id: Option<&'a str>,
    pub dose_slice: Option<usize>,
    pub unit: DoseUnit,
    pub effective_range: (f64, f64),
    pub rois_visible: usize,
    pub rois_total: usize,
}

pub fn print_render_summary(summary: &RenderSummary<'_>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Render"));
    println!(
        "  {:<14}{}",
        s.label.apply_to("CT slice"),
        s.value.apply_to(format!(
            "{} / {} (z {:.2})",
            summary.slice_index,
            summary.slice_total - 1,
            summary.slice_z
        ))
    );

    match summary.dose_id {
        Some(id) => {
            let resolved = match summary.dose_slice {
                Some(i) => format!("dose slice {i}"),
                None => "no dose slice within tolerance".to_string(),
            };
            println!(
                "  {:<14}{}  {}",
                s.label.apply_to("Dose"),
                s.accent.apply_to(id),
                s.value.apply_to(resolved)
            );
            let unit_name = match summary.unit {
                DoseUnit::Absolute => "Gy",
                DoseUnit::Relative => "%",
            };
            println!(
                "  {:<14}{}",
                s.label.apply_to("Threshold"),
                s.value.apply_to(format!(
                    "{:.1} .. {:.1} Gy effective ({unit_name} mode)",
                    summary.effective_range.0, summary.effective_range.1
                ))
            );
        }
        None => println!("  {:<14}{}", s.label.apply_to("Dose"), s.dim.apply_to("none")),
    }

    if summary.rois_total > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Structures"),
            s.value.apply_to(format!(
                "{} of {} ROI(s) visible",
                summary.rois_visible, summary.rois_total
            ))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Structures"),
            s.dim.apply_to("none")
        );
    }
    println!();
}
