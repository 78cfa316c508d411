/// Maximum |z_ct - z_dose| (world units, mm) for a dose slice to count as a
/// match. Dose grids are typically coarser than CT, so this is generous.
pub const DOSE_Z_TOLERANCE_MM: f64 = 2.0;

/// Maximum |z_ct - z_contour| (mm) for approximate contour key lookup.
/// Contours are exported at CT slice planes, so only float noise is allowed.
pub const STRUCT_Z_TOLERANCE_MM: f64 = 0.1;

/// Normalization dose (Gy) used for relative display when no prescription
/// is known.
pub const DEFAULT_NORMALIZATION_DOSE: f64 = 60.0;

/// Per-voxel alpha of the dose wash before the global opacity multiply.
pub const DOSE_OVERLAY_ALPHA: u8 = 200;

/// Upper slider bound in relative mode (percent of normalization dose).
pub const RELATIVE_SLIDER_MAX: f64 = 120.0;

/// Headroom factor over the volume maximum for the absolute slider bound.
pub const ABSOLUTE_SLIDER_HEADROOM: f64 = 1.1;

/// Stroke width of contour outlines in reference pixel units at zoom 1.0.
pub const CONTOUR_STROKE_WIDTH: f64 = 2.0;

/// Minimum dose-slice pixel count (rows*cols) to use row-level Rayon
/// parallelism when colorizing.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default CT display window width (HU), used by offline hosts.
pub const DEFAULT_WINDOW_WIDTH: f64 = 400.0;

/// Default CT display window center (HU), used by offline hosts.
pub const DEFAULT_WINDOW_CENTER: f64 = 40.0;
