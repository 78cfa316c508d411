pub mod dose;
pub mod raster;
pub mod structures;

pub use dose::{render_dose_overlay, DoseOverlay};
pub use raster::Rgba8Raster;
pub use structures::{render_structure_overlay, RoiStroke, StructureOverlay};
