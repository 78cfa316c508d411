use thiserror::Error;

#[derive(Error, Debug)]
pub enum DosewashError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid volume data: expected {expected} samples, got {actual}")]
    InvalidVolume { expected: usize, actual: usize },

    #[error("Invalid pixel spacing: {dx}x{dy}")]
    InvalidSpacing { dx: f64, dy: f64 },

    #[error("Slice index {index} out of range (total: {total})")]
    SliceIndexOutOfRange { index: usize, total: usize },

    #[error("Unknown dose set: {0}")]
    UnknownDoseId(String),

    #[error("Unknown structure set: {0}")]
    UnknownStructId(String),

    #[error("Invalid ROI color: {0}")]
    InvalidColor(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DosewashError>;
