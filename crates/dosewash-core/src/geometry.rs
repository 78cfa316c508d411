use crate::volume::Volume;

/// Axis-aligned affine mapping from one volume's pixel space into a
/// reference volume's pixel space.
///
/// Both volumes are assumed axis-aligned in the same world frame; no
/// rotation or shear is modeled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelMapping {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PixelMapping {
    pub const IDENTITY: PixelMapping = PixelMapping {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Map a source-pixel coordinate into reference pixels.
    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.offset_x + p[0] * self.scale_x,
            self.offset_y + p[1] * self.scale_y,
        ]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Compute the pixel-space mapping of `volume` into `reference`.
///
/// `refPixel = (origin - refOrigin) / refSpacing + srcPixel * (spacing / refSpacing)`
/// per axis. Zero reference spacing is a configuration error rejected at
/// volume construction, so no error path exists here.
pub fn pixel_mapping(volume: &Volume, reference: &Volume) -> PixelMapping {
    pixel_mapping_raw(volume.origin, volume.spacing, reference.origin, reference.spacing)
}

/// Same as [`pixel_mapping`], from bare origin/spacing pairs.
pub fn pixel_mapping_raw(
    origin: [f64; 2],
    spacing: [f64; 2],
    ref_origin: [f64; 2],
    ref_spacing: [f64; 2],
) -> PixelMapping {
    PixelMapping {
        offset_x: (origin[0] - ref_origin[0]) / ref_spacing[0],
        offset_y: (origin[1] - ref_origin[1]) / ref_spacing[1],
        scale_x: spacing[0] / ref_spacing[0],
        scale_y: spacing[1] / ref_spacing[1],
    }
}

/// Convert a world (x, y) point into a volume's pixel coordinates.
pub fn world_to_pixel(world: [f64; 2], origin: [f64; 2], spacing: [f64; 2]) -> [f64; 2] {
    [
        (world[0] - origin[0]) / spacing[0],
        (world[1] - origin[1]) / spacing[1],
    ]
}
