use image::{Rgba, RgbaImage};

use crate::geometry::PixelMapping;

/// An RGBA output surface (canvas) in some pixel space.
///
/// Overlay renderers draw into rasters sized to the reference (CT) volume's
/// pixel grid; the display surface applies its own pan/zoom on top.
#[derive(Clone, Debug)]
pub struct Rgba8Raster {
    image: RgbaImage,
}

impl Default for Rgba8Raster {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Rgba8Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Reallocate if the size differs, otherwise keep the buffer.
    pub fn ensure_size(&mut self, width: u32, height: u32) {
        if self.image.width() != width || self.image.height() != height {
            self.image = RgbaImage::new(width, height);
        }
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.image.put_pixel(x, y, Rgba(rgba));
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Source-over blend a single pixel onto the raster.
    pub fn blend(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let dst = self.image.get_pixel_mut(x, y);
        dst.0 = source_over(rgba, dst.0);
    }

    /// Source-over composite another raster of the same size onto this one.
    pub fn composite_over(&mut self, src: &Rgba8Raster) {
        debug_assert_eq!(self.width(), src.width());
        debug_assert_eq!(self.height(), src.height());
        for (dst, s) in self.image.pixels_mut().zip(src.image.pixels()) {
            dst.0 = source_over(s.0, dst.0);
        }
    }
}

/// Place `src` into `dst` under a pixel-space mapping, with bilinear
/// smoothing and a post-multiplied global opacity.
///
/// Destination pixels covered by the mapped source rectangle are inverse-
/// mapped into source coordinates and sampled bilinearly, so the overlay
/// stays smooth under both magnification and minification. `opacity` scales
/// the sampled alpha of the whole image, not individual voxels.
pub fn blit_scaled(src: &Rgba8Raster, dst: &mut Rgba8Raster, mapping: PixelMapping, opacity: f64) {
    if src.width() == 0 || src.height() == 0 || mapping.scale_x <= 0.0 || mapping.scale_y <= 0.0 {
        return;
    }
    let opacity = opacity.clamp(0.0, 1.0);

    let x0 = mapping.offset_x.floor().max(0.0) as u32;
    let y0 = mapping.offset_y.floor().max(0.0) as u32;
    let x1 = (mapping.offset_x + src.width() as f64 * mapping.scale_x).ceil();
    let y1 = (mapping.offset_y + src.height() as f64 * mapping.scale_y).ceil();
    let x1 = (x1.max(0.0) as u32).min(dst.width());
    let y1 = (y1.max(0.0) as u32).min(dst.height());

    for dy in y0..y1 {
        for dx in x0..x1 {
            let sx = (dx as f64 + 0.5 - mapping.offset_x) / mapping.scale_x - 0.5;
            let sy = (dy as f64 + 0.5 - mapping.offset_y) / mapping.scale_y - 0.5;
            let mut rgba = sample_bilinear(src, sx, sy);
            rgba[3] = (rgba[3] as f64 * opacity).round() as u8;
            if rgba[3] > 0 {
                dst.blend(dx, dy, rgba);
            }
        }
    }
}

/// Bilinear RGBA sample at a fractional source coordinate. Neighbors
/// outside the source contribute transparent pixels.
fn sample_bilinear(src: &Rgba8Raster, x: f64, y: f64) -> [u8; 4] {
    let xf = x.floor();
    let yf = y.floor();
    let tx = x - xf;
    let ty = y - yf;

    let mut acc = [0.0f64; 4];
    for (ix, iy, w) in [
        (xf, yf, (1.0 - tx) * (1.0 - ty)),
        (xf + 1.0, yf, tx * (1.0 - ty)),
        (xf, yf + 1.0, (1.0 - tx) * ty),
        (xf + 1.0, yf + 1.0, tx * ty),
    ] {
        if ix < 0.0 || iy < 0.0 || ix >= src.width() as f64 || iy >= src.height() as f64 {
            continue;
        }
        let p = src.get(ix as u32, iy as u32);
        for c in 0..4 {
            acc[c] += p[c] as f64 * w;
        }
    }
    [
        acc[0].round() as u8,
        acc[1].round() as u8,
        acc[2].round() as u8,
        acc[3].round() as u8,
    ]
}

fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src[c] as f64;
        let d = dst[c] as f64;
        out[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}
