use crate::foundation::{
    error::{OverlayError, OverlayResult},
    math::round_half_up,
};

/// Straight-alpha RGBA8 pixels, row-major, top-left origin, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new_transparent(width: u32, height: u32) -> OverlayResult<Self> {
        let len = rgba_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> OverlayResult<Self> {
        let buf = Self {
            width,
            height,
            data,
        };
        buf.check_len()?;
        Ok(buf)
    }

    pub fn from_image(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.as_raw().clone(),
        }
    }

    pub fn into_image(self) -> OverlayResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data).ok_or_else(|| {
            OverlayError::invalid_parameter("pixel buffer does not match its dimensions")
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index_of(x, y);
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Fails if `data` does not hold exactly `width * height` RGBA pixels.
    pub fn check_len(&self) -> OverlayResult<()> {
        let len = rgba_len(self.width, self.height)?;
        if self.data.len() != len {
            return Err(OverlayError::invalid_parameter(format!(
                "pixel data is {} bytes, expected {len} for {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Number of pixels whose alpha is non-zero.
    pub fn opaque_pixel_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    pub(crate) fn index_of(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

fn rgba_len(width: u32, height: u32) -> OverlayResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| OverlayError::invalid_parameter("pixel buffer size overflow"))
}

/// A source image cut into equally sized frames, read left to right then top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameGridSpec {
    pub image_width: u32,
    pub image_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl FrameGridSpec {
    pub fn validate(&self) -> OverlayResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(OverlayError::invalid_parameter(
                "frame width/height must be > 0",
            ));
        }
        if self.frame_width > self.image_width || self.frame_height > self.image_height {
            return Err(OverlayError::invalid_parameter(format!(
                "frame {}x{} does not fit in image {}x{}",
                self.frame_width, self.frame_height, self.image_width, self.image_height
            )));
        }
        Ok(())
    }

    /// Frames per row. Rounded, not floored, so a trailing partial column counts as a frame.
    pub fn grid_width(&self) -> u32 {
        round_half_up(f64::from(self.image_width) / f64::from(self.frame_width)) as u32
    }

    /// Top-left corner of `frame_index` in source pixels.
    pub fn frame_origin(&self, frame_index: u32) -> (u64, u64) {
        let grid_width = self.grid_width().max(1);
        let grid_x = u64::from(frame_index % grid_width);
        let grid_y = u64::from(frame_index / grid_width);
        (
            grid_x * u64::from(self.frame_width),
            grid_y * u64::from(self.frame_height),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DitherParams {
    /// Shared jitter seed in `[0, 1)`.
    pub randomness: f64,
    /// Coverage in `(0, 1]`.
    pub percentage: f64,
    #[serde(default)]
    pub offset_x: i64,
    #[serde(default)]
    pub offset_y: i64,
}

impl DitherParams {
    pub fn validate(&self) -> OverlayResult<()> {
        if !self.percentage.is_finite() || self.percentage <= 0.0 || self.percentage > 1.0 {
            return Err(OverlayError::invalid_parameter(format!(
                "dither percentage must be in (0, 1], got {}",
                self.percentage
            )));
        }
        if !self.randomness.is_finite() || !(0.0..1.0).contains(&self.randomness) {
            return Err(OverlayError::invalid_parameter(format!(
                "dither randomness must be in [0, 1), got {}",
                self.randomness
            )));
        }
        Ok(())
    }

    /// Pattern period `round(1 / percentage)`; at least 1 once validated.
    pub fn modulus(&self) -> i64 {
        round_half_up(1.0 / self.percentage) as i64
    }

    pub fn jitter(&self) -> i64 {
        (self.randomness * self.modulus() as f64).floor() as i64
    }
}
