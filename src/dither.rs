//! Ordered, phase-shiftable dithering of a single frame.
//!
//! Every source pixel owns a 3x3 block in the output. A selected pixel is copied verbatim into
//! the centre of its block; everything else stays fully transparent. Selection is periodic with
//! period `m = round(1 / percentage)` along the diagonal `i + 2j`, so exactly one pixel in `m`
//! survives and neighbouring frames with different offsets interleave instead of overlapping.

use crate::foundation::{
    core::{DitherParams, PixelBuffer},
    error::{OverlayError, OverlayResult},
    math::floor_mod,
};

/// Upscale factor between a source frame and its dithered output.
pub const BLOCK: u32 = 3;

/// Whether source pixel `(i, j)` survives under `params`.
///
/// `params` must already be validated; see [`DitherParams::validate`].
pub fn selects(i: i64, j: i64, params: &DitherParams) -> bool {
    let m = i128::from(params.modulus());
    floor_mod(i128::from(i) + i128::from(j) * 2 + phase(params, m), m) == 0
}

/// `offset_x + 2 * offset_y + jitter`, reduced into `[0, m)`. Offsets may be any `i64`, so the
/// sum is taken in `i128`.
fn phase(params: &DitherParams, m: i128) -> i128 {
    let raw = i128::from(params.offset_x)
        + i128::from(params.offset_y) * 2
        + i128::from(params.jitter());
    floor_mod(raw, m)
}

#[tracing::instrument(skip(source, params), fields(src_w = source.width, src_h = source.height))]
pub fn dither(
    source: &PixelBuffer,
    params: &DitherParams,
    frame_width: u32,
    frame_height: u32,
) -> OverlayResult<PixelBuffer> {
    params.validate()?;
    source.check_len()?;
    if frame_width != source.width || frame_height != source.height {
        return Err(OverlayError::invalid_parameter(format!(
            "frame size {frame_width}x{frame_height} does not match source {}x{}",
            source.width, source.height
        )));
    }

    let out_width = frame_width
        .checked_mul(BLOCK)
        .ok_or_else(|| OverlayError::invalid_parameter("dithered width overflow"))?;
    let out_height = frame_height
        .checked_mul(BLOCK)
        .ok_or_else(|| OverlayError::invalid_parameter("dithered height overflow"))?;
    let mut out = PixelBuffer::new_transparent(out_width, out_height)?;

    let m = i128::from(params.modulus());
    let base = phase(params, m);
    for j in 0..frame_height {
        let row_key = i128::from(j) * 2 + base;
        for i in 0..frame_width {
            if floor_mod(i128::from(i) + row_key, m) != 0 {
                continue;
            }
            let src = source.index_of(i, j);
            let dst = out.index_of(i * BLOCK + 1, j * BLOCK + 1);
            out.data[dst..dst + 4].copy_from_slice(&source.data[src..src + 4]);
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../tests/unit/dither.rs"]
mod tests;
