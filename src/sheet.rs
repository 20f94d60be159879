use rayon::prelude::*;

use crate::{
    dither::dither,
    foundation::{
        core::{DitherParams, PixelBuffer},
        error::OverlayResult,
    },
    frame::extract_frame,
};

/// Extracts and dithers frames `0..frame_count` of a sprite sheet.
///
/// Frames are processed in parallel; the result is in frame order and identical to running
/// [`extract_frame`] then [`dither`] on each index in turn. The first failing frame's error is
/// returned.
#[tracing::instrument(skip(image, params), fields(image_w = image.width(), image_h = image.height()))]
pub fn render_sheet(
    image: &image::RgbaImage,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    params: &DitherParams,
) -> OverlayResult<Vec<PixelBuffer>> {
    params.validate()?;
    (0..frame_count)
        .into_par_iter()
        .map(|index| {
            let frame = extract_frame(image, frame_width, frame_height, index)?;
            dither(&frame, params, frame_width, frame_height)
        })
        .collect()
}
