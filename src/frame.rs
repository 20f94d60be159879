use crate::foundation::{
    core::{FrameGridSpec, PixelBuffer},
    error::{OverlayError, OverlayResult},
};

/// Copies frame `frame_index` out of a sprite sheet.
///
/// The grid width is `round(image_width / frame_width)`, so a sheet whose width is not an exact
/// multiple of the frame width gains a trailing partial column. Pixels of such a frame that fall
/// past the right or bottom edge of the image read as transparent. A frame whose top-left corner
/// lies outside the image is rejected with [`OverlayError::InvalidParameter`]; the index is never
/// clamped or wrapped.
#[tracing::instrument(skip(image), fields(image_w = image.width(), image_h = image.height()))]
pub fn extract_frame(
    image: &image::RgbaImage,
    frame_width: u32,
    frame_height: u32,
    frame_index: u32,
) -> OverlayResult<PixelBuffer> {
    let (image_width, image_height) = image.dimensions();
    if image_width == 0 || image_height == 0 {
        return Err(OverlayError::render_surface_unavailable(
            "source image has no pixels",
        ));
    }

    let grid = FrameGridSpec {
        image_width,
        image_height,
        frame_width,
        frame_height,
    };
    grid.validate()?;

    let (origin_x, origin_y) = grid.frame_origin(frame_index);
    if origin_x >= u64::from(image_width) || origin_y >= u64::from(image_height) {
        return Err(OverlayError::invalid_parameter(format!(
            "frame {frame_index} starts at ({origin_x}, {origin_y}), outside the {image_width}x{image_height} image"
        )));
    }
    // Both origins are below the image size here, so they fit in u32.
    let (origin_x, origin_y) = (origin_x as u32, origin_y as u32);

    let mut out = PixelBuffer::new_transparent(frame_width, frame_height)?;
    let copy_w = frame_width.min(image_width - origin_x) as usize;
    let copy_h = frame_height.min(image_height - origin_y);
    let src = image.as_raw();
    let src_stride = image_width as usize * 4;
    let dst_stride = frame_width as usize * 4;

    for row in 0..copy_h {
        let src_start = (origin_y + row) as usize * src_stride + origin_x as usize * 4;
        let dst_start = row as usize * dst_stride;
        out.data[dst_start..dst_start + copy_w * 4]
            .copy_from_slice(&src[src_start..src_start + copy_w * 4]);
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../tests/unit/frame.rs"]
mod tests;
