use super::*;

/// Each pixel encodes its own coordinates: `[x, y, 7, 255]`.
fn coordinate_image(width: u32, height: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(width, height, |x, y| image::Rgba([x as u8, y as u8, 7, 255]))
}

#[test]
fn index_1_is_right_half() {
    let img = coordinate_image(100, 50);
    let frame = extract_frame(&img, 50, 50, 1).unwrap();
    assert_eq!((frame.width, frame.height), (50, 50));
    assert_eq!(frame.pixel(0, 0), Some([50, 0, 7, 255]));
    assert_eq!(frame.pixel(49, 49), Some([99, 49, 7, 255]));
}

#[test]
fn index_past_first_row_wraps_to_next_row() {
    let img = coordinate_image(100, 100);
    let frame = extract_frame(&img, 50, 50, 2).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([0, 50, 7, 255]));
    assert_eq!(frame.pixel(10, 20), Some([10, 70, 7, 255]));
}

#[test]
fn index_past_last_row_is_rejected() {
    // 100x50 holds exactly two frames; index 2 would start at row 50.
    let img = coordinate_image(100, 50);
    let err = extract_frame(&img, 50, 50, 2).unwrap_err();
    assert!(matches!(err, OverlayError::InvalidParameter(_)));
}

#[test]
fn rounded_grid_overhang_reads_transparent() {
    // round(150 / 100) = 2 columns, the second one half outside the image.
    let img = coordinate_image(150, 10);
    let frame = extract_frame(&img, 100, 10, 1).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([100, 0, 7, 255]));
    assert_eq!(frame.pixel(49, 9), Some([149, 9, 7, 255]));
    assert_eq!(frame.pixel(50, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.opaque_pixel_count(), 50 * 10);
}

#[test]
fn empty_image_has_no_surface() {
    let img = image::RgbaImage::new(0, 0);
    let err = extract_frame(&img, 1, 1, 0).unwrap_err();
    assert!(matches!(err, OverlayError::RenderSurfaceUnavailable(_)));
}

#[test]
fn zero_sized_frame_is_rejected() {
    let img = coordinate_image(4, 4);
    assert!(matches!(
        extract_frame(&img, 0, 4, 0),
        Err(OverlayError::InvalidParameter(_))
    ));
}
