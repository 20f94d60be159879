use super::*;

fn opaque_source(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for j in 0..height {
        for i in 0..width {
            data.extend_from_slice(&[i as u8, j as u8, 200, 255]);
        }
    }
    PixelBuffer::from_rgba8(width, height, data).unwrap()
}

fn params(percentage: f64, offset_x: i64, offset_y: i64) -> DitherParams {
    DitherParams {
        randomness: 0.0,
        percentage,
        offset_x,
        offset_y,
    }
}

/// Source coordinates whose block centre is non-transparent in `out`.
fn selected_cells(out: &PixelBuffer) -> Vec<(u32, u32)> {
    let mut cells = Vec::new();
    for j in 0..out.height / BLOCK {
        for i in 0..out.width / BLOCK {
            if out.pixel(i * BLOCK + 1, j * BLOCK + 1).unwrap()[3] != 0 {
                cells.push((i, j));
            }
        }
    }
    cells
}

#[test]
fn output_is_three_times_larger() {
    let src = opaque_source(5, 7);
    let out = dither(&src, &params(1.0, 0, 0), 5, 7).unwrap();
    assert_eq!((out.width, out.height), (15, 21));
}

#[test]
fn identical_inputs_give_identical_bytes() {
    let src = opaque_source(17, 9);
    let p = DitherParams {
        randomness: 0.73,
        percentage: 0.2,
        offset_x: -3,
        offset_y: 11,
    };
    let a = dither(&src, &p, 17, 9).unwrap();
    let b = dither(&src, &p, 17, 9).unwrap();
    assert_eq!(a, b);
}

#[test]
fn density_is_exact_when_width_is_a_multiple_of_m() {
    let src = opaque_source(12, 8);
    for (percentage, m) in [(1.0, 1usize), (0.5, 2), (0.34, 3), (0.25, 4), (1.0 / 6.0, 6)] {
        let out = dither(&src, &params(percentage, 0, 0), 12, 8).unwrap();
        assert_eq!(out.opaque_pixel_count(), 12 * 8 / m, "percentage={percentage}");
    }
}

#[test]
fn selected_pixels_land_in_block_centres_verbatim() {
    let src = opaque_source(6, 4);
    let out = dither(&src, &params(0.25, 0, 0), 6, 4).unwrap();

    for y in 0..out.height {
        for x in 0..out.width {
            let px = out.pixel(x, y).unwrap();
            let centre = x % BLOCK == 1 && y % BLOCK == 1;
            if !centre {
                assert_eq!(px, [0, 0, 0, 0], "({x}, {y}) should be transparent");
                continue;
            }
            let (i, j) = (x / BLOCK, y / BLOCK);
            if selects(i64::from(i), i64::from(j), &params(0.25, 0, 0)) {
                assert_eq!(px, src.pixel(i, j).unwrap());
            } else {
                assert_eq!(px, [0, 0, 0, 0]);
            }
        }
    }
}

#[test]
fn first_row_pattern_for_quarter_coverage() {
    let src = opaque_source(8, 2);
    let out = dither(&src, &params(0.25, 0, 0), 8, 2).unwrap();
    // Row 0 keeps i = 0, 4; row 1 (shifted by 2) keeps i = 2, 6.
    assert_eq!(selected_cells(&out), vec![(0, 0), (4, 0), (2, 1), (6, 1)]);
}

#[test]
fn negative_offsets_use_floor_modulo() {
    let src = opaque_source(8, 8);
    let negative = dither(&src, &params(0.25, -5, 0), 8, 8).unwrap();
    let shifted = dither(&src, &params(0.25, -5 + 8, 0), 8, 8).unwrap();
    assert_eq!(negative, shifted);

    // (i - 5) mod 4 == 0 on row 0 picks i = 1 and i = 5.
    let row0: Vec<u32> = selected_cells(&negative)
        .into_iter()
        .filter(|&(_, j)| j == 0)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(row0, vec![1, 5]);

    let neg_y = dither(&src, &params(0.25, 0, -7), 8, 8).unwrap();
    let pos_y = dither(&src, &params(0.25, 0, 1), 8, 8).unwrap();
    assert_eq!(neg_y, pos_y);
}

#[test]
fn consecutive_offsets_partition_the_frame() {
    let (w, h) = (9u32, 5u32);
    let src = opaque_source(w, h);
    let mut seen = vec![0u32; (w * h) as usize];
    for offset_x in 0..3 {
        let out = dither(&src, &params(0.34, offset_x, 0), w, h).unwrap();
        for (i, j) in selected_cells(&out) {
            seen[(j * w + i) as usize] += 1;
        }
    }
    assert!(seen.iter().all(|&n| n == 1));
}

#[test]
fn randomness_shifts_phase() {
    let src = opaque_source(8, 1);
    let base = dither(&src, &params(0.25, 1, 0), 8, 1).unwrap();
    let jittered = dither(
        &src,
        &DitherParams {
            randomness: 0.3, // floor(0.3 * 4) = 1
            ..params(0.25, 0, 0)
        },
        8,
        1,
    )
    .unwrap();
    assert_eq!(base, jittered);
}

#[test]
fn transparent_source_pixels_stay_transparent() {
    let src = PixelBuffer::new_transparent(4, 4).unwrap();
    let out = dither(&src, &params(1.0, 0, 0), 4, 4).unwrap();
    assert_eq!(out.opaque_pixel_count(), 0);
}

#[test]
fn out_of_range_percentage_is_rejected() {
    let src = opaque_source(2, 2);
    for percentage in [0.0, -0.5, 1.5] {
        let err = dither(&src, &params(percentage, 0, 0), 2, 2).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidParameter(_)));
    }
}

#[test]
fn frame_size_must_match_source() {
    let src = opaque_source(2, 2);
    assert!(matches!(
        dither(&src, &params(1.0, 0, 0), 3, 2),
        Err(OverlayError::InvalidParameter(_))
    ));
}

#[test]
fn extreme_offsets_do_not_overflow() {
    let src = opaque_source(2, 2);
    let big = i64::MAX / 2 + 1;
    // m = 2 and `big` is even, so it is equivalent to an offset of 0.
    let far = dither(&src, &params(0.5, 0, big), 2, 2).unwrap();
    let near = dither(&src, &params(0.5, 0, 0), 2, 2).unwrap();
    assert_eq!(far, near);

    let src = opaque_source(6, 3);
    let lo = dither(&src, &params(0.34, i64::MIN, i64::MIN), 6, 3).unwrap();
    let hi = dither(&src, &params(0.34, i64::MAX, i64::MAX), 6, 3).unwrap();
    assert_eq!(lo.opaque_pixel_count(), 6);
    assert_eq!(hi.opaque_pixel_count(), 6);
    // i64::MAX = 3 (mod 4), i64::MIN = 0 (mod 4).
    assert!(selects(i64::MAX, i64::MIN, &params(0.25, 1, 0)));
    assert!(!selects(i64::MAX, i64::MIN, &params(0.25, i64::MAX, i64::MIN)));
}

#[test]
fn hand_built_buffer_with_wrong_length_is_rejected() {
    let src = PixelBuffer {
        width: 4,
        height: 4,
        data: vec![255; 10],
    };
    let err = dither(&src, &params(1.0, 0, 0), 4, 4).unwrap_err();
    assert!(matches!(err, OverlayError::InvalidParameter(_)));
}
