mod common;

use stackcrop::detection::contours::find_regions;
use stackcrop::detection::crop::apply_bounding_box;
use stackcrop::detection::segmentation::segment_frame;

use common::*;

fn detect(frame: &Frame<u8>) -> Result<BoundingBox, CropError> {
    FrameDetector::default().detect(frame)
}

#[test]
fn test_centered_square_box() -> anyhow::Result<()> {
    let seg = segment_frame(&centered_square_frame(), 14);
    let b = detect(&seg)?;

    assert_eq!(b.as_tuple(), (22, 22, 41, 41));
    for (got, want) in [(b.x1, 22), (b.y1, 22), (b.x2, 42), (b.y2, 42)] {
        assert!((got - want).abs() <= 1);
    }
    Ok(())
}

#[test]
fn test_blank_frame_has_no_region() {
    let err = detect(&Frame::<u8>::new(SIZE, SIZE)).unwrap_err();
    assert!(matches!(err, CropError::NoRegionFound { frame: None }));
}

#[test]
fn test_small_speck_is_filtered() {
    // 5x5 square encloses 16 px, below the 100 px floor
    let err = detect(&mask_with_rect(SIZE, SIZE, (30, 30, 34, 34))).unwrap_err();
    assert!(err.is_no_region());
}

#[test]
fn test_whole_frame_region_is_filtered() {
    let err = detect(&mask_with_rect(SIZE, SIZE, (0, 0, SIZE - 1, SIZE - 1))).unwrap_err();
    assert!(err.is_no_region());
}

#[test]
fn test_off_center_region_is_rejected() {
    let err = detect(&mask_with_rect(SIZE, SIZE, (0, 0, 19, 19))).unwrap_err();
    assert!(err.is_no_region());
}

#[test]
fn test_centered_region_wins_over_corner_region() -> anyhow::Result<()> {
    let mut mask = mask_with_rect(SIZE, SIZE, (24, 24, 39, 39));
    for y in 0..15 {
        for x in 0..15 {
            mask.put_pixel(x, y, image::Luma([255]));
        }
    }
    assert_eq!(find_regions(&mask).len(), 2);
    assert_eq!(detect(&mask)?.as_tuple(), (24, 24, 39, 39));
    Ok(())
}

#[test]
fn test_ring_keeps_outer_and_hole_borders() -> anyhow::Result<()> {
    let mut mask = mask_with_rect(SIZE, SIZE, (12, 12, 51, 51));
    for y in 22..=41 {
        for x in 22..=41 {
            mask.put_pixel(x, y, image::Luma([0]));
        }
    }
    assert_eq!(find_regions(&mask).len(), 2);

    // the outer border starts at (12, 12), farther from the center than the hole's first point
    let b = detect(&mask)?;
    assert!(b.x1 >= 21 && b.x2 <= 42, "box {:?}", b.as_tuple());
    Ok(())
}

#[test]
fn test_staircase_triangle_is_accepted() -> anyhow::Result<()> {
    let mask = triangle_frame(0, 255);
    let regions = find_regions(&mask);
    assert_eq!(regions.len(), 1);

    // the centroid of the turning points sits within reach of the center
    let (mx, my) = regions[0].centroid();
    let reach = (6.4f64.powi(2) * 2.0).sqrt();
    assert!(((mx - 32.0).powi(2) + (my - 32.0).powi(2)).sqrt() < reach, "centroid ({mx}, {my})");

    assert_eq!(detect(&mask)?.as_tuple(), (7, 17, 47, 37));
    Ok(())
}

#[test]
fn test_segmented_triangle_box() -> anyhow::Result<()> {
    let seg = segment_frame(&triangle_frame(BACKGROUND, FOREGROUND), 15);
    assert_eq!(detect(&seg)?.as_tuple(), (7, 17, 47, 37));
    Ok(())
}

#[test]
fn test_boxes_stay_inside_frame() -> anyhow::Result<()> {
    for frame in drifting_volume().frames() {
        let b = detect(&segment_frame(frame, 14))?;
        assert!(b.is_valid());
        assert!(0 <= b.x1 && b.x1 <= b.x2 && b.x2 <= SIZE as i32 - 1);
        assert!(0 <= b.y1 && b.y1 <= b.y2 && b.y2 <= SIZE as i32 - 1);
    }
    Ok(())
}

#[test]
fn test_redetect_on_cropped_frame_covers_it() -> anyhow::Result<()> {
    let seg = Volume::new(vec![segment_frame(&centered_square_frame(), 14)])?;
    let b = detect(&seg.frames()[0])?;
    let (cropped, _) = apply_bounding_box(&seg, &b, 2)?;

    let frame = &cropped.frames()[0];
    let again = detect(frame)?;
    let (w, h) = (frame.width() as f64, frame.height() as f64);
    assert!(again.width() as f64 >= 0.8 * (w - 1.0), "box {:?} in {w}x{h}", again.as_tuple());
    assert!(again.height() as f64 >= 0.8 * (h - 1.0));
    Ok(())
}
