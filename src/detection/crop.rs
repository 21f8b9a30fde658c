use image::imageops;
use rayon::prelude::*;

use crate::error::{CropError, Result};
use crate::models::{BoundingBox, CropWindow, Intensity, Volume};

/// Grow `bbox` by `margin` on every side and clamp it to a `width` x `height` frame.
///
/// The near corner clamps to 0. The far corner clamps to `width - 1` /
/// `height - 1` and is used as an exclusive bound when slicing.
pub fn crop_window(bbox: &BoundingBox, margin: u32, width: u32, height: u32) -> Result<CropWindow> {
    if !bbox.is_valid() {
        return Err(CropError::NoRegionFound { frame: None });
    }
    if width == 0 || height == 0 {
        return Err(CropError::EmptyVolume);
    }
    let m = margin as i64;
    let (w, h) = (width as i64, height as i64);

    let x1 = (bbox.x1 as i64 - m).max(0);
    let y1 = (bbox.y1 as i64 - m).max(0);
    let x2 = if bbox.x2 as i64 + m < w { bbox.x2 as i64 + m } else { w - 1 };
    let y2 = if bbox.y2 as i64 + m < h { bbox.y2 as i64 + m } else { h - 1 };

    if x1 > x2 || y1 > y2 {
        return Err(CropError::InvalidBoundingBox(*bbox));
    }
    Ok(CropWindow {
        x1: x1 as u32,
        y1: y1 as u32,
        x2: x2 as u32,
        y2: y2 as u32,
    })
}

/// Cut the same window out of every frame.
pub fn crop_volume<T: Intensity>(volume: &Volume<T>, window: &CropWindow) -> Volume<T> {
    let frames = volume
        .frames()
        .par_iter()
        .map(|frame| {
            imageops::crop_imm(frame, window.x1, window.y1, window.width(), window.height()).to_image()
        })
        .collect();
    Volume::from_frames_unchecked(frames)
}

/// Expand `bbox` by `margin` and crop the (unsegmented) volume to it.
pub fn apply_bounding_box<T: Intensity>(
    volume: &Volume<T>,
    bbox: &BoundingBox,
    margin: u32,
) -> Result<(Volume<T>, CropWindow)> {
    let window = crop_window(bbox, margin, volume.width(), volume.height())?;
    log::info!(
        "cropping {} frames to {:?} (margin {margin})",
        volume.depth(),
        window.as_tuple()
    );
    Ok((crop_volume(volume, &window), window))
}
