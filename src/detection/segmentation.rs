use image::Luma;
use rayon::prelude::*;

use crate::detection::threshold::{SeedStrategy, ThresholdEstimator};
use crate::error::Result;
use crate::models::{Frame, Intensity, Volume};

/// Binarize a frame: samples `<= 2 * threshold` become 0, the rest 255.
pub fn segment_frame<T: Intensity>(frame: &Frame<T>, threshold: u32) -> Frame<T> {
    let cutoff = threshold.saturating_mul(2);
    let mut out = Frame::<T>::new(frame.width(), frame.height());
    for (dst, src) in out.pixels_mut().zip(frame.pixels()) {
        if src[0].level() > cutoff {
            *dst = Luma([T::FOREGROUND]);
        }
    }
    out
}

/// Segmented volume together with the raw per-frame thresholds.
#[derive(Debug, Clone)]
pub struct Segmentation<T: Intensity> {
    pub volume: Volume<T>,
    pub thresholds: Vec<u32>,
}

/// Estimate and apply a threshold for every frame independently.
pub fn segment_volume<T: Intensity>(
    volume: &Volume<T>,
    estimator: &ThresholdEstimator,
    seeds: SeedStrategy,
) -> Result<Segmentation<T>> {
    let per_frame = volume
        .frames()
        .par_iter()
        .enumerate()
        .map(|(i, frame)| -> Result<(Frame<T>, u32)> {
            let mut rng = seeds.frame_rng(i);
            let threshold = estimator
                .estimate(frame, &mut rng)
                .map_err(|e| e.in_frame(i))?;
            log::debug!("frame {i}: threshold {threshold}");
            Ok((segment_frame(frame, threshold), threshold))
        })
        .collect::<Result<Vec<_>>>()?;

    let (frames, thresholds): (Vec<_>, Vec<_>) = per_frame.into_iter().unzip();
    log::info!("segmented {} frames", frames.len());

    Ok(Segmentation {
        volume: Volume::from_frames_unchecked(frames),
        thresholds,
    })
}
