use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detection::contours::FrameDetector;
use crate::error::{CropError, Result};
use crate::models::{BoundingBox, Intensity, Volume};

/// How frames without a detectable region are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// The first failing frame aborts the whole volume.
    #[default]
    Strict,
    /// Frames without a region are skipped.
    Lenient,
}

/// Volume-level box plus the per-frame boxes it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBounds {
    pub bbox: BoundingBox,
    /// `None` for frames skipped in lenient mode.
    pub frames: Vec<Option<BoundingBox>>,
}

impl VolumeBounds {
    pub fn skipped(&self) -> usize {
        self.frames.iter().filter(|b| b.is_none()).count()
    }
}

/// Union of all valid boxes, ignoring the [`BoundingBox::NONE`] marker.
pub fn union_boxes<I>(boxes: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = BoundingBox>,
{
    boxes
        .into_iter()
        .filter(|b| *b != BoundingBox::NONE)
        .reduce(|acc, b| acc.union(&b))
}

/// Detect a box in every segmented frame and union the results.
pub fn detect_volume_bounds<T: Intensity>(
    segmented: &Volume<T>,
    detector: &FrameDetector,
    mode: AggregationMode,
) -> Result<VolumeBounds> {
    let outcomes: Vec<Result<BoundingBox>> = segmented
        .frames()
        .par_iter()
        .enumerate()
        .map(|(i, frame)| detector.detect(frame).map_err(|e| e.in_frame(i)))
        .collect();

    let mut frames = Vec::with_capacity(outcomes.len());
    for (i, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(bbox) => {
                log::debug!("frame {i}: box {:?}", bbox.as_tuple());
                frames.push(Some(bbox));
            }
            Err(e) if e.is_no_region() && mode == AggregationMode::Lenient => {
                log::warn!("frame {i}: no region, skipped");
                frames.push(None);
            }
            Err(e) => return Err(e),
        }
    }

    let bbox = union_boxes(frames.iter().flatten().copied())
        .ok_or(CropError::NoRegionFound { frame: None })?;
    let bounds = VolumeBounds { bbox, frames };
    log::info!(
        "volume box {:?} from {} of {} frames",
        bbox.as_tuple(),
        bounds.frames.len() - bounds.skipped(),
        bounds.frames.len()
    );
    Ok(bounds)
}
