pub mod aggregate;
pub mod contours;
pub mod crop;
pub mod segmentation;
pub mod threshold;

use crate::config::DetectionParams;
use crate::error::Result;
use crate::models::{BoundingBox, CropWindow, Intensity, Volume};

use aggregate::{AggregationMode, VolumeBounds};
use contours::FrameDetector;
use segmentation::Segmentation;

/// Per-frame diagnostics collected during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionReport {
    /// Raw solver thresholds, kept only in debug mode.
    pub thresholds: Option<Vec<u32>>,
    /// Box found in each frame; `None` for frames skipped in lenient mode.
    pub frame_boxes: Vec<Option<BoundingBox>>,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct DetectionOutput<T: Intensity> {
    pub segmented: Volume<T>,
    pub cropped: Volume<T>,
    pub bbox: BoundingBox,
    pub window: CropWindow,
    pub report: DetectionReport,
}

/// Segment, locate and crop a volume
pub struct DetectionPipeline {
    params: DetectionParams,
}

impl DetectionPipeline {
    pub fn new() -> Self {
        Self::with_params(DetectionParams::default())
    }

    pub fn with_params(params: DetectionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.params.margin = margin;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.params.seed = seed;
        self
    }

    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.params.mode = mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.params.debug = debug;
        self
    }

    pub fn detector(&self) -> FrameDetector {
        FrameDetector::new(self.params.region_filter())
    }

    pub fn segment<T: Intensity>(&self, volume: &Volume<T>) -> Result<Segmentation<T>> {
        segmentation::segment_volume(volume, &self.params.estimator(), self.params.seeds())
    }

    pub fn detect_bounds<T: Intensity>(&self, segmented: &Volume<T>) -> Result<VolumeBounds> {
        aggregate::detect_volume_bounds(segmented, &self.detector(), self.params.mode)
    }

    /// Run the full chain. The crop is applied to `volume` itself, never to
    /// the segmented copy.
    pub fn run<T: Intensity>(&self, volume: &Volume<T>) -> Result<DetectionOutput<T>> {
        self.params.validate()?;
        let (depth, height, width) = volume.shape();
        log::info!("detecting on {depth} frames of {width}x{height}");

        let Segmentation { volume: segmented, thresholds } = self.segment(volume)?;
        let bounds = self.detect_bounds(&segmented)?;
        let (cropped, window) = crop::apply_bounding_box(volume, &bounds.bbox, self.params.margin)?;

        Ok(DetectionOutput {
            segmented,
            cropped,
            bbox: bounds.bbox,
            window,
            report: DetectionReport {
                thresholds: self.params.debug.then_some(thresholds),
                frame_boxes: bounds.frames,
            },
        })
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
