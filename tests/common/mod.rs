mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from stackcrop for tests
pub use stackcrop::{
    AggregationMode, BoundingBox, CropError, CropWindow, DetectionParams, DetectionPipeline, Frame,
    FrameDetector, SeedStrategy, Stack, ThresholdEstimator, Volume,
};
