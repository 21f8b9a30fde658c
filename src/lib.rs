pub mod config;
pub mod detection;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stabilizer;

pub use config::DetectionParams;
pub use detection::aggregate::{AggregationMode, VolumeBounds};
pub use detection::contours::{FrameDetector, RegionContour, RegionFilter};
pub use detection::threshold::{SeedStrategy, ThresholdEstimator};
pub use detection::{DetectionOutput, DetectionPipeline, DetectionReport};
pub use error::CropError;
pub use models::{BoundingBox, CropWindow, Frame, Intensity, Stack, Volume};
pub use pipeline::{DebugConfig, Pipeline, RunSummary, StackOutput};
pub use stabilizer::{IdentityStabilizer, Stabilizer, StabilizerParams, Transformation};
