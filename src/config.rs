use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::aggregate::AggregationMode;
use crate::detection::contours::RegionFilter;
use crate::detection::threshold::{SeedStrategy, ThresholdEstimator};
use crate::error::{CropError, Result};

/// Tunable parameters of the detection pipeline.
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Pixels added on every side of the volume box before cropping.
    pub margin: u32,
    /// Contours must enclose strictly more than this many square pixels.
    pub min_area: f64,
    /// Contours must enclose strictly less than this fraction of the frame.
    pub max_area_fraction: f64,
    /// Centroid search radius, as a fraction of each frame dimension.
    pub center_fraction: f64,
    /// Iteration cap of the threshold solver.
    pub max_threshold_iterations: usize,
    /// Fixed seed for the threshold solver; `None` draws fresh entropy.
    pub seed: Option<u64>,
    pub mode: AggregationMode,
    /// Keep per-frame thresholds in the report.
    pub debug: bool,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            margin: 200,
            min_area: 100.0,
            max_area_fraction: 0.8,
            center_fraction: 0.1,
            max_threshold_iterations: ThresholdEstimator::DEFAULT_MAX_ITERATIONS,
            seed: None,
            mode: AggregationMode::Strict,
            debug: false,
        }
    }
}

impl DetectionParams {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params: DetectionParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_area >= 0.0) {
            return Err(CropError::Config(format!("min_area must be >= 0, got {}", self.min_area)));
        }
        if !(self.max_area_fraction > 0.0 && self.max_area_fraction <= 1.0) {
            return Err(CropError::Config(format!(
                "max_area_fraction must be in (0, 1], got {}",
                self.max_area_fraction
            )));
        }
        if !(self.center_fraction > 0.0) {
            return Err(CropError::Config(format!(
                "center_fraction must be > 0, got {}",
                self.center_fraction
            )));
        }
        if self.max_threshold_iterations == 0 {
            return Err(CropError::Config("max_threshold_iterations must be > 0".into()));
        }
        Ok(())
    }

    pub fn estimator(&self) -> ThresholdEstimator {
        ThresholdEstimator::new(self.max_threshold_iterations)
    }

    pub fn seeds(&self) -> SeedStrategy {
        SeedStrategy::from(self.seed)
    }

    pub fn region_filter(&self) -> RegionFilter {
        RegionFilter {
            min_area: self.min_area,
            max_area_fraction: self.max_area_fraction,
            center_fraction: self.center_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params: DetectionParams =
            serde_json::from_str(r#"{"margin": 12, "mode": "lenient", "seed": 7}"#).unwrap();
        assert_eq!(params.margin, 12);
        assert_eq!(params.mode, AggregationMode::Lenient);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.min_area, 100.0);
        assert_eq!(params.max_area_fraction, 0.8);
        assert!(!params.debug);
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let params = DetectionParams {
            max_area_fraction: 1.5,
            ..DetectionParams::default()
        };
        assert!(matches!(params.validate(), Err(CropError::Config(_))));

        let params = DetectionParams {
            max_threshold_iterations: 0,
            ..DetectionParams::default()
        };
        assert!(params.validate().is_err());
    }
}
