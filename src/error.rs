use crate::models::BoundingBox;

/// Errors returned by the detection and cropping stages.
#[derive(thiserror::Error, Debug)]
pub enum CropError {
    #[error("threshold did not converge after {iterations} iterations (last candidate {last}){}", frame_suffix(.frame))]
    ThresholdNotConverged {
        frame: Option<usize>,
        iterations: usize,
        last: u32,
    },
    #[error("no foreground region found{}", frame_suffix(.frame))]
    NoRegionFound { frame: Option<usize> },
    #[error("frame {frame} is {found:?} (width, height), expected {expected:?}")]
    ShapeMismatch {
        frame: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("volume has no samples")]
    EmptyVolume,
    #[error("bounding box {0:?} lies outside the volume")]
    InvalidBoundingBox(BoundingBox),
    #[error("stabilizer returned shape {found:?}, expected {expected:?}")]
    StabilizerShape {
        expected: (usize, u32, u32),
        found: (usize, u32, u32),
    },
    #[error("unsupported stack format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CropError {
    /// Attach a frame index to per-frame failures.
    pub fn in_frame(self, index: usize) -> Self {
        match self {
            CropError::ThresholdNotConverged {
                iterations, last, ..
            } => CropError::ThresholdNotConverged {
                frame: Some(index),
                iterations,
                last,
            },
            CropError::NoRegionFound { .. } => CropError::NoRegionFound { frame: Some(index) },
            other => other,
        }
    }

    pub fn is_no_region(&self) -> bool {
        matches!(self, CropError::NoRegionFound { .. })
    }
}

fn frame_suffix(frame: &Option<usize>) -> String {
    match frame {
        Some(i) => format!(" in frame {i}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CropError>;
