//! Interface to an external frame-to-frame registration step.
//!
//! No registration algorithm lives here; implementors wrap whatever tool does
//! the alignment. The pipeline only relies on the returned stack having the
//! shape of the input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};
use crate::models::Stack;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transformation {
    #[default]
    Translation,
    Affine,
}

impl FromStr for Transformation {
    type Err = CropError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "translation" => Ok(Transformation::Translation),
            "1" | "affine" => Ok(Transformation::Affine),
            other => Err(CropError::Config(format!("unknown transformation '{other}'"))),
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::Translation => write!(f, "Translation"),
            Transformation::Affine => write!(f, "Affine"),
        }
    }
}

/// Fixed parameter set handed to the stabilizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerParams {
    pub transformation: Transformation,
    pub max_pyramid_levels: u32,
    pub update_coefficient: f64,
    pub max_iterations: u32,
    pub error_tolerance: f64,
}

impl Default for StabilizerParams {
    fn default() -> Self {
        Self {
            transformation: Transformation::Translation,
            max_pyramid_levels: 1,
            update_coefficient: 0.90,
            max_iterations: 200,
            error_tolerance: 1e-7,
        }
    }
}

pub trait Stabilizer: Send + Sync {
    /// Return the stack realigned frame-to-frame, with an unchanged shape.
    fn stabilize(&self, stack: Stack, params: &StabilizerParams) -> Result<Stack>;

    fn name(&self) -> &str;
}

/// Returns its input unchanged.
pub struct IdentityStabilizer;

impl Stabilizer for IdentityStabilizer {
    fn stabilize(&self, stack: Stack, _params: &StabilizerParams) -> Result<Stack> {
        Ok(stack)
    }

    fn name(&self) -> &str {
        "Identity"
    }
}

/// Run `stabilizer` and reject any output whose shape differs from the input.
pub fn stabilize_checked(
    stabilizer: &dyn Stabilizer,
    stack: Stack,
    params: &StabilizerParams,
) -> Result<Stack> {
    let expected = stack.shape();
    log::info!(
        "stabilizing with {}: {} transformation, {} pyramid levels, update {}, {} iterations, tolerance {}",
        stabilizer.name(),
        params.transformation,
        params.max_pyramid_levels,
        params.update_coefficient,
        params.max_iterations,
        params.error_tolerance
    );
    let out = stabilizer.stabilize(stack, params)?;
    let found = out.shape();
    if found != expected {
        return Err(CropError::StabilizerShape { expected, found });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frame, Volume};

    struct DropFrame;

    impl Stabilizer for DropFrame {
        fn stabilize(&self, stack: Stack, _params: &StabilizerParams) -> Result<Stack> {
            match stack {
                Stack::Gray8(v) => {
                    let mut frames = v.into_frames();
                    frames.pop();
                    Ok(Stack::Gray8(Volume::new(frames)?))
                }
                other => Ok(other),
            }
        }

        fn name(&self) -> &str {
            "DropFrame"
        }
    }

    fn stack() -> Stack {
        Stack::Gray8(Volume::new(vec![Frame::new(6, 4), Frame::new(6, 4)]).unwrap())
    }

    #[test]
    fn test_transformation_parses_index_and_name() {
        assert_eq!("0".parse::<Transformation>().unwrap(), Transformation::Translation);
        assert_eq!("Affine".parse::<Transformation>().unwrap(), Transformation::Affine);
        assert!("shear".parse::<Transformation>().is_err());
    }

    #[test]
    fn test_identity_keeps_shape() {
        let out = stabilize_checked(&IdentityStabilizer, stack(), &StabilizerParams::default()).unwrap();
        assert_eq!(out.shape(), (2, 4, 6));
    }

    #[test]
    fn test_shape_change_is_rejected() {
        let err = stabilize_checked(&DropFrame, stack(), &StabilizerParams::default()).unwrap_err();
        assert!(matches!(
            err,
            CropError::StabilizerShape { expected: (2, 4, 6), found: (1, 4, 6) }
        ));
    }
}
