use thiserror::Error;

use crate::gmm::gmmerror::GmmError;
use crate::math::curve::curveerror::CurveError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{name} = {value} is outside [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64
    },

    #[error("{context}: weights sum to {sum}, expected 1.0")]
    WeightSum { context: String, sum: f64 },

    #[error("{0} is empty")]
    Empty(String),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Gmm(#[from] GmmError)
}

impl ModelError {
    /// Checks `min <= value <= max`; NaN always fails.
    pub fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ModelError> {
        if value >= min && value <= max {
            Ok(value)
        } else {
            Err(ModelError::InvalidRange { name, value, min, max })
        }
    }
}
