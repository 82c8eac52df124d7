use thiserror::Error;

use crate::gmm::gmmerror::GmmError;
use crate::gmm::imt::Imt;
use crate::math::curve::curveerror::CurveError;
use crate::model::modelerror::ModelError;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Gmm(#[from] GmmError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{name} = {value} is outside ({min}, {max}]")]
    InvalidRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64
    },

    #[error("no result for {0}")]
    MissingImt(Imt),

    #[error("{imt}: rate {rate} lies outside the hazard curve [{min}, {max}]")]
    RateOutsideCurve {
        imt: Imt,
        rate: f64,
        min: f64,
        max: f64
    },

    #[error("incompatible results: {0}")]
    Incompatible(String),

    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error)
}

impl CalcError {
    /// Checks `min < value <= max`; NaN always fails.
    pub fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, CalcError> {
        if value > min && value <= max {
            Ok(value)
        } else {
            Err(CalcError::InvalidRange { name, value, min, max })
        }
    }
}
