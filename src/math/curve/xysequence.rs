use std::sync::Arc;

use serde::{
    Serialize,
    Serializer,
    ser::SerializeStruct
};

use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::CurveError;
use crate::math::curve::mutablexysequence::MutableXySequence;

/// 檢查 x 值：非空、嚴格遞增、長度與 y 相同。
pub(crate) fn validate_xy(xs: &[f64], ys: &[f64]) -> Result<(), CurveError> {
    if xs.is_empty() {
        return Err(CurveError::Empty);
    }
    if xs.len() != ys.len() {
        return Err(CurveError::LengthMismatch { xs: xs.len(), ys: ys.len() });
    }
    match xs.windows(2).position(|w| !(w[0] < w[1])) {
        Some(i) => Err(CurveError::Unsorted(i + 1)),
        None => Ok(())
    }
}

/// Immutable x/y sequence.
///
/// The x values are held behind an `Arc` so that the many curves produced
/// for one IMT share a single discretization; cloning a sequence never copies
/// its x values.
#[derive(Debug, Clone, PartialEq)]
pub struct XySequence {
    xs: Arc<[f64]>,
    ys: Vec<f64>
}

impl XySequence {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<XySequence, CurveError> {
        validate_xy(&xs, &ys)?;
        Ok(XySequence { xs: xs.into(), ys })
    }

    /// 共用既有的 x 值；呼叫端保證 `xs` 已通過驗證。
    pub(crate) fn from_parts(xs: Arc<[f64]>, ys: Vec<f64>) -> XySequence {
        debug_assert_eq!(xs.len(), ys.len());
        XySequence { xs, ys }
    }

    pub fn copy_of(curve: &dyn Curve) -> XySequence {
        XySequence {
            xs: curve.xs().into(),
            ys: curve.ys().to_vec()
        }
    }

    pub fn shared_xs(&self) -> &Arc<[f64]> {
        &self.xs
    }

    pub fn to_mutable(&self) -> MutableXySequence {
        MutableXySequence::from_parts(self.xs.clone(), self.ys.clone())
    }

    /// Returns a new sequence on the same x values with `f` applied to every y.
    pub fn map_y(&self, f: impl Fn(f64) -> f64) -> XySequence {
        XySequence {
            xs: self.xs.clone(),
            ys: self.ys.iter().map(|&y| f(y)).collect()
        }
    }
}

impl Curve for XySequence {
    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn same_x_domain(&self, other: &dyn Curve) -> bool {
        self.xs.as_ptr() == other.xs().as_ptr() || *self.xs == *other.xs()
    }
}

impl Serialize for XySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("XySequence", 2)?;
        state.serialize_field("xs", &*self.xs)?;
        state.serialize_field("ys", &self.ys)?;
        state.end()
    }
}
