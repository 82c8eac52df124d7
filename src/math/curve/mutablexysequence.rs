use std::ops::MulAssign;
use std::sync::Arc;

use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::CurveError;
use crate::math::curve::xysequence::{
    XySequence,
    validate_xy
};

/// Mutable accumulator over a fixed x discretization.
///
/// Hazard and rate calculations create one of these per task, fill it and
/// then hand it to a single coordinator that merges and freezes it. A
/// `MutableXySequence` is never shared between writers.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableXySequence {
    xs: Arc<[f64]>,
    ys: Vec<f64>
}

impl MutableXySequence {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<MutableXySequence, CurveError> {
        validate_xy(&xs, &ys)?;
        Ok(MutableXySequence { xs: xs.into(), ys })
    }

    /// All-zero sequence over the given x values.
    pub fn zeros(xs: Vec<f64>) -> Result<MutableXySequence, CurveError> {
        let ys = vec![0.0; xs.len()];
        MutableXySequence::new(xs, ys)
    }

    /// All-zero sequence sharing the x values of `model`.
    pub fn empty_copy_of(model: &XySequence) -> MutableXySequence {
        MutableXySequence {
            xs: model.shared_xs().clone(),
            ys: vec![0.0; model.size()]
        }
    }

    pub(crate) fn from_parts(xs: Arc<[f64]>, ys: Vec<f64>) -> MutableXySequence {
        debug_assert_eq!(xs.len(), ys.len());
        MutableXySequence { xs, ys }
    }

    pub fn copy_of(curve: &dyn Curve) -> MutableXySequence {
        MutableXySequence {
            xs: curve.xs().into(),
            ys: curve.ys().to_vec()
        }
    }

    pub fn set(&mut self, index: usize, y: f64) {
        self.ys[index] = y;
    }

    pub fn ys_mut(&mut self) -> &mut [f64] {
        &mut self.ys
    }

    /// `self.y[i] += other.y[i]`；x 值必須完全相同。
    pub fn add(&mut self, other: &dyn Curve) -> Result<&mut Self, CurveError> {
        self.check_domain(other)?;
        for (y, &dy) in self.ys.iter_mut().zip(other.ys()) {
            *y += dy;
        }
        Ok(self)
    }

    /// `self.y[i] += scale * other.y[i]`，避免為加權先複製一份曲線。
    pub fn add_scaled(&mut self, other: &dyn Curve, scale: f64) -> Result<&mut Self, CurveError> {
        self.check_domain(other)?;
        for (y, &dy) in self.ys.iter_mut().zip(other.ys()) {
            *y += scale * dy;
        }
        Ok(self)
    }

    pub fn multiply(&mut self, scale: f64) -> &mut Self {
        self.ys.iter_mut().for_each(|y| *y *= scale);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.ys.iter_mut().for_each(|y| *y = 0.0);
        self
    }

    /// Drops trailing points whose y value is exactly zero. The first point
    /// always survives.
    pub fn trim(&mut self) -> &mut Self {
        let keep = match self.ys.iter().rposition(|&y| y != 0.0) {
            Some(i) => i + 1,
            None => 1
        };
        self.truncate_to(keep)
    }

    /// Keeps the leading points up to (not including) the first y value below
    /// `floor`. The first point always survives.
    pub fn truncate_below(&mut self, floor: f64) -> &mut Self {
        let keep = self.ys
            .iter()
            .position(|&y| y < floor)
            .unwrap_or(self.ys.len())
            .max(1);
        self.truncate_to(keep)
    }

    fn truncate_to(&mut self, keep: usize) -> &mut Self {
        if keep < self.ys.len() {
            self.ys.truncate(keep);
            self.xs = self.xs[..keep].into();
        }
        self
    }

    pub fn freeze(self) -> XySequence {
        XySequence::from_parts(self.xs, self.ys)
    }

    fn check_domain(&self, other: &dyn Curve) -> Result<(), CurveError> {
        let same = self.xs.as_ptr() == other.xs().as_ptr() || *self.xs == *other.xs();
        if same {
            Ok(())
        } else {
            Err(CurveError::DimensionMismatch {
                expected: self.xs.len(),
                actual: other.size()
            })
        }
    }
}

impl Curve for MutableXySequence {
    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }
}

impl MulAssign<f64> for MutableXySequence {
    fn mul_assign(&mut self, rhs: f64) {
        self.multiply(rhs);
    }
}
