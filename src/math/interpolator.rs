use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::CurveError;

// ─────────────────────────────────────────────────────────────────────────────
// Interpolator
// ─────────────────────────────────────────────────────────────────────────────
//
// 單調一維內插。x、y 軸各自可選擇線性或自然對數空間，內插在轉換後的空間中
// 以線性方式進行，再轉回原空間。
//
//   find_y(xs, ys, x)：x 必須嚴格遞增（XySequence 保證）
//   find_x(xs, ys, y)：依 decreasing_y 決定 y 的方向
//
// 危害曲線的 x 為遞增的地動強度、y 為遞減的年超越率，因此以
// log_x + log_y + decreasing_y 建構即可由 1/回歸期 反查地動強度。
//
// 查詢值超出資料範圍時沿端點區段外插。

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interpolator {
    log_x: bool,
    log_y: bool,
    decreasing_y: bool,
    checked: bool
}

impl Interpolator {
    pub fn builder() -> InterpolatorBuilder {
        InterpolatorBuilder { inner: Interpolator::default() }
    }

    pub fn log_x(&self) -> bool {
        self.log_x
    }

    pub fn log_y(&self) -> bool {
        self.log_y
    }

    pub fn decreasing_y(&self) -> bool {
        self.decreasing_y
    }

    /// y at `x`. `xs` must be strictly ascending; NaN when the slices are
    /// empty or differ in length.
    pub fn find_y(&self, xs: &[f64], ys: &[f64], x: f64) -> f64 {
        if xs.is_empty() || xs.len() != ys.len() {
            return f64::NAN;
        }
        let i = segment_index(xs, x, false);
        self.interpolate_y(xs, ys, i, x)
    }

    pub fn find_y_curve(&self, curve: &dyn Curve, x: f64) -> f64 {
        self.find_y(curve.xs(), curve.ys(), x)
    }

    /// y at each of `targets`.
    pub fn find_ys(&self, xs: &[f64], ys: &[f64], targets: &[f64]) -> Vec<f64> {
        targets.iter().map(|&x| self.find_y(xs, ys, x)).collect()
    }

    /// x at which the sequence reaches `y`.
    ///
    /// `ys` must be monotonic in the configured direction. That precondition
    /// is only verified when the interpolator was built with `checked(true)`;
    /// otherwise use [`Interpolator::try_find_x`] to have it verified. NaN
    /// when the slices are empty or differ in length.
    pub fn find_x(&self, xs: &[f64], ys: &[f64], y: f64) -> f64 {
        if xs.is_empty() || xs.len() != ys.len() {
            return f64::NAN;
        }
        let i = segment_index(ys, y, self.decreasing_y);
        self.interpolate_x(xs, ys, i, y)
    }

    pub fn find_x_curve(&self, curve: &dyn Curve, y: f64) -> f64 {
        self.find_x(curve.xs(), curve.ys(), y)
    }

    /// As [`Interpolator::find_x`], but reports non-monotonic `ys` as an
    /// error instead of returning an arbitrary value.
    pub fn try_find_x(&self, xs: &[f64], ys: &[f64], y: f64) -> Result<f64, CurveError> {
        if xs.is_empty() {
            return Err(CurveError::Empty);
        }
        if xs.len() != ys.len() {
            return Err(CurveError::LengthMismatch { xs: xs.len(), ys: ys.len() });
        }
        check_monotonic(ys, self.decreasing_y)?;
        Ok(self.find_x(xs, ys, y))
    }

    pub fn try_find_x_curve(&self, curve: &dyn Curve, y: f64) -> Result<f64, CurveError> {
        if self.checked {
            self.try_find_x(curve.xs(), curve.ys(), y)
        } else {
            Ok(self.find_x_curve(curve, y))
        }
    }

    fn interpolate_y(&self, xs: &[f64], ys: &[f64], i: usize, x: f64) -> f64 {
        if xs.len() == 1 {
            return ys[0];
        }
        let (x1, x2, xt) = self.tx3(xs[i], xs[i + 1], x);
        let (y1, y2) = (self.ty(ys[i]), self.ty(ys[i + 1]));
        self.inv_y(linear(x1, y1, x2, y2, xt))
    }

    fn interpolate_x(&self, xs: &[f64], ys: &[f64], i: usize, y: f64) -> f64 {
        if xs.len() == 1 {
            return xs[0];
        }
        let (y1, y2, yt) = (self.ty(ys[i]), self.ty(ys[i + 1]), self.ty(y));
        let (x1, x2) = (self.tx(xs[i]), self.tx(xs[i + 1]));
        self.inv_x(linear(y1, x1, y2, x2, yt))
    }

    fn tx(&self, x: f64) -> f64 {
        if self.log_x { x.ln() } else { x }
    }

    fn tx3(&self, a: f64, b: f64, c: f64) -> (f64, f64, f64) {
        (self.tx(a), self.tx(b), self.tx(c))
    }

    fn ty(&self, y: f64) -> f64 {
        if self.log_y { y.ln() } else { y }
    }

    fn inv_x(&self, x: f64) -> f64 {
        if self.log_x { x.exp() } else { x }
    }

    fn inv_y(&self, y: f64) -> f64 {
        if self.log_y { y.exp() } else { y }
    }
}

pub struct InterpolatorBuilder {
    inner: Interpolator
}

impl InterpolatorBuilder {
    pub fn log_x(mut self) -> Self {
        self.inner.log_x = true;
        self
    }

    pub fn log_y(mut self) -> Self {
        self.inner.log_y = true;
        self
    }

    pub fn decreasing_y(mut self) -> Self {
        self.inner.decreasing_y = true;
        self
    }

    /// Verify monotonicity in `try_find_x_curve`.
    pub fn checked(mut self, checked: bool) -> Self {
        self.inner.checked = checked;
        self
    }

    pub fn build(self) -> Interpolator {
        self.inner
    }
}

fn linear(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x2 == x1 {
        return y1;
    }
    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Index `i` of the bracketing segment `[values[i], values[i + 1]]`, clamped
/// to the first and last segments.
fn segment_index(values: &[f64], target: f64, decreasing: bool) -> usize {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let upper = if decreasing {
        values.partition_point(|&v| v > target)
    } else {
        values.partition_point(|&v| v <= target)
    };
    upper.clamp(1, n - 1) - 1
}

fn check_monotonic(ys: &[f64], decreasing: bool) -> Result<(), CurveError> {
    let violation = ys.windows(2).position(|w| {
        if decreasing { w[1] > w[0] } else { w[1] < w[0] }
    });
    match violation {
        Some(i) => Err(CurveError::NonMonotonicInput(i + 1)),
        None => Ok(())
    }
}
