use serde::{
    Deserialize,
    Serialize
};

use crate::gmm::scalargroundmotion::ScalarGroundMotion;
use crate::math::normal::{
    ccdf,
    cdf
};

/// Probability-of-exceedance model applied to a lognormal ground motion.
///
/// ```text
/// None                  P = Q(z)
/// TruncationUpperOnly   P = (Q(z) − Q(n)) / (1 − Q(n)),   0 for z ≥ n
/// TruncationLowerUpper  P = (Q(z) − Q(n)) / (Φ(n) − Φ(−n)), clamped to [0, 1]
/// ```
///
/// `z = (ln iml − μ) / σ`, `n` the truncation level, `Q` the standard normal
/// survival function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExceedanceModel {
    None,
    #[default]
    TruncationUpperOnly,
    TruncationLowerUpper
}

impl ExceedanceModel {
    pub fn exceedance(&self, sgm: &ScalarGroundMotion, truncation_level: f64, ln_iml: f64) -> f64 {
        let sigma = sgm.sigma();
        if sigma <= 0.0 {
            return if ln_iml < sgm.mean() { 1.0 } else { 0.0 };
        }
        let z = (ln_iml - sgm.mean()) / sigma;
        match self {
            ExceedanceModel::None => ccdf(z),
            ExceedanceModel::TruncationUpperOnly => {
                let n = truncation_level;
                if z >= n {
                    return 0.0;
                }
                let q_n = ccdf(n);
                ((ccdf(z) - q_n) / (1.0 - q_n)).max(0.0)
            }
            ExceedanceModel::TruncationLowerUpper => {
                let n = truncation_level;
                if z >= n {
                    return 0.0;
                }
                if z <= -n {
                    return 1.0;
                }
                let q_n = ccdf(n);
                ((ccdf(z) - q_n) / (cdf(n) - cdf(-n))).clamp(0.0, 1.0)
            }
        }
    }

    /// Fills `out[i]` with the exceedance probability at `ln_imls[i]`.
    pub fn exceedances(&self, sgm: &ScalarGroundMotion, truncation_level: f64, ln_imls: &[f64], out: &mut [f64]) {
        for (p, &x) in out.iter_mut().zip(ln_imls) {
            *p = self.exceedance(sgm, truncation_level, x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn untruncated_is_survival_function() {
        let sgm = ScalarGroundMotion::new(0.0, 1.0);
        assert_relative_eq!(ExceedanceModel::None.exceedance(&sgm, 3.0, 0.0), 0.5, epsilon = 1e-15);
        assert!(ExceedanceModel::None.exceedance(&sgm, 3.0, 4.0) > 0.0);
    }

    #[test]
    fn upper_truncation() {
        let sgm = ScalarGroundMotion::new(-1.0, 0.6);
        let model = ExceedanceModel::TruncationUpperOnly;
        assert_eq!(model.exceedance(&sgm, 3.0, -1.0 + 3.5 * 0.6), 0.0);
        assert_eq!(model.exceedance(&sgm, 3.0, 10.0), 0.0);
        assert_relative_eq!(model.exceedance(&sgm, 3.0, -50.0), 1.0, epsilon = 1e-15);
        let p = model.exceedance(&sgm, 3.0, -1.0);
        assert!(p > 0.49 && p < 0.5);
    }

    #[test]
    fn two_sided_truncation_is_symmetric() {
        let sgm = ScalarGroundMotion::new(0.0, 1.0);
        let model = ExceedanceModel::TruncationLowerUpper;
        assert_relative_eq!(model.exceedance(&sgm, 2.0, 0.0), 0.5, epsilon = 1e-12);
        assert_eq!(model.exceedance(&sgm, 2.0, -2.5), 1.0);
        let lo = model.exceedance(&sgm, 2.0, -1.0);
        let hi = model.exceedance(&sgm, 2.0, 1.0);
        assert_relative_eq!(lo + hi, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn exceedance_decreases_with_level() {
        let sgm = ScalarGroundMotion::new(-2.0, 0.7);
        let levels: Vec<f64> = (0..20).map(|i| -6.0 + 0.4 * i as f64).collect();
        let mut out = vec![0.0; levels.len()];
        for model in [ExceedanceModel::None, ExceedanceModel::TruncationUpperOnly, ExceedanceModel::TruncationLowerUpper] {
            model.exceedances(&sgm, 3.0, &levels, &mut out);
            assert!(out.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
