use crate::calc::calcconfig::ValueFormat;
use crate::gmm::gmmutils::interpolate_by_period;
use crate::gmm::imt::Imt;
use crate::math::curve::curve::Curve;
use crate::math::curve::xysequence::XySequence;
use crate::math::interpolator::Interpolator;

// ─────────────────────────────────────────────────────────────────────────────
// 曲線後處理
// ─────────────────────────────────────────────────────────────────────────────
//
// 皆為完成曲線上的純函式轉換，不參與累加。曲線的 x 為線性地動強度，
// y 為年超越率。

// period, [max / geometric-mean ratio]
const MAX_DIRECTION_FACTORS: [(f64, [f64; 1]); 8] = [
    (0.01, [1.19]),
    (0.20, [1.19]),
    (0.50, [1.21]),
    (1.00, [1.24]),
    (2.00, [1.26]),
    (3.00, [1.27]),
    (5.00, [1.29]),
    (10.0, [1.30])
];

/// Ratio of maximum-direction to geometric-mean spectral amplitude. One for
/// PGV, which is not scaled.
pub fn max_direction_factor(imt: Imt) -> f64 {
    match imt {
        Imt::PGV => 1.0,
        _ => interpolate_by_period(&MAX_DIRECTION_FACTORS, imt)[0]
    }
}

/// Re-expresses a geometric-mean curve as a maximum-direction curve: the
/// rate at level `x` becomes the original rate at `x / factor`.
pub fn apply_max_direction(curve: &XySequence, imt: Imt) -> XySequence {
    let factor = max_direction_factor(imt);
    if factor == 1.0 || curve.size() == 1 {
        return curve.clone();
    }
    let interpolator = Interpolator::builder().log_x().build();
    let targets: Vec<f64> = curve.xs().iter().map(|&x| x / factor).collect();
    let ys: Vec<f64> = interpolator
        .find_ys(curve.xs(), curve.ys(), &targets)
        .into_iter()
        .map(|y| y.max(0.0))
        .collect();
    XySequence::from_parts(curve.shared_xs().clone(), ys)
}

/// Keeps leading points until the rate first drops below `floor`; at least
/// one point survives.
pub fn truncate(curve: &XySequence, floor: f64) -> XySequence {
    let mut mutable = curve.to_mutable();
    mutable.truncate_below(floor);
    mutable.freeze()
}

/// `1 − exp(−λ·t)` applied to every annual rate.
pub fn to_poisson_probability(curve: &XySequence, timespan: f64) -> XySequence {
    curve.map_y(|rate| -(-rate * timespan).exp_m1())
}

pub fn to_value_format(curve: &XySequence, format: ValueFormat, timespan: f64) -> XySequence {
    match format {
        ValueFormat::AnnualRate => curve.clone(),
        ValueFormat::PoissonProbability => to_poisson_probability(curve, timespan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> XySequence {
        XySequence::new(vec![0.01, 0.1, 1.0, 10.0], vec![1e-1, 1e-3, 1e-5, 0.0]).unwrap()
    }

    #[test]
    fn max_direction_raises_rates() {
        let scaled = apply_max_direction(&curve(), Imt::SA1P0);
        assert!(scaled.ys()[1] > 1e-3);
        assert!(scaled.ys().iter().all(|&y| y >= 0.0));
        assert!(scaled.same_x_domain(&curve()));
        assert_eq!(apply_max_direction(&curve(), Imt::PGV), curve());
        assert_relative_eq!(max_direction_factor(Imt::PGA), 1.19);
        assert_relative_eq!(max_direction_factor(Imt::SA10P0), 1.30);
    }

    #[test]
    fn truncation_keeps_leading_points() {
        let truncated = truncate(&curve(), 1e-4);
        assert_eq!(truncated.xs(), &[0.01, 0.1]);
        let all_low = XySequence::new(vec![0.1, 0.2], vec![1e-20, 0.0]).unwrap();
        assert_eq!(truncate(&all_low, 1e-14).size(), 1);
    }

    #[test]
    fn poisson_conversion() {
        let p = to_poisson_probability(&curve(), 50.0);
        assert_relative_eq!(p.ys()[1], 1.0 - (-0.05f64).exp(), epsilon = 1e-15);
        assert_eq!(p.ys()[3], 0.0);
        assert_eq!(to_value_format(&curve(), ValueFormat::AnnualRate, 50.0), curve());
    }
}
