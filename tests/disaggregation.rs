mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use approx::assert_relative_eq;

use seishaz::calc::calcconfig::CalcConfig;
use seishaz::calc::calcerror::CalcError;
use seishaz::calc::disagg::disaggregation::Disaggregation;
use seishaz::calc::executor::CalcExecutor;
use seishaz::calc::hazard::hazard::Hazard;
use seishaz::calc::hazard::hazardcalc::hazard;
use seishaz::gmm::imt::Imt;
use seishaz::math::curve::curve::Curve;

fn site_hazard() -> Hazard {
    let config = Arc::new(CalcConfig::builder().imts([Imt::PGA, Imt::SA1P0]).build().unwrap());
    hazard(&common::model(), &config, &common::site(), &CalcExecutor::Direct).unwrap()
}

fn percent_sum(disagg: &Disaggregation, imt: Imt) -> f64 {
    let dataset = &disagg.get(imt).unwrap().dataset;
    let (nr, nm, ne) = dataset.dimensions();
    let mut sum = 0.0;
    for r in 0..nr {
        for m in 0..nm {
            for e in 0..ne {
                sum += dataset.percent(r, m, e);
            }
        }
    }
    sum
}

#[test]
fn return_period_matches_explicit_levels() {
    let hazard = site_hazard();
    let by_period = Disaggregation::at_return_period(&hazard, 2475.0, &CalcExecutor::Direct).unwrap();
    let imls: BTreeMap<Imt, f64> = by_period.imts().map(|imt| (imt, by_period.get(imt).unwrap().iml)).collect();
    let by_level = Disaggregation::at_imls(&hazard, &imls, &CalcExecutor::Direct).unwrap();
    assert_eq!(by_period, by_level);

    for imt in by_period.imts() {
        let result = by_period.get(imt).unwrap();
        assert!(result.iml > 0.0);
        // read back on a coarser interpolation of the same curve
        assert!(result.return_period() > 1000.0 && result.return_period() < 4000.0);
    }
}

#[test]
fn default_return_period_comes_from_config() {
    let hazard = site_hazard();
    let explicit = Disaggregation::at_return_period(&hazard, hazard.config().return_period(), &CalcExecutor::Direct).unwrap();
    let default = Disaggregation::at_default_return_period(&hazard, &CalcExecutor::Direct).unwrap();
    assert_eq!(explicit, default);
}

#[test]
fn percentages_are_complete() {
    let hazard = site_hazard();
    let disagg = Disaggregation::at_return_period(&hazard, 475.0, &CalcExecutor::Direct).unwrap();
    for imt in disagg.imts() {
        assert_relative_eq!(percent_sum(&disagg, imt), 100.0, epsilon = 1e-9);
        let summary = disagg.get(imt).unwrap().summary();
        assert!(summary.mean_r > 0.0);
        assert!(summary.mean_m >= 5.0 && summary.mean_m <= 7.5);
        assert!(summary.recovered > 99.0);
    }
}

#[test]
fn unreachable_level_disaggregates_to_zero() {
    let hazard = site_hazard();
    let imls = BTreeMap::from([(Imt::PGA, 500.0)]);
    let disagg = Disaggregation::at_imls(&hazard, &imls, &CalcExecutor::Direct).unwrap();
    let result = disagg.get(Imt::PGA).unwrap();
    assert_eq!(result.dataset.total_rate(), 0.0);
    assert_eq!(percent_sum(&disagg, Imt::PGA), 0.0);
    assert_eq!(result.dataset.modal(), None);
    assert!(result.sources.is_empty());
    assert!(disagg.get(Imt::SA1P0).is_err());
}

#[test]
fn sources_are_ranked_and_sum_to_total() {
    let hazard = site_hazard();
    let disagg = Disaggregation::at_return_period(&hazard, 2475.0, &CalcExecutor::Direct).unwrap();
    let result = disagg.get(Imt::SA1P0).unwrap();
    assert!(result.sources.windows(2).all(|w| w[0].rate >= w[1].rate));
    let sum: f64 = result.sources.iter().map(|s| s.rate).sum();
    assert_relative_eq!(sum, result.dataset.total_rate(), max_relative = 1e-9);
    assert_eq!(result.dominant_source().map(|s| s.rate), result.sources.first().map(|s| s.rate));
}

#[test]
fn pooled_disaggregation_matches_direct() {
    let hazard = site_hazard();
    let direct = Disaggregation::at_return_period(&hazard, 2475.0, &CalcExecutor::Direct).unwrap();
    let pooled = Disaggregation::at_return_period(&hazard, 2475.0, &CalcExecutor::pool(4).unwrap()).unwrap();
    assert_eq!(direct, pooled);
}

#[test]
fn json_exports_parse() {
    let hazard = site_hazard();
    let disagg = Disaggregation::at_return_period(&hazard, 2475.0, &CalcExecutor::Direct).unwrap();

    let full: serde_json::Value = serde_json::from_str(&disagg.to_json().unwrap()).unwrap();
    assert_eq!(full["site"], "memphis-ish");
    assert_eq!(full["disaggs"].as_array().unwrap().len(), 2);
    assert_eq!(full["eps_bins"].as_array().unwrap().len(), 12);
    assert!(!full["disaggs"][0]["data"].as_array().unwrap().is_empty());

    let compact: serde_json::Value = serde_json::from_str(&disagg.to_json_compact().unwrap()).unwrap();
    assert_eq!(compact["eps_bins"], 12);
    let rows = compact["disaggs"][1]["data"].as_array().unwrap();
    assert!(rows.iter().all(|row| row.as_array().unwrap().len() == 2 + 12));
}

#[test]
fn invalid_return_period_is_rejected() {
    let hazard = site_hazard();
    assert!(Disaggregation::at_return_period(&hazard, 0.0, &CalcExecutor::Direct).is_err());
    assert!(Disaggregation::at_return_period(&hazard, f64::NAN, &CalcExecutor::Direct).is_err());
}

#[test]
fn rates_beyond_the_curve_are_not_extrapolated() {
    let full = site_hazard();
    let top = full.total(Imt::PGA).unwrap().ys()[0];
    assert!(top < 1.0);
    match Disaggregation::at_return_period(&full, 1.0, &CalcExecutor::Direct) {
        Err(CalcError::RateOutsideCurve { imt, rate, max, .. }) => {
            assert_eq!(imt, Imt::PGA);
            assert_eq!(rate, 1.0);
            assert_eq!(max, top);
        }
        other => panic!("expected RateOutsideCurve, got {other:?}")
    }

    let config = Arc::new(
        CalcConfig::builder()
            .imts([Imt::PGA])
            .imls(Imt::PGA, vec![0.01, 0.02, 0.05])
            .build()
            .unwrap()
    );
    let short = hazard(&common::model(), &config, &common::site(), &CalcExecutor::Direct).unwrap();
    let result = Disaggregation::at_return_period(&short, 1e5, &CalcExecutor::Direct);
    assert!(matches!(result, Err(CalcError::RateOutsideCurve { imt: Imt::PGA, .. })));
}
