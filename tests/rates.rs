mod common;

use std::sync::Arc;

use approx::assert_relative_eq;

use seishaz::calc::calcconfig::{
    CalcConfig,
    DistributionFormat,
    RateConfig,
    ValueFormat
};
use seishaz::calc::executor::CalcExecutor;
use seishaz::calc::hazard::postprocess::to_poisson_probability;
use seishaz::calc::rate::eqrate::EqRate;
use seishaz::calc::rate::ratebatch::{
    BATCH_SIZE,
    rate_batch
};
use seishaz::math::curve::curve::Curve;
use seishaz::math::curve::mutablexysequence::MutableXySequence;
use seishaz::model::location::Location;
use seishaz::model::site::Site;
use seishaz::model::sourcetype::SourceType;

fn config(value_format: ValueFormat) -> Arc<CalcConfig> {
    let rate = RateConfig {
        distance: 50.0,
        distribution_format: DistributionFormat::Cumulative,
        value_format,
        ..RateConfig::default()
    };
    Arc::new(CalcConfig::builder().rate(rate).build().unwrap())
}

#[test]
fn zero_rate_has_zero_probability() {
    let zeros = MutableXySequence::zeros(vec![5.0, 6.0, 7.0]).unwrap().freeze();
    let probability = to_poisson_probability(&zeros, 50.0);
    assert!(probability.ys().iter().all(|&p| p == 0.0));
}

#[test]
fn cumulative_rates_are_non_increasing() {
    let rates = EqRate::create(&common::model(), &config(ValueFormat::AnnualRate), &common::site()).unwrap();
    assert_eq!(rates.distribution_format(), DistributionFormat::Cumulative);
    assert!(rates.total().ys().windows(2).all(|w| w[0] >= w[1]));
    assert!(rates.total().y(0) > 0.0);
    assert!(rates.by_type().contains_key(&SourceType::Grid));

    let summed: f64 = rates.by_type().values().map(|mfd| mfd.y(0)).sum();
    assert_relative_eq!(summed, rates.total().y(0), max_relative = 1e-12);
}

#[test]
fn probabilities_follow_timespan() {
    let model = common::model();
    let site = common::site();
    let rates = EqRate::create(&model, &config(ValueFormat::AnnualRate), &site).unwrap();
    let probabilities = EqRate::create(&model, &config(ValueFormat::PoissonProbability), &site).unwrap();
    let timespan = RateConfig::default().timespan;
    for (rate, p) in rates.total().ys().iter().zip(probabilities.total().ys()) {
        assert_relative_eq!(*p, 1.0 - (-rate * timespan).exp(), epsilon = 1e-14);
    }
}

#[test]
fn batches_match_single_site_results() {
    let model = common::model();
    let config = config(ValueFormat::AnnualRate);
    let origin = *common::site().location();
    let sites: Vec<Site> = (0..13)
        .map(|i| {
            let location: Location = origin.offset_km(8.0 * i as f64, 0.0);
            Site::builder(location).name(format!("site-{i}")).build().unwrap()
        })
        .collect();

    let mut batched = Vec::new();
    let count = rate_batch(&model, &config, &sites, &CalcExecutor::pool(3).unwrap(), BATCH_SIZE, |rate| {
        batched.push(rate);
        Ok(())
    })
    .unwrap();
    assert_eq!(count, sites.len());

    for (site, rate) in sites.iter().zip(&batched) {
        assert_eq!(rate, &EqRate::create(&model, &config, site).unwrap());
    }

    let combined = EqRate::combine(&batched).unwrap();
    let expected: f64 = batched.iter().map(|r| r.total().y(0)).sum();
    assert_relative_eq!(combined.total().y(0), expected, max_relative = 1e-12);
    assert_eq!(combined.site(), "site-0");
}
