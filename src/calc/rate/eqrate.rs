use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::calc::calcconfig::{
    CalcConfig,
    DistributionFormat,
    RateConfig,
    ValueFormat
};
use crate::calc::calcerror::CalcError;
use crate::calc::executor::CalcExecutor;
use crate::calc::hazard::hazardcalc::source_tasks;
use crate::calc::hazard::postprocess;
use crate::math::curve::curve::Curve;
use crate::math::curve::mutablexysequence::MutableXySequence;
use crate::math::curve::xysequence::XySequence;
use crate::model::hazardmodel::HazardModel;
use crate::model::site::Site;
use crate::model::source::Source;
use crate::model::sourcetype::SourceType;

/// Earthquake rates near a site: the total magnitude–frequency
/// distribution and its breakdown by source type.
///
/// Rates start out incremental and annual; [`EqRate::to_cumulative`] and
/// then [`EqRate::to_poisson_probability`] convert them, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqRate {
    site: String,
    distribution_format: DistributionFormat,
    value_format: ValueFormat,
    total: XySequence,
    by_type: BTreeMap<SourceType, XySequence>
}

/// Nearest magnitude bin, or `None` outside the bins.
fn magnitude_index(rate: &RateConfig, count: usize, mag: f64) -> Option<usize> {
    let position = ((mag - rate.m_min) / rate.m_delta).round();
    if position >= 0.0 && position < count as f64 {
        Some(position as usize)
    } else {
        None
    }
}

/// Incremental MFD of the ruptures of `source` within the rate distance.
fn source_mfd(source: &Source, model_mfd: &XySequence, rate: &RateConfig, site: &Site) -> MutableXySequence {
    let mut mfd = MutableXySequence::empty_copy_of(model_mfd);
    let count = mfd.size();
    let ys = mfd.ys_mut();
    for rupture in source.ruptures() {
        if rupture.distance(site.location()).r_jb > rate.distance {
            continue;
        }
        if let Some(i) = magnitude_index(rate, count, rupture.mag()) {
            ys[i] += rupture.rate();
        }
    }
    mfd
}

impl EqRate {
    /// Rates from every source in `model` within the configured distance of
    /// `site`, in the configured distribution and value formats.
    pub fn create(model: &HazardModel, config: &CalcConfig, site: &Site) -> Result<EqRate, CalcError> {
        EqRate::create_with(model, config, site, &CalcExecutor::Direct)
    }

    /// As [`EqRate::create`], binning each source as its own task on
    /// `executor`. Source results are merged in model order.
    pub fn create_with(
        model: &HazardModel,
        config: &CalcConfig,
        site: &Site,
        executor: &CalcExecutor
    ) -> Result<EqRate, CalcError> {
        let rate = config.rate();
        let model_mfd = MutableXySequence::zeros(rate.magnitudes())?.freeze();

        let tasks = source_tasks(model);
        let mut source_mfds = executor
            .map(&tasks, |&(_, source)| source_mfd(source, &model_mfd, rate, site))
            .into_iter();

        let mut types: BTreeMap<SourceType, MutableXySequence> = BTreeMap::new();
        for set in model.source_sets() {
            let mut set_mfd = MutableXySequence::empty_copy_of(&model_mfd);
            for mfd in source_mfds.by_ref().take(set.sources().len()) {
                set_mfd.add(&mfd)?;
            }
            set_mfd *= set.weight();
            types
                .entry(set.source_type())
                .or_insert_with(|| MutableXySequence::empty_copy_of(&model_mfd))
                .add(&set_mfd)?;
        }

        let mut total = MutableXySequence::empty_copy_of(&model_mfd);
        let mut by_type = BTreeMap::new();
        for (source_type, mfd) in types {
            total.add(&mfd)?;
            by_type.insert(source_type, mfd.freeze());
        }
        debug!(site = %site.label(), total_rate = total.ys().iter().sum::<f64>(), "earthquake rates computed");

        let incremental = EqRate {
            site: site.label(),
            distribution_format: DistributionFormat::Incremental,
            value_format: ValueFormat::AnnualRate,
            total: total.freeze(),
            by_type
        };

        // probabilities are only defined on cumulative rates
        let formatted = match (rate.distribution_format, rate.value_format) {
            (DistributionFormat::Incremental, ValueFormat::AnnualRate) => incremental,
            (DistributionFormat::Cumulative, ValueFormat::AnnualRate) => EqRate::to_cumulative(incremental),
            (_, ValueFormat::PoissonProbability) => {
                EqRate::to_poisson_probability(EqRate::to_cumulative(incremental), rate.timespan)
            }
        };
        Ok(formatted)
    }

    /// Deferred [`EqRate::create`] for submission to any executor.
    pub fn callable(
        model: Arc<HazardModel>,
        config: Arc<CalcConfig>,
        site: Site
    ) -> impl FnOnce() -> Result<EqRate, CalcError> + Send + 'static {
        move || EqRate::create(&model, &config, &site)
    }

    /// Element-wise sum of several results sharing magnitude bins and
    /// formats. The site label is taken from the first.
    pub fn combine(rates: &[EqRate]) -> Result<EqRate, CalcError> {
        let first = rates
            .first()
            .ok_or_else(|| CalcError::Incompatible("no rates to combine".to_owned()))?;
        let mut total = MutableXySequence::empty_copy_of(&first.total);
        let mut types: BTreeMap<SourceType, MutableXySequence> = BTreeMap::new();
        for rate in rates {
            if rate.distribution_format != first.distribution_format || rate.value_format != first.value_format {
                return Err(CalcError::Incompatible(format!(
                    "{:?}/{:?} with {:?}/{:?}",
                    first.distribution_format, first.value_format, rate.distribution_format, rate.value_format
                )));
            }
            total.add(&rate.total)?;
            for (&source_type, mfd) in &rate.by_type {
                types
                    .entry(source_type)
                    .or_insert_with(|| MutableXySequence::empty_copy_of(&first.total))
                    .add(mfd)?;
            }
        }
        Ok(EqRate {
            site: first.site.clone(),
            distribution_format: first.distribution_format,
            value_format: first.value_format,
            total: total.freeze(),
            by_type: types.into_iter().map(|(t, mfd)| (t, mfd.freeze())).collect()
        })
    }

    /// Incremental to cumulative rates: each bin becomes the sum of itself
    /// and every larger magnitude. Already cumulative rates are unchanged.
    pub fn to_cumulative(rate: EqRate) -> EqRate {
        if rate.distribution_format == DistributionFormat::Cumulative {
            return rate;
        }
        let cumulate = |mfd: &XySequence| {
            let mut mutable = mfd.to_mutable();
            let mut running = 0.0;
            for y in mutable.ys_mut().iter_mut().rev() {
                running += *y;
                *y = running;
            }
            mutable.freeze()
        };
        EqRate {
            distribution_format: DistributionFormat::Cumulative,
            total: cumulate(&rate.total),
            by_type: rate.by_type.iter().map(|(&t, mfd)| (t, cumulate(mfd))).collect(),
            ..rate
        }
    }

    /// Annual rates to Poisson probabilities `1 − exp(−λ·timespan)`.
    ///
    /// Expects cumulative rates; converting incremental rates is a caller
    /// error and is not detected.
    pub fn to_poisson_probability(rate: EqRate, timespan: f64) -> EqRate {
        if rate.value_format == ValueFormat::PoissonProbability {
            return rate;
        }
        EqRate {
            value_format: ValueFormat::PoissonProbability,
            total: postprocess::to_poisson_probability(&rate.total, timespan),
            by_type: rate.by_type
                .iter()
                .map(|(&t, mfd)| (t, postprocess::to_poisson_probability(mfd, timespan)))
                .collect(),
            ..rate
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn distribution_format(&self) -> DistributionFormat {
        self.distribution_format
    }

    pub fn value_format(&self) -> ValueFormat {
        self.value_format
    }

    pub fn magnitudes(&self) -> &[f64] {
        self.total.xs()
    }

    pub fn total(&self) -> &XySequence {
        &self.total
    }

    pub fn by_type(&self) -> &BTreeMap<SourceType, XySequence> {
        &self.by_type
    }

    pub fn to_json(&self) -> Result<String, CalcError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::gmm::groundmotionmodel::Gmm;
    use crate::model::gmmset::GmmSet;
    use crate::model::location::Location;
    use crate::model::mfd::Mfd;
    use crate::model::sourceset::SourceSet;

    fn site() -> Site {
        Site::builder(Location::new(-117.0, 34.0).unwrap()).name("test").build().unwrap()
    }

    fn model() -> HazardModel {
        let origin = *site().location();
        let near = Source::point("near", origin.offset_km(5.0, 0.0).with_depth(5.0).unwrap(), 0.0,
            &Mfd::incremental(vec![5.0, 6.0], vec![1e-2, 1e-3]).unwrap()).unwrap();
        let far = Source::point("far", origin.offset_km(50.0, 0.0).with_depth(5.0).unwrap(), 0.0,
            &Mfd::single(6.0, 1.0).unwrap()).unwrap();
        let fault = Source::fault("fault", origin.offset_km(-10.0, -10.0), origin.offset_km(-10.0, 10.0),
            90.0, 12.0, 0.0, 0.0, &Mfd::single(7.04, 2e-3).unwrap()).unwrap();
        let gmms = Arc::new(GmmSet::single(Gmm::Bjf97));
        HazardModel::builder("rates")
            .source_set(SourceSet::builder("grid", SourceType::Grid).gmm_set(gmms.clone()).source(near).source(far).build().unwrap())
            .source_set(SourceSet::builder("faults", SourceType::Fault).gmm_set(gmms).weight(0.5).source(fault).build().unwrap())
            .build()
            .unwrap()
    }

    fn config(distribution_format: DistributionFormat, value_format: ValueFormat) -> CalcConfig {
        let rate = RateConfig {
            m_min: 5.0,
            m_max: 7.5,
            m_delta: 0.5,
            distance: 20.0,
            timespan: 50.0,
            distribution_format,
            value_format
        };
        CalcConfig::builder().rate(rate).build().unwrap()
    }

    #[test]
    fn incremental_rates_within_distance() {
        let rates = EqRate::create(&model(), &config(DistributionFormat::Incremental, ValueFormat::AnnualRate), &site()).unwrap();
        assert_eq!(rates.magnitudes(), &[5.0, 5.5, 6.0, 6.5, 7.0, 7.5]);
        // far source excluded; M7.04 lands in the 7.0 bin at half weight
        assert_eq!(rates.total().ys(), &[1e-2, 0.0, 1e-3, 0.0, 1e-3, 0.0]);
        assert_eq!(rates.by_type()[&SourceType::Fault].ys()[4], 1e-3);
        assert_eq!(rates.site(), "test");
    }

    #[test]
    fn cumulative_then_poisson() {
        let incremental = EqRate::create(&model(), &config(DistributionFormat::Incremental, ValueFormat::AnnualRate), &site()).unwrap();
        let cumulative = EqRate::to_cumulative(incremental);
        assert_relative_eq!(cumulative.total().ys()[0], 1.2e-2, epsilon = 1e-15);
        assert_relative_eq!(cumulative.total().ys()[2], 2e-3, epsilon = 1e-15);
        assert_eq!(cumulative.total().ys()[5], 0.0);

        let probability = EqRate::to_poisson_probability(cumulative.clone(), 50.0);
        assert_relative_eq!(probability.total().ys()[0], 1.0 - (-0.6f64).exp(), epsilon = 1e-12);
        assert_eq!(probability.total().ys()[5], 0.0);

        let configured = EqRate::create(&model(), &config(DistributionFormat::Incremental, ValueFormat::PoissonProbability), &site()).unwrap();
        assert_eq!(configured, probability);
    }

    #[test]
    fn combine_requires_matching_bins_and_formats() {
        let a = EqRate::create(&model(), &config(DistributionFormat::Incremental, ValueFormat::AnnualRate), &site()).unwrap();
        let combined = EqRate::combine(&[a.clone(), a.clone()]).unwrap();
        assert_eq!(combined.total().ys()[0], 2e-2);

        let cumulative = EqRate::to_cumulative(a.clone());
        assert!(matches!(EqRate::combine(&[a.clone(), cumulative]), Err(CalcError::Incompatible(_))));

        let mut other = *config(DistributionFormat::Incremental, ValueFormat::AnnualRate).rate();
        other.m_delta = 0.25;
        let b = EqRate::create(&model(), &CalcConfig::builder().rate(other).build().unwrap(), &site()).unwrap();
        assert!(matches!(EqRate::combine(&[a, b]), Err(CalcError::Curve(_))));
        assert!(EqRate::combine(&[]).is_err());
    }

    #[test]
    fn pooled_sources_match_direct() {
        let config = config(DistributionFormat::Cumulative, ValueFormat::AnnualRate);
        let direct = EqRate::create(&model(), &config, &site()).unwrap();
        for threads in [2, 5] {
            let pool = CalcExecutor::pool(threads).unwrap();
            assert_eq!(EqRate::create_with(&model(), &config, &site(), &pool).unwrap(), direct);
        }
    }

    #[test]
    fn callable_defers_work() {
        let task = EqRate::callable(
            Arc::new(model()),
            Arc::new(config(DistributionFormat::Cumulative, ValueFormat::AnnualRate)),
            site()
        );
        let rates = std::thread::spawn(task).join().unwrap().unwrap();
        assert_eq!(rates.distribution_format(), DistributionFormat::Cumulative);
    }
}
