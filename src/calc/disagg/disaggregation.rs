use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{
    info,
    warn
};

use crate::calc::calcconfig::CalcConfig;
use crate::calc::calcerror::CalcError;
use crate::calc::disagg::disaggbins::DisaggBins;
use crate::calc::disagg::disaggdataset::{
    DisaggDataset,
    SourceContribution
};
use crate::calc::executor::CalcExecutor;
use crate::calc::hazard::hazard::Hazard;
use crate::calc::hazard::hazardcalc::{
    SourceSetContext,
    source_tasks
};
use crate::gmm::imt::Imt;
use crate::math::curve::curve::Curve;
use crate::math::curve::xysequence::XySequence;
use crate::math::interpolator::Interpolator;
use crate::model::site::Site;
use crate::model::source::Source;
use crate::model::sourceset::SourceSet;

/// Disaggregation of one IMT at one ground-motion level.
#[derive(Debug, Clone, PartialEq)]
pub struct ImtDisagg {
    pub imt: Imt,
    pub iml: f64,
    /// Annual rate read from the total hazard curve at `iml`.
    pub hazard_rate: f64,
    pub dataset: DisaggDataset,
    /// Per-source contributions, largest first.
    pub sources: Vec<SourceContribution>
}

impl ImtDisagg {
    /// `1 / hazard_rate`; infinite when the level is never exceeded.
    pub fn return_period(&self) -> f64 {
        1.0 / self.hazard_rate
    }

    pub fn dominant_source(&self) -> Option<&SourceContribution> {
        self.sources.first().filter(|s| s.rate > 0.0)
    }
}

/// Distance, magnitude and epsilon decomposition of hazard.
#[derive(Debug, Clone, PartialEq)]
pub struct Disaggregation {
    pub(crate) site: Site,
    pub(crate) bins: DisaggBins,
    pub(crate) results: BTreeMap<Imt, ImtDisagg>
}

/// Log-log interpolator for reading levels off decreasing hazard curves.
fn curve_interpolator() -> Interpolator {
    Interpolator::builder().log_x().log_y().decreasing_y().checked(true).build()
}

/// Drops the zero-rate tail so the curve can be read in log space.
fn positive_part(curve: &XySequence) -> XySequence {
    let mut mutable = curve.to_mutable();
    mutable.trim();
    mutable.freeze()
}

impl Disaggregation {
    /// Disaggregates every IMT of `hazard` at the level whose annual rate is
    /// `1 / years` on its total curve.
    ///
    /// The rate must lie between the last positive and the first point of
    /// every curve; levels are never extrapolated.
    pub fn at_return_period(hazard: &Hazard, years: f64, executor: &CalcExecutor) -> Result<Disaggregation, CalcError> {
        CalcError::check_range("return period", years, 0.0, 1e6)?;
        let rate = 1.0 / years;
        let interpolator = curve_interpolator();
        let mut imls = BTreeMap::new();
        for imt in hazard.imts() {
            let curve = positive_part(hazard.total(imt)?);
            let (min, max) = (curve.y(curve.size() - 1), curve.y(0));
            if !(rate >= min && rate <= max && max > 0.0) {
                return Err(CalcError::RateOutsideCurve { imt, rate, min, max });
            }
            let iml = interpolator.try_find_x_curve(&curve, rate)?;
            imls.insert(imt, iml);
        }
        Disaggregation::at_imls(hazard, &imls, executor)
    }

    /// As [`Disaggregation::at_return_period`] using the configured default
    /// return period.
    pub fn at_default_return_period(hazard: &Hazard, executor: &CalcExecutor) -> Result<Disaggregation, CalcError> {
        Disaggregation::at_return_period(hazard, hazard.config().return_period(), executor)
    }

    /// Disaggregates at the given ground-motion level per IMT. Every IMT must
    /// have been computed by `hazard`.
    pub fn at_imls(hazard: &Hazard, imls: &BTreeMap<Imt, f64>, executor: &CalcExecutor) -> Result<Disaggregation, CalcError> {
        let config = hazard.config();
        let model = hazard.model();
        let site = hazard.site();
        let bins = *config.disagg_bins();

        let imts: Vec<Imt> = imls.keys().copied().collect();
        let mut ln_imls = Vec::with_capacity(imts.len());
        let mut hazard_rates = Vec::with_capacity(imts.len());
        let interpolator = Interpolator::builder().log_x().build();
        for imt in &imts {
            let iml = imls[imt];
            CalcError::check_range("iml", iml, 0.0, f64::MAX)?;
            let total = hazard.total(*imt)?;
            ln_imls.push(iml.ln());
            hazard_rates.push(interpolator.find_y_curve(total, iml).max(0.0));
        }

        info!(site = %site.label(), imts = imts.len(), "disaggregation started");

        let contexts = SourceSetContext::for_model(model, &imts, config)?;
        let tasks = source_tasks(model);
        let results = executor.map(&tasks, |&(set_index, source)| {
            let set = &model.source_sets()[set_index];
            disaggregate_source(source, set, &contexts[set_index], &ln_imls, &bins, config, site)
        });

        let mut datasets: Vec<DisaggDataset> = imts.iter().map(|_| DisaggDataset::new(&bins)).collect();
        let mut sources: Vec<Vec<SourceContribution>> = vec![Vec::new(); imts.len()];
        for per_imt in results {
            for (imt_index, (dataset, contribution)) in per_imt.into_iter().enumerate() {
                datasets[imt_index].merge(&dataset);
                if contribution.rate > 0.0 {
                    sources[imt_index].push(contribution);
                }
            }
        }

        let mut results = BTreeMap::new();
        for (imt_index, (dataset, mut contributions)) in datasets.into_iter().zip(sources).enumerate() {
            let imt = imts[imt_index];
            if dataset.total_rate() <= 0.0 {
                warn!(imt = %imt, iml = imls[&imt], "disaggregation found no contributing ruptures");
            }
            // stable sort keeps model order among equal rates
            contributions.sort_by(|a, b| b.rate.total_cmp(&a.rate));
            results.insert(imt, ImtDisagg {
                imt,
                iml: imls[&imt],
                hazard_rate: hazard_rates[imt_index],
                dataset,
                sources: contributions
            });
        }

        info!(site = %site.label(), "disaggregation finished");
        Ok(Disaggregation { site: site.clone(), bins, results })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn bins(&self) -> &DisaggBins {
        &self.bins
    }

    pub fn imts(&self) -> impl Iterator<Item = Imt> + '_ {
        self.results.keys().copied()
    }

    pub fn get(&self, imt: Imt) -> Result<&ImtDisagg, CalcError> {
        self.results.get(&imt).ok_or(CalcError::MissingImt(imt))
    }
}

/// Per-IMT dataset and contribution of one source.
fn disaggregate_source(
    source: &Source,
    set: &SourceSet,
    context: &SourceSetContext,
    ln_imls: &[f64],
    bins: &DisaggBins,
    config: &CalcConfig,
    site: &Site
) -> Vec<(DisaggDataset, SourceContribution)> {
    let exceedance_model = config.exceedance_model();
    let truncation_level = config.truncation_level();
    let mut out: Vec<(DisaggDataset, SourceContribution)> = ln_imls
        .iter()
        .map(|_| (DisaggDataset::new(bins), SourceContribution::new(source.name(), set.name(), set.source_type())))
        .collect();

    for rupture in source.ruptures() {
        let distance = rupture.distance(site.location());
        if distance.r_jb > context.cutoff {
            continue;
        }
        let input = rupture.gmm_input(site, &distance);
        for (imt_index, gmms) in context.instances.iter().enumerate() {
            let ln_iml = ln_imls[imt_index];
            let (dataset, contribution) = &mut out[imt_index];
            for (gmm, gmm_weight) in gmms {
                let sgm = gmm.calc(&input);
                for &(offset, epi_weight) in &context.epi {
                    let branch = sgm.with_mean(sgm.mean() + offset);
                    let p = exceedance_model.exceedance(&branch, truncation_level, ln_iml);
                    let rate = rupture.rate() * p * gmm_weight * context.weight * epi_weight;
                    if !(rate > 0.0) {
                        continue;
                    }
                    let epsilon = branch.epsilon(ln_iml);
                    dataset.add(distance.r_rup, rupture.mag(), epsilon, rate);
                    contribution.add(distance.r_rup, rupture.mag(), epsilon, rate);
                }
            }
        }
    }
    out
}

/// Summary scalars of one IMT, as exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisaggSummary {
    pub total_rate: f64,
    pub binned_rate: f64,
    pub recovered: f64,
    pub mean_r: f64,
    pub mean_m: f64,
    pub mean_e: f64
}

impl ImtDisagg {
    pub fn summary(&self) -> DisaggSummary {
        let d = &self.dataset;
        DisaggSummary {
            total_rate: d.total_rate(),
            binned_rate: d.binned_rate(),
            recovered: d.recovered(),
            mean_r: d.mean_r(),
            mean_m: d.mean_m(),
            mean_e: d.mean_e()
        }
    }
}
