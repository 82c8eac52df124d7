use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{
    debug,
    info
};

use crate::calc::calcconfig::CalcConfig;
use crate::calc::calcerror::CalcError;
use crate::calc::executor::CalcExecutor;
use crate::calc::hazard::hazard::{
    GmmCurve,
    Hazard,
    SourceSetCurves
};
use crate::gmm::groundmotionmodel::GroundMotionModel;
use crate::gmm::imt::Imt;
use crate::math::curve::curve::Curve;
use crate::math::curve::mutablexysequence::MutableXySequence;
use crate::math::curve::xysequence::XySequence;
use crate::model::hazardmodel::HazardModel;
use crate::model::site::Site;
use crate::model::source::Source;
use crate::model::sourceset::SourceSet;
use crate::model::sourcetype::SourceType;

// ─────────────────────────────────────────────────────────────────────────────
// 危害計算流程
// ─────────────────────────────────────────────────────────────────────────────
//
// 1. 每個 source set 先建立各 IMT 的 GMM 實例（不支援的 IMT 於此即失敗）。
// 2. 每個 source 為一個任務，交由 executor 執行，產生未加權的 [imt][gmm] 曲線。
// 3. 呼叫端執行緒依提交順序合併：
//      source → set 的 gmm 曲線 → ×gmm 權重 → set 曲線 → ×set 權重
//      → source type 曲線 → total
//
// 合併順序固定，因此 Direct 與 Pool executor 的結果逐位元相同。

/// Per-IMT evaluators and shared settings of one source set.
pub(crate) struct SourceSetContext {
    /// `[imt][gmm]` evaluators with their logic-tree weights.
    pub(crate) instances: Vec<Vec<(Arc<dyn GroundMotionModel>, f64)>>,
    /// `(mean offset, weight)` epistemic branches.
    pub(crate) epi: Vec<(f64, f64)>,
    pub(crate) cutoff: f64,
    pub(crate) weight: f64
}

impl SourceSetContext {
    pub(crate) fn new(set: &SourceSet, imts: &[Imt], config: &CalcConfig) -> Result<SourceSetContext, CalcError> {
        let gmm_set = set.gmm_set();
        let instances = imts
            .iter()
            .map(|&imt| gmm_set.instances(imt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourceSetContext {
            instances,
            epi: gmm_set.epistemic_branches(config.gmm_uncertainty()),
            cutoff: config.max_distance().min(gmm_set.max_distance()),
            weight: set.weight()
        })
    }

    pub(crate) fn for_model(model: &HazardModel, imts: &[Imt], config: &CalcConfig) -> Result<Vec<SourceSetContext>, CalcError> {
        model.source_sets()
            .iter()
            .map(|set| SourceSetContext::new(set, imts, config))
            .collect()
    }
}

/// One task per source, tagged with the index of its source set, in model
/// order.
pub(crate) fn source_tasks(model: &HazardModel) -> Vec<(usize, &Source)> {
    model.source_sets()
        .iter()
        .enumerate()
        .flat_map(|(i, set)| set.sources().iter().map(move |source| (i, source)))
        .collect()
}

fn empty_curves(context: &SourceSetContext, model_curves: &[XySequence]) -> Vec<Vec<MutableXySequence>> {
    model_curves
        .iter()
        .zip(&context.instances)
        .map(|(model_curve, gmms)| gmms.iter().map(|_| MutableXySequence::empty_copy_of(model_curve)).collect())
        .collect()
}

/// Unweighted `[imt][gmm]` exceedance-rate curves of one source.
fn source_curves(
    source: &Source,
    context: &SourceSetContext,
    model_curves: &[XySequence],
    config: &CalcConfig,
    site: &Site
) -> Vec<Vec<MutableXySequence>> {
    let exceedance_model = config.exceedance_model();
    let truncation_level = config.truncation_level();
    let mut curves = empty_curves(context, model_curves);
    let mut probabilities = Vec::new();

    for rupture in source.ruptures() {
        let distance = rupture.distance(site.location());
        if distance.r_jb > context.cutoff {
            continue;
        }
        let input = rupture.gmm_input(site, &distance);
        for (imt_index, gmms) in context.instances.iter().enumerate() {
            let ln_imls = model_curves[imt_index].xs();
            probabilities.resize(ln_imls.len(), 0.0);
            for (gmm_index, (gmm, _)) in gmms.iter().enumerate() {
                let sgm = gmm.calc(&input);
                let ys = curves[imt_index][gmm_index].ys_mut();
                for &(offset, epi_weight) in &context.epi {
                    let branch = sgm.with_mean(sgm.mean() + offset);
                    let scale = rupture.rate() * epi_weight;
                    exceedance_model.exceedances(&branch, truncation_level, ln_imls, &mut probabilities);
                    for (y, &p) in ys.iter_mut().zip(&probabilities) {
                        *y += scale * p;
                    }
                }
            }
        }
    }
    curves
}

fn to_linear(curve: &dyn Curve, xs: &Arc<[f64]>) -> XySequence {
    XySequence::from_parts(xs.clone(), curve.ys().to_vec())
}

/// Computes hazard curves at `site` for every configured IMT.
///
/// Fails if any source set's GMMs do not support a requested IMT; no partial
/// result is produced.
pub fn hazard(
    model: &Arc<HazardModel>,
    config: &Arc<CalcConfig>,
    site: &Site,
    executor: &CalcExecutor
) -> Result<Hazard, CalcError> {
    let started = Instant::now();
    let imts = config.imts().to_vec();
    info!(
        site = %site.label(),
        model = model.name(),
        imts = imts.len(),
        sources = model.source_count(),
        threads = executor.threads(),
        "hazard calculation started"
    );

    let model_curves = imts
        .iter()
        .map(|&imt| config.log_model_curve(imt))
        .collect::<Result<Vec<_>, _>>()?;
    let linear_xs: Vec<Arc<[f64]>> = imts.iter().map(|&imt| config.imls(imt).into()).collect();
    let contexts = SourceSetContext::for_model(model, &imts, config)?;

    let tasks = source_tasks(model);
    let results = executor.map(&tasks, |&(set_index, source)| {
        source_curves(source, &contexts[set_index], &model_curves, config, site)
    });

    // [set][imt][gmm]
    let mut set_curves: Vec<Vec<Vec<MutableXySequence>>> = contexts
        .iter()
        .map(|context| empty_curves(context, &model_curves))
        .collect();
    for (&(set_index, _), curves) in tasks.iter().zip(&results) {
        for (imt_index, gmm_curves) in curves.iter().enumerate() {
            for (gmm_index, curve) in gmm_curves.iter().enumerate() {
                set_curves[set_index][imt_index][gmm_index].add(curve)?;
            }
        }
    }

    let mut type_curves: Vec<BTreeMap<SourceType, MutableXySequence>> = vec![BTreeMap::new(); imts.len()];
    let mut by_source_set = Vec::with_capacity(contexts.len());

    for ((set, context), gmm_curves_by_imt) in model.source_sets().iter().zip(&contexts).zip(set_curves) {
        let mut curves = BTreeMap::new();
        for (imt_index, gmm_curves) in gmm_curves_by_imt.into_iter().enumerate() {
            let mut set_curve = MutableXySequence::empty_copy_of(&model_curves[imt_index]);
            let mut gmm_entries = Vec::with_capacity(gmm_curves.len());
            for ((curve, (_, gmm_weight)), branch) in gmm_curves
                .iter()
                .zip(&context.instances[imt_index])
                .zip(set.gmm_set().branches())
            {
                set_curve.add_scaled(curve, *gmm_weight)?;
                let mut weighted = curve.clone();
                weighted.multiply(gmm_weight * context.weight);
                gmm_entries.push(GmmCurve {
                    gmm: branch.gmm.name().to_owned(),
                    curve: to_linear(&weighted, &linear_xs[imt_index])
                });
            }
            set_curve *= context.weight;

            type_curves[imt_index]
                .entry(set.source_type())
                .or_insert_with(|| MutableXySequence::empty_copy_of(&model_curves[imt_index]))
                .add(&set_curve)?;
            curves.insert(imts[imt_index], gmm_entries);
        }
        debug!(
            source_set = set.name(),
            source_type = %set.source_type(),
            sources = set.sources().len(),
            "source set merged"
        );
        by_source_set.push(SourceSetCurves {
            name: set.name().to_owned(),
            source_type: set.source_type(),
            weight: set.weight(),
            curves
        });
    }

    let mut total = BTreeMap::new();
    let mut by_type = BTreeMap::new();
    for (imt_index, types) in type_curves.into_iter().enumerate() {
        let imt = imts[imt_index];
        let xs = &linear_xs[imt_index];
        let mut total_curve = MutableXySequence::empty_copy_of(&model_curves[imt_index]);
        let mut type_map = BTreeMap::new();
        for (source_type, curve) in types {
            total_curve.add(&curve)?;
            type_map.insert(source_type, to_linear(&curve, xs));
        }
        total.insert(imt, to_linear(&total_curve, xs));
        by_type.insert(imt, type_map);
    }

    info!(
        site = %site.label(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "hazard calculation finished"
    );

    Ok(Hazard {
        model: model.clone(),
        config: config.clone(),
        site: site.clone(),
        total,
        by_type,
        by_source_set
    })
}
