use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::calc::calcconfig::{
    CalcConfig,
    ValueFormat
};
use crate::calc::calcerror::CalcError;
use crate::calc::hazard::postprocess::{
    apply_max_direction,
    to_value_format,
    truncate
};
use crate::gmm::imt::Imt;
use crate::math::curve::xysequence::XySequence;
use crate::model::hazardmodel::HazardModel;
use crate::model::site::Site;
use crate::model::sourcetype::SourceType;

/// Weighted curves of one GMM within a source set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GmmCurve {
    pub gmm: String,
    pub curve: XySequence
}

/// Contribution of one source set, per IMT and GMM. Each curve already
/// carries its GMM and source-set weights, so the curves of a set sum to
/// the set's share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSetCurves {
    pub name: String,
    pub source_type: SourceType,
    pub weight: f64,
    pub curves: BTreeMap<Imt, Vec<GmmCurve>>
}

/// Hazard at one site.
///
/// Curves hold annual exceedance rates over linear ground-motion levels.
/// For every IMT the total equals the sum of the per-type curves. The model
/// and config are kept so the same ruptures can be disaggregated later.
#[derive(Debug, Clone)]
pub struct Hazard {
    pub(crate) model: Arc<HazardModel>,
    pub(crate) config: Arc<CalcConfig>,
    pub(crate) site: Site,
    pub(crate) total: BTreeMap<Imt, XySequence>,
    pub(crate) by_type: BTreeMap<Imt, BTreeMap<SourceType, XySequence>>,
    pub(crate) by_source_set: Vec<SourceSetCurves>
}

impl Hazard {
    pub fn model(&self) -> &Arc<HazardModel> {
        &self.model
    }

    pub fn config(&self) -> &Arc<CalcConfig> {
        &self.config
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn imts(&self) -> impl Iterator<Item = Imt> + '_ {
        self.total.keys().copied()
    }

    pub fn total(&self, imt: Imt) -> Result<&XySequence, CalcError> {
        self.total.get(&imt).ok_or(CalcError::MissingImt(imt))
    }

    pub fn by_type(&self, imt: Imt) -> Result<&BTreeMap<SourceType, XySequence>, CalcError> {
        self.by_type.get(&imt).ok_or(CalcError::MissingImt(imt))
    }

    pub fn by_source_set(&self) -> &[SourceSetCurves] {
        &self.by_source_set
    }

    /// Curves as configured for output: max-direction scaling, then
    /// truncation below the curve floor, then value format.
    pub fn export(&self) -> HazardExport {
        let config = &self.config;
        let finish = |imt: Imt, curve: &XySequence| {
            let mut curve = if config.max_direction() {
                apply_max_direction(curve, imt)
            } else {
                curve.clone()
            };
            if config.truncate_curves() {
                curve = truncate(&curve, config.curve_floor());
            }
            to_value_format(&curve, config.value_format(), config.timespan())
        };

        let curves = self.total
            .iter()
            .map(|(&imt, total)| {
                let by_type = self.by_type
                    .get(&imt)
                    .map(|types| types.iter().map(|(&t, c)| (t, finish(imt, c))).collect())
                    .unwrap_or_default();
                ImtCurves {
                    imt,
                    units: imt.units(),
                    value_format: config.value_format(),
                    total: finish(imt, total),
                    by_type
                }
            })
            .collect();

        HazardExport {
            site: self.site.label(),
            model: self.model.name().to_owned(),
            curves
        }
    }

    pub fn to_json(&self) -> Result<String, CalcError> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImtCurves {
    pub imt: Imt,
    pub units: &'static str,
    pub value_format: ValueFormat,
    pub total: XySequence,
    pub by_type: BTreeMap<SourceType, XySequence>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardExport {
    pub site: String,
    pub model: String,
    pub curves: Vec<ImtCurves>
}
