use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{
    Deserialize,
    Serialize
};

use crate::calc::calcerror::CalcError;
use crate::calc::disagg::disaggbins::DisaggBins;
use crate::calc::exceedancemodel::ExceedanceModel;
use crate::calc::executor::ThreadCount;
use crate::gmm::imt::Imt;
use crate::math::curve::xysequence::XySequence;

/// Lowest annual rate kept when curves are truncated on export.
pub const DEFAULT_CURVE_FLOOR: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueFormat {
    #[default]
    AnnualRate,
    PoissonProbability
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistributionFormat {
    #[default]
    Incremental,
    Cumulative
}

/// Earthquake-rate calculation options. Magnitude bin centres run from
/// `m_min` to `m_max` in steps of `m_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    pub m_min: f64,
    pub m_max: f64,
    pub m_delta: f64,
    pub distance: f64,
    pub timespan: f64,
    pub distribution_format: DistributionFormat,
    pub value_format: ValueFormat
}

impl Default for RateConfig {
    fn default() -> Self {
        RateConfig {
            m_min: 4.7,
            m_max: 9.4,
            m_delta: 0.1,
            distance: 20.0,
            timespan: 30.0,
            distribution_format: DistributionFormat::Incremental,
            value_format: ValueFormat::AnnualRate
        }
    }
}

impl RateConfig {
    pub fn magnitudes(&self) -> Vec<f64> {
        let n = ((self.m_max - self.m_min) / self.m_delta + 1e-6).floor() as usize + 1;
        (0..n).map(|i| self.m_min + i as f64 * self.m_delta).collect()
    }

    fn validate(&self) -> Result<(), CalcError> {
        CalcError::check_range("rate m_delta", self.m_delta, 0.0, 1.0)?;
        CalcError::check_range("rate m_max", self.m_max - self.m_min, 0.0, 10.0)?;
        CalcError::check_range("rate distance", self.distance, 0.0, 1000.0)?;
        CalcError::check_range("rate timespan", self.timespan, 0.0, 10000.0)?;
        Ok(())
    }
}

/// 計算設定。建構後不可變，以 `Arc` 在所有計算任務間共用。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcConfig {
    imts: Vec<Imt>,
    custom_imls: BTreeMap<Imt, Vec<f64>>,
    exceedance_model: ExceedanceModel,
    truncation_level: f64,
    max_distance: f64,
    value_format: ValueFormat,
    timespan: f64,
    truncate_curves: bool,
    curve_floor: f64,
    max_direction: bool,
    gmm_uncertainty: bool,
    threads: ThreadCount,
    disagg_bins: DisaggBins,
    return_period: f64,
    rate: RateConfig
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            imts: vec![Imt::PGA, Imt::SA0P2, Imt::SA1P0],
            custom_imls: BTreeMap::new(),
            exceedance_model: ExceedanceModel::TruncationUpperOnly,
            truncation_level: 3.0,
            max_distance: 300.0,
            value_format: ValueFormat::AnnualRate,
            timespan: 50.0,
            truncate_curves: false,
            curve_floor: DEFAULT_CURVE_FLOOR,
            max_direction: false,
            gmm_uncertainty: false,
            threads: ThreadCount::All,
            disagg_bins: DisaggBins::default(),
            return_period: 2475.0,
            rate: RateConfig::default()
        }
    }
}

/// Field-level overrides; absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalcConfigOverrides {
    pub imts: Option<Vec<Imt>>,
    pub custom_imls: Option<BTreeMap<Imt, Vec<f64>>>,
    pub exceedance_model: Option<ExceedanceModel>,
    pub truncation_level: Option<f64>,
    pub max_distance: Option<f64>,
    pub value_format: Option<ValueFormat>,
    pub timespan: Option<f64>,
    pub truncate_curves: Option<bool>,
    pub curve_floor: Option<f64>,
    pub max_direction: Option<bool>,
    pub gmm_uncertainty: Option<bool>,
    pub threads: Option<ThreadCount>,
    pub disagg_bins: Option<DisaggBins>,
    pub return_period: Option<f64>,
    pub rate: Option<RateConfig>
}

impl CalcConfig {
    pub fn builder() -> CalcConfigBuilder {
        CalcConfigBuilder { config: CalcConfig::default() }
    }

    /// `base` with `overrides` applied; overrides win where present.
    pub fn merge(base: &CalcConfig, overrides: &CalcConfigOverrides) -> Result<CalcConfig, CalcError> {
        CalcConfigBuilder::copy_of(base).extend(overrides.clone()).build()
    }

    /// Default configuration extended by the JSON overrides in `path`.
    pub fn from_reader(path: impl AsRef<Path>) -> Result<CalcConfig, CalcError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let overrides: CalcConfigOverrides = serde_json::from_reader(reader)?;
        CalcConfig::merge(&CalcConfig::default(), &overrides)
    }

    pub fn from_json(json_value: serde_json::Value) -> Result<CalcConfig, CalcError> {
        let overrides: CalcConfigOverrides = serde_json::from_value(json_value)?;
        CalcConfig::merge(&CalcConfig::default(), &overrides)
    }

    pub fn imts(&self) -> &[Imt] {
        &self.imts
    }

    /// Ground-motion levels of the hazard curve for `imt`, ascending.
    pub fn imls(&self, imt: Imt) -> Vec<f64> {
        self.custom_imls
            .get(&imt)
            .cloned()
            .unwrap_or_else(|| imt.default_imls())
    }

    /// Zero-valued curve over `ln(imls(imt))`.
    pub fn log_model_curve(&self, imt: Imt) -> Result<XySequence, CalcError> {
        let xs: Vec<f64> = self.imls(imt).iter().map(|x| x.ln()).collect();
        let ys = vec![0.0; xs.len()];
        Ok(XySequence::new(xs, ys)?)
    }

    pub fn exceedance_model(&self) -> ExceedanceModel {
        self.exceedance_model
    }

    pub fn truncation_level(&self) -> f64 {
        self.truncation_level
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn value_format(&self) -> ValueFormat {
        self.value_format
    }

    pub fn timespan(&self) -> f64 {
        self.timespan
    }

    pub fn truncate_curves(&self) -> bool {
        self.truncate_curves
    }

    pub fn curve_floor(&self) -> f64 {
        self.curve_floor
    }

    pub fn max_direction(&self) -> bool {
        self.max_direction
    }

    pub fn gmm_uncertainty(&self) -> bool {
        self.gmm_uncertainty
    }

    pub fn threads(&self) -> ThreadCount {
        self.threads
    }

    pub fn disagg_bins(&self) -> &DisaggBins {
        &self.disagg_bins
    }

    pub fn return_period(&self) -> f64 {
        self.return_period
    }

    pub fn rate(&self) -> &RateConfig {
        &self.rate
    }
}

pub struct CalcConfigBuilder {
    config: CalcConfig
}

impl CalcConfigBuilder {
    pub fn copy_of(base: &CalcConfig) -> CalcConfigBuilder {
        CalcConfigBuilder { config: base.clone() }
    }

    pub fn extend(mut self, overrides: CalcConfigOverrides) -> Self {
        let c = &mut self.config;
        if let Some(v) = overrides.imts { c.imts = v; }
        if let Some(v) = overrides.custom_imls { c.custom_imls.extend(v); }
        if let Some(v) = overrides.exceedance_model { c.exceedance_model = v; }
        if let Some(v) = overrides.truncation_level { c.truncation_level = v; }
        if let Some(v) = overrides.max_distance { c.max_distance = v; }
        if let Some(v) = overrides.value_format { c.value_format = v; }
        if let Some(v) = overrides.timespan { c.timespan = v; }
        if let Some(v) = overrides.truncate_curves { c.truncate_curves = v; }
        if let Some(v) = overrides.curve_floor { c.curve_floor = v; }
        if let Some(v) = overrides.max_direction { c.max_direction = v; }
        if let Some(v) = overrides.gmm_uncertainty { c.gmm_uncertainty = v; }
        if let Some(v) = overrides.threads { c.threads = v; }
        if let Some(v) = overrides.disagg_bins { c.disagg_bins = v; }
        if let Some(v) = overrides.return_period { c.return_period = v; }
        if let Some(v) = overrides.rate { c.rate = v; }
        self
    }

    pub fn imts(mut self, imts: impl IntoIterator<Item = Imt>) -> Self {
        self.config.imts = imts.into_iter().collect();
        self
    }

    pub fn imls(mut self, imt: Imt, imls: Vec<f64>) -> Self {
        self.config.custom_imls.insert(imt, imls);
        self
    }

    pub fn exceedance_model(mut self, model: ExceedanceModel) -> Self {
        self.config.exceedance_model = model;
        self
    }

    pub fn truncation_level(mut self, level: f64) -> Self {
        self.config.truncation_level = level;
        self
    }

    pub fn max_distance(mut self, distance: f64) -> Self {
        self.config.max_distance = distance;
        self
    }

    pub fn value_format(mut self, format: ValueFormat) -> Self {
        self.config.value_format = format;
        self
    }

    pub fn timespan(mut self, timespan: f64) -> Self {
        self.config.timespan = timespan;
        self
    }

    pub fn truncate_curves(mut self, floor: f64) -> Self {
        self.config.truncate_curves = true;
        self.config.curve_floor = floor;
        self
    }

    pub fn max_direction(mut self, enabled: bool) -> Self {
        self.config.max_direction = enabled;
        self
    }

    pub fn gmm_uncertainty(mut self, enabled: bool) -> Self {
        self.config.gmm_uncertainty = enabled;
        self
    }

    pub fn threads(mut self, threads: ThreadCount) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn disagg_bins(mut self, bins: DisaggBins) -> Self {
        self.config.disagg_bins = bins;
        self
    }

    pub fn return_period(mut self, years: f64) -> Self {
        self.config.return_period = years;
        self
    }

    pub fn rate(mut self, rate: RateConfig) -> Self {
        self.config.rate = rate;
        self
    }

    /// Validates every field before any calculation can see the config.
    pub fn build(self) -> Result<CalcConfig, CalcError> {
        let c = self.config;
        if c.imts.is_empty() {
            return Err(CalcError::InvalidRange { name: "imts", value: 0.0, min: 0.0, max: Imt::ALL.len() as f64 });
        }
        CalcError::check_range("max_distance", c.max_distance, 0.0, 1000.0)?;
        CalcError::check_range("timespan", c.timespan, 0.0, 10000.0)?;
        CalcError::check_range("truncation_level", c.truncation_level, 0.0, 10.0)?;
        CalcError::check_range("curve_floor", c.curve_floor, 0.0, 1.0 - f64::EPSILON)?;
        CalcError::check_range("return_period", c.return_period, 0.0, 1e6)?;
        for imls in c.custom_imls.values() {
            for &iml in imls {
                CalcError::check_range("iml", iml, 0.0, f64::MAX)?;
            }
        }
        for &imt in &c.imts {
            c.log_model_curve(imt)?;
        }
        c.disagg_bins.validate()?;
        c.rate.validate()?;
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::math::curve::curve::Curve;

    #[test]
    fn overrides_win_where_present() {
        let base = CalcConfig::builder().max_distance(200.0).timespan(30.0).build().unwrap();
        let overrides = CalcConfigOverrides {
            timespan: Some(50.0),
            imts: Some(vec![Imt::SA1P0]),
            ..CalcConfigOverrides::default()
        };
        let merged = CalcConfig::merge(&base, &overrides).unwrap();
        assert_eq!(merged.max_distance(), 200.0);
        assert_eq!(merged.timespan(), 50.0);
        assert_eq!(merged.imts(), &[Imt::SA1P0]);
        // base untouched
        assert_eq!(base.timespan(), 30.0);
    }

    #[test]
    fn invalid_ranges_fail_at_build() {
        assert!(matches!(
            CalcConfig::builder().max_distance(0.0).build(),
            Err(CalcError::InvalidRange { name: "max_distance", .. })
        ));
        assert!(CalcConfig::builder().timespan(-1.0).build().is_err());
        assert!(CalcConfig::builder().truncation_level(f64::NAN).build().is_err());
        assert!(CalcConfig::builder().imts(Vec::new()).build().is_err());
        assert!(CalcConfig::builder().imls(Imt::PGA, vec![0.2, 0.1]).build().is_err());
        assert!(CalcConfig::builder().imls(Imt::PGA, vec![0.0, 0.1]).build().is_err());
    }

    #[test]
    fn reads_json_overrides() {
        let config = CalcConfig::from_json(json!({
            "imts": ["PGA", "SA0P2"],
            "exceedance_model": "TruncationLowerUpper",
            "truncation_level": 2.0,
            "value_format": "PoissonProbability",
            "custom_imls": { "PGA": [0.01, 0.1, 1.0] },
            "rate": {
                "m_min": 5.0, "m_max": 8.0, "m_delta": 0.5, "distance": 50.0, "timespan": 50.0,
                "distribution_format": "Cumulative", "value_format": "PoissonProbability"
            }
        }))
        .unwrap();
        assert_eq!(config.imts(), &[Imt::PGA, Imt::SA0P2]);
        assert_eq!(config.exceedance_model(), ExceedanceModel::TruncationLowerUpper);
        assert_eq!(config.imls(Imt::PGA), vec![0.01, 0.1, 1.0]);
        assert_eq!(config.imls(Imt::SA0P2), Imt::SA0P2.default_imls());
        assert_eq!(config.rate().magnitudes(), vec![5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0]);
        assert!(CalcConfig::from_json(json!({ "no_such_field": 1 })).is_err());
    }

    #[test]
    fn log_model_curve_is_zero_over_ln_imls() {
        let config = CalcConfig::builder().imls(Imt::PGA, vec![0.1, 1.0]).build().unwrap();
        let curve = config.log_model_curve(Imt::PGA).unwrap();
        assert_eq!(curve.xs(), &[0.1f64.ln(), 0.0]);
        assert!(curve.is_clear());
    }
}
