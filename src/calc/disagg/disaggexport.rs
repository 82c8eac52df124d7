use serde::Serialize;

use crate::calc::calcerror::CalcError;
use crate::calc::disagg::disaggbins::{
    DisaggBins,
    EpsilonBin
};
use crate::calc::disagg::disaggdataset::{
    DisaggDataset,
    ModalBin,
    SourceContribution
};
use crate::calc::disagg::disaggregation::{
    DisaggSummary,
    Disaggregation,
    ImtDisagg
};
use crate::gmm::imt::Imt;
use crate::math::round::{
    round,
    round_significant
};

// ─────────────────────────────────────────────────────────────────────────────
// JSON 輸出
// ─────────────────────────────────────────────────────────────────────────────
//
// 純函式：只讀取已完成的 bin 資料，不重新計算。
//   to_json          完整輸出（含 source 貢獻），pretty print
//   to_json_compact  只保留非零 (r, m) 列，數值四捨五入

/// Number of sources listed per IMT.
const SOURCE_LIMIT: usize = 20;

#[derive(Serialize)]
struct EpsilonValue {
    id: usize,
    value: f64
}

#[derive(Serialize)]
struct RmData {
    r: f64,
    m: f64,
    percent: f64,
    eps: Vec<EpsilonValue>
}

#[derive(Serialize)]
struct SourceJson<'a> {
    name: &'a str,
    source_set: &'a str,
    source_type: String,
    percent: f64,
    r: f64,
    m: f64,
    e: f64
}

#[derive(Serialize)]
struct ImtJson<'a> {
    imt: Imt,
    iml: f64,
    return_period: f64,
    summary: DisaggSummary,
    modal: Option<ModalBin>,
    dominant_source: Option<SourceJson<'a>>,
    sources: Vec<SourceJson<'a>>,
    data: Vec<RmData>
}

#[derive(Serialize)]
struct DisaggJson<'a> {
    site: String,
    bins: &'a DisaggBins,
    eps_bins: Vec<EpsilonBin>,
    disaggs: Vec<ImtJson<'a>>
}

#[derive(Serialize)]
struct ImtCompactJson {
    imt: Imt,
    iml: f64,
    summary: [f64; 4],
    /// `[r, m, percent per ε bin…]` for every non-empty (r, m) cell.
    data: Vec<Vec<f64>>
}

#[derive(Serialize)]
struct DisaggCompactJson {
    site: String,
    eps_bins: usize,
    disaggs: Vec<ImtCompactJson>
}

fn source_json<'a>(source: &'a SourceContribution, total_rate: f64) -> SourceJson<'a> {
    SourceJson {
        name: &source.name,
        source_set: &source.source_set,
        source_type: source.source_type.to_string(),
        percent: if total_rate > 0.0 { 100.0 * source.rate / total_rate } else { 0.0 },
        r: source.mean_r(),
        m: source.mean_m(),
        e: source.mean_e()
    }
}

fn rm_data(dataset: &DisaggDataset) -> Vec<RmData> {
    let bins = dataset.bins();
    let (r_centers, m_centers) = (bins.r_centers(), bins.m_centers());
    let (nr, nm, ne) = dataset.dimensions();
    let mut data = Vec::new();
    for ri in 0..nr {
        for mi in 0..nm {
            if dataset.rm_rate(ri, mi) <= 0.0 {
                continue;
            }
            let eps: Vec<EpsilonValue> = (0..ne)
                .map(|ei| EpsilonValue { id: ei, value: dataset.percent(ri, mi, ei) })
                .collect();
            data.push(RmData {
                r: r_centers[ri],
                m: m_centers[mi],
                percent: eps.iter().map(|e| e.value).sum(),
                eps
            });
        }
    }
    data
}

fn imt_json(disagg: &ImtDisagg) -> ImtJson<'_> {
    let total_rate = disagg.dataset.total_rate();
    ImtJson {
        imt: disagg.imt,
        iml: disagg.iml,
        return_period: disagg.return_period(),
        summary: disagg.summary(),
        modal: disagg.dataset.modal(),
        dominant_source: disagg.dominant_source().map(|s| source_json(s, total_rate)),
        sources: disagg.sources
            .iter()
            .take(SOURCE_LIMIT)
            .map(|s| source_json(s, total_rate))
            .collect(),
        data: rm_data(&disagg.dataset)
    }
}

fn imt_compact_json(disagg: &ImtDisagg) -> ImtCompactJson {
    let summary = disagg.summary();
    let data = rm_data(&disagg.dataset)
        .into_iter()
        .map(|rm| {
            let mut row = vec![rm.r, round(rm.m, 2)];
            row.extend(rm.eps.iter().map(|e| round(e.value, 3)));
            row
        })
        .collect();
    ImtCompactJson {
        imt: disagg.imt,
        iml: round_significant(disagg.iml, 4),
        summary: [
            round(summary.mean_r, 2),
            round(summary.mean_m, 2),
            round(summary.mean_e, 2),
            round(summary.recovered, 2)
        ],
        data
    }
}

impl Disaggregation {
    pub fn to_json(&self) -> Result<String, CalcError> {
        let json = DisaggJson {
            site: self.site.label(),
            bins: &self.bins,
            eps_bins: self.bins.epsilon_bins(),
            disaggs: self.results.values().map(imt_json).collect()
        };
        Ok(serde_json::to_string_pretty(&json)?)
    }

    pub fn to_json_compact(&self) -> Result<String, CalcError> {
        let json = DisaggCompactJson {
            site: self.site.label(),
            eps_bins: self.bins.e_count(),
            disaggs: self.results.values().map(imt_compact_json).collect()
        };
        Ok(serde_json::to_string(&json)?)
    }
}
