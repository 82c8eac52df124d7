use std::collections::BTreeMap;
use std::sync::Arc;

use nalgebra::DMatrix;
use serde::Deserialize;

use crate::gmm::gmmerror::GmmError;
use crate::gmm::gmminput::GmmInput;
use crate::gmm::gmmutils::{
    ceus_mean_clip,
    ceus_site_adjustment
};
use crate::gmm::groundmotionmodel::{
    Gmm,
    GroundMotionModel
};
use crate::gmm::imt::Imt;
use crate::gmm::scalargroundmotion::ScalarGroundMotion;

// ─────────────────────────────────────────────────────────────────────────────
// GroundMotionTable
// ─────────────────────────────────────────────────────────────────────────────
//
// 以 (log10 距離, 規模) 為網格的自然對數中值表，列為距離、欄為規模。
// 查表使用雙線性內插；超出網格的距離或規模一律夾回邊界（不外插），
// 因此任何有限輸入都不會產生 NaN。

#[derive(Debug, Clone, PartialEq)]
pub struct GroundMotionTable {
    log_distances: Vec<f64>,
    magnitudes: Vec<f64>,
    values: DMatrix<f64>
}

impl GroundMotionTable {
    /// `distances` in km (ascending, positive), `magnitudes` ascending,
    /// `values` natural-log medians with one row per distance.
    pub fn new(distances: &[f64], magnitudes: Vec<f64>, values: DMatrix<f64>) -> Result<GroundMotionTable, GmmError> {
        if distances.is_empty() || magnitudes.is_empty() {
            return Err(GmmError::InvalidTable("empty distance or magnitude axis".to_owned()));
        }
        if distances.iter().any(|&r| !(r > 0.0)) {
            return Err(GmmError::InvalidTable("distances must be positive".to_owned()));
        }
        if !strictly_ascending(distances) || !strictly_ascending(&magnitudes) {
            return Err(GmmError::InvalidTable("axes must be strictly ascending".to_owned()));
        }
        if values.nrows() != distances.len() || values.ncols() != magnitudes.len() {
            return Err(GmmError::InvalidTable(format!(
                "expected {}x{} values, found {}x{}",
                distances.len(), magnitudes.len(), values.nrows(), values.ncols()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GmmError::InvalidTable("values must be finite".to_owned()));
        }
        Ok(GroundMotionTable {
            log_distances: distances.iter().map(|r| r.log10()).collect(),
            magnitudes,
            values
        })
    }

    /// Samples `f(distance, magnitude)` over the grid.
    pub fn from_fn(distances: &[f64], magnitudes: Vec<f64>, f: impl Fn(f64, f64) -> f64) -> Result<GroundMotionTable, GmmError> {
        let values = DMatrix::from_fn(distances.len(), magnitudes.len(), |i, j| f(distances[i], magnitudes[j]));
        GroundMotionTable::new(distances, magnitudes, values)
    }

    pub fn get(&self, distance: f64, magnitude: f64) -> f64 {
        let log_r = distance.max(f64::MIN_POSITIVE).log10();
        let (i, wr) = bracket(&self.log_distances, log_r);
        let (j, wm) = bracket(&self.magnitudes, magnitude);

        let i2 = (i + 1).min(self.log_distances.len() - 1);
        let j2 = (j + 1).min(self.magnitudes.len() - 1);
        let v11 = self.values[(i, j)];
        let v12 = self.values[(i, j2)];
        let v21 = self.values[(i2, j)];
        let v22 = self.values[(i2, j2)];

        let lo = v11 + wm * (v12 - v11);
        let hi = v21 + wm * (v22 - v21);
        lo + wr * (hi - lo)
    }
}

fn strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// Lower grid index and fractional weight toward the next node, clamped to
/// the grid. NaN maps to the first node.
fn bracket(axis: &[f64], x: f64) -> (usize, f64) {
    let n = axis.len();
    if n == 1 || x.is_nan() || x <= axis[0] {
        return (0, 0.0);
    }
    if x >= axis[n - 1] {
        return (n - 2, 1.0);
    }
    let i = axis.partition_point(|&v| v <= x) - 1;
    (i, (x - axis[i]) / (axis[i + 1] - axis[i]))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sigma
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TableSigma {
    Fixed { sigma: f64 },
    /// `below` for magnitudes under `threshold`, `above` otherwise.
    MagnitudeThreshold { below: f64, above: f64, threshold: f64 }
}

impl TableSigma {
    pub fn value(&self, mw: f64) -> f64 {
        match *self {
            TableSigma::Fixed { sigma } => sigma,
            TableSigma::MagnitudeThreshold { below, above, threshold } => {
                if mw < threshold { below } else { above }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TableGmmSet / TableGmm
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TableEntry {
    table: Arc<GroundMotionTable>,
    sigma: TableSigma
}

/// A named table-based model: one table and sigma form per supported IMT.
///
/// With `ceus` set, medians receive the CEUS firm-rock adjustment and the
/// CEUS clip, and tables are taken to describe hard-rock motions.
#[derive(Debug, Clone)]
pub struct TableGmmSet {
    name: String,
    ceus: bool,
    entries: BTreeMap<Imt, TableEntry>
}

#[derive(Deserialize)]
struct TableJsonProp {
    imt: Imt,
    distances: Vec<f64>,
    magnitudes: Vec<f64>,
    values: Vec<Vec<f64>>,
    sigma: TableSigma
}

#[derive(Deserialize)]
struct TableGmmSetJsonProp {
    name: String,
    #[serde(default)]
    ceus: bool,
    tables: Vec<TableJsonProp>
}

impl TableGmmSet {
    pub fn new(name: impl Into<String>, ceus: bool) -> TableGmmSet {
        TableGmmSet { name: name.into(), ceus, entries: BTreeMap::new() }
    }

    pub fn with_table(mut self, imt: Imt, table: GroundMotionTable, sigma: TableSigma) -> TableGmmSet {
        self.entries.insert(imt, TableEntry { table: Arc::new(table), sigma });
        self
    }

    pub fn from_json(json_value: serde_json::Value) -> Result<TableGmmSet, GmmError> {
        let json_prop: TableGmmSetJsonProp = serde_json::from_value(json_value)
            .map_err(|error| GmmError::InvalidTable(error.to_string()))?;
        let mut set = TableGmmSet::new(json_prop.name, json_prop.ceus);
        for prop in json_prop.tables {
            let rows = prop.values.len();
            let cols = prop.magnitudes.len();
            if prop.values.iter().any(|row| row.len() != cols) {
                return Err(GmmError::InvalidTable(format!("{}: ragged value rows", prop.imt)));
            }
            let values = DMatrix::from_fn(rows, cols, |i, j| prop.values[i][j]);
            let table = GroundMotionTable::new(&prop.distances, prop.magnitudes, values)?;
            set = set.with_table(prop.imt, table, prop.sigma);
        }
        Ok(set)
    }

    /// Tabulates the medians of a closed-form model at hard-rock conditions
    /// (Vs30 2000). Sigma is not carried over and must be supplied.
    pub fn sampled(
        name: impl Into<String>,
        source: &Gmm,
        imts: &[Imt],
        distances: &[f64],
        magnitudes: &[f64],
        sigma: TableSigma,
        ceus: bool
    ) -> Result<TableGmmSet, GmmError> {
        let mut set = TableGmmSet::new(name, ceus);
        for &imt in imts {
            let model = source.instance(imt)?;
            let table = GroundMotionTable::from_fn(distances, magnitudes.to_vec(), |r, m| {
                let input = GmmInput::builder().mag(m).distances(r, r, r).vs30(2000.0, false).build();
                model.calc(&input).mean()
            })?;
            set = set.with_table(imt, table, sigma);
        }
        Ok(set)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supported_imts(&self) -> Vec<Imt> {
        self.entries.keys().copied().collect()
    }

    pub fn instance(&self, imt: Imt) -> Result<TableGmm, GmmError> {
        let entry = self.entries
            .get(&imt)
            .ok_or_else(|| GmmError::UnsupportedImt { gmm: self.name.clone(), imt })?;
        Ok(TableGmm {
            imt,
            table: entry.table.clone(),
            sigma: entry.sigma,
            ceus: self.ceus
        })
    }
}

/// Table-lookup evaluator for one IMT. Medians are looked up by rupture
/// distance and magnitude.
pub struct TableGmm {
    imt: Imt,
    table: Arc<GroundMotionTable>,
    sigma: TableSigma,
    ceus: bool
}

impl GroundMotionModel for TableGmm {
    fn imt(&self) -> Imt {
        self.imt
    }

    fn calc(&self, input: &GmmInput) -> ScalarGroundMotion {
        let mut mean = self.table.get(input.r_rup, input.mw);
        if self.ceus {
            mean += ceus_site_adjustment(self.imt, input.vs30);
            mean = ceus_mean_clip(self.imt, mean);
        }
        ScalarGroundMotion::new(mean, self.sigma.value(input.mw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn linear_table() -> GroundMotionTable {
        // ln y = m − log10(r)
        GroundMotionTable::from_fn(&[1.0, 10.0, 100.0], vec![5.0, 6.0, 7.0], |r, m| m - r.log10()).unwrap()
    }

    #[test]
    fn bilinear_lookup() {
        let table = linear_table();
        assert_relative_eq!(table.get(10.0, 6.0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(table.get(10f64.powf(1.5), 6.5), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn lookup_clamps_outside_grid() {
        let table = linear_table();
        assert_relative_eq!(table.get(1000.0, 8.0), table.get(100.0, 7.0), epsilon = 1e-12);
        assert_relative_eq!(table.get(0.0, 4.0), table.get(1.0, 5.0), epsilon = 1e-12);
        assert!(table.get(f64::INFINITY, 6.0).is_finite());
    }

    #[test]
    fn nan_inputs_fall_back_to_first_node() {
        let table = linear_table();
        assert_eq!(table.get(f64::NAN, 6.0), table.get(1.0, 6.0));
        assert_eq!(table.get(10.0, f64::NAN), table.get(10.0, 5.0));
        assert_eq!(bracket(&[0.0, 1.0, 2.0], f64::NAN), (0, 0.0));
    }

    #[test]
    fn rejects_bad_tables() {
        let values = DMatrix::from_element(2, 2, 0.0);
        assert!(GroundMotionTable::new(&[10.0, 1.0], vec![5.0, 6.0], values.clone()).is_err());
        assert!(GroundMotionTable::new(&[1.0, 10.0, 100.0], vec![5.0, 6.0], values.clone()).is_err());
        assert!(GroundMotionTable::new(&[0.0, 10.0], vec![5.0, 6.0], values).is_err());
    }

    #[test]
    fn loads_from_json() {
        let json = json!({
            "name": "Frankel96",
            "ceus": true,
            "tables": [{
                "imt": "PGA",
                "distances": [1.0, 10.0, 100.0],
                "magnitudes": [5.0, 7.0],
                "values": [[-1.0, 0.0], [-2.0, -1.0], [-4.0, -3.0]],
                "sigma": { "type": "Fixed", "sigma": 0.75 }
            }]
        });
        let set = TableGmmSet::from_json(json).unwrap();
        assert_eq!(set.supported_imts(), vec![Imt::PGA]);
        let gmm = Gmm::Tabulated(Arc::new(set));
        assert_eq!(gmm.name(), "Frankel96");
        assert!(gmm.instance(Imt::SA1P0).is_err());

        let model = gmm.instance(Imt::PGA).unwrap();
        let input = GmmInput::builder().mag(6.0).distances(10.0, 10.0, 10.0).vs30(2000.0, false).build();
        let sgm = model.calc(&input);
        assert_relative_eq!(sgm.mean(), -1.5, epsilon = 1e-12);
        assert_eq!(sgm.sigma(), 0.75);
    }

    #[test]
    fn sampled_table_reproduces_source_at_nodes() {
        let distances = [1.0, 5.0, 10.0, 50.0, 100.0, 500.0];
        let magnitudes = [5.0, 6.0, 7.0, 8.0];
        let sigma = TableSigma::MagnitudeThreshold { below: 0.8, above: 0.7, threshold: 7.0 };
        let set = TableGmmSet::sampled("Toro97Table", &Gmm::Toro97, &[Imt::SA1P0], &distances, &magnitudes, sigma, false).unwrap();
        let table_model = set.instance(Imt::SA1P0).unwrap();
        let closed = Gmm::Toro97.instance(Imt::SA1P0).unwrap();

        let input = GmmInput::builder().mag(7.0).distances(50.0, 50.0, 50.0).vs30(2000.0, false).build();
        assert_relative_eq!(table_model.calc(&input).mean(), closed.calc(&input).mean(), epsilon = 1e-12);
        assert_eq!(table_model.calc(&input).sigma(), 0.7);
        let small = GmmInput::builder().mag(6.0).build();
        assert_eq!(table_model.calc(&small).sigma(), 0.8);
    }
}
