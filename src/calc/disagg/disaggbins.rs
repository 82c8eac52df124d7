use serde::{
    Deserialize,
    Serialize
};

use crate::calc::calcerror::CalcError;

/// Distance, magnitude and epsilon bin edges for disaggregation.
///
/// Bins are half-open `[lo, hi)`; a value equal to the axis maximum falls in
/// the last bin. Distances and magnitudes outside `[min, max]` are not
/// binned. Epsilon values outside the range are clamped into the end bins,
/// which therefore read as open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisaggBins {
    pub r_min: f64,
    pub r_max: f64,
    pub r_delta: f64,
    pub m_min: f64,
    pub m_max: f64,
    pub m_delta: f64,
    pub e_min: f64,
    pub e_max: f64,
    pub e_delta: f64
}

impl Default for DisaggBins {
    fn default() -> Self {
        DisaggBins {
            r_min: 0.0,
            r_max: 1000.0,
            r_delta: 20.0,
            m_min: 4.4,
            m_max: 9.4,
            m_delta: 0.2,
            e_min: -3.0,
            e_max: 3.0,
            e_delta: 0.5
        }
    }
}

/// Epsilon bin metadata; `None` marks an open end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpsilonBin {
    pub id: usize,
    pub min: Option<f64>,
    pub max: Option<f64>
}

// Bin-width fraction absorbed at an edge, so `min + i·delta` lands in bin `i`.
const EDGE_TOLERANCE: f64 = 1e-9;

fn count(min: f64, max: f64, delta: f64) -> usize {
    (((max - min) / delta) - EDGE_TOLERANCE).ceil().max(1.0) as usize
}

fn index(value: f64, min: f64, max: f64, delta: f64, n: usize) -> Option<usize> {
    if !(value >= min && value <= max) {
        return None;
    }
    Some((((value - min) / delta + EDGE_TOLERANCE).floor() as usize).min(n - 1))
}

impl DisaggBins {
    pub fn validate(&self) -> Result<(), CalcError> {
        for (name, min, max, delta) in [
            ("r_delta", self.r_min, self.r_max, self.r_delta),
            ("m_delta", self.m_min, self.m_max, self.m_delta),
            ("e_delta", self.e_min, self.e_max, self.e_delta)
        ] {
            let span = max - min;
            if !(span > 0.0) {
                return Err(CalcError::InvalidRange { name, value: span, min: 0.0, max: f64::INFINITY });
            }
            CalcError::check_range(name, delta, 0.0, span)?;
        }
        if self.r_min < 0.0 {
            return Err(CalcError::InvalidRange { name: "r_min", value: self.r_min, min: 0.0, max: self.r_max });
        }
        Ok(())
    }

    pub fn r_count(&self) -> usize {
        count(self.r_min, self.r_max, self.r_delta)
    }

    pub fn m_count(&self) -> usize {
        count(self.m_min, self.m_max, self.m_delta)
    }

    pub fn e_count(&self) -> usize {
        count(self.e_min, self.e_max, self.e_delta)
    }

    pub fn r_index(&self, r: f64) -> Option<usize> {
        index(r, self.r_min, self.r_max, self.r_delta, self.r_count())
    }

    pub fn m_index(&self, m: f64) -> Option<usize> {
        index(m, self.m_min, self.m_max, self.m_delta, self.m_count())
    }

    /// Always returns a bin; NaN lands in the first.
    pub fn e_index(&self, e: f64) -> usize {
        let clamped = if e.is_nan() { self.e_min } else { e.clamp(self.e_min, self.e_max) };
        index(clamped, self.e_min, self.e_max, self.e_delta, self.e_count()).unwrap_or(0)
    }

    pub fn r_centers(&self) -> Vec<f64> {
        centers(self.r_min, self.r_max, self.r_delta, self.r_count())
    }

    pub fn m_centers(&self) -> Vec<f64> {
        centers(self.m_min, self.m_max, self.m_delta, self.m_count())
    }

    pub fn epsilon_bins(&self) -> Vec<EpsilonBin> {
        let n = self.e_count();
        (0..n)
            .map(|id| EpsilonBin {
                id,
                min: (id > 0).then(|| self.e_min + id as f64 * self.e_delta),
                max: (id + 1 < n).then(|| self.e_min + (id + 1) as f64 * self.e_delta)
            })
            .collect()
    }
}

fn centers(min: f64, max: f64, delta: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let lo = min + i as f64 * delta;
            0.5 * (lo + (lo + delta).min(max))
        })
        .collect()
}
