use serde::Serialize;

use crate::calc::disagg::disaggbins::DisaggBins;
use crate::model::sourcetype::SourceType;

/// Rate-weighted contribution of one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceContribution {
    pub name: String,
    pub source_set: String,
    pub source_type: SourceType,
    pub rate: f64,
    r_sum: f64,
    m_sum: f64,
    e_sum: f64
}

impl SourceContribution {
    pub(crate) fn new(name: &str, source_set: &str, source_type: SourceType) -> SourceContribution {
        SourceContribution {
            name: name.to_owned(),
            source_set: source_set.to_owned(),
            source_type,
            rate: 0.0,
            r_sum: 0.0,
            m_sum: 0.0,
            e_sum: 0.0
        }
    }

    pub(crate) fn add(&mut self, r: f64, m: f64, e: f64, rate: f64) {
        self.rate += rate;
        self.r_sum += r * rate;
        self.m_sum += m * rate;
        self.e_sum += e * rate;
    }

    pub fn mean_r(&self) -> f64 {
        weighted_mean(self.r_sum, self.rate)
    }

    pub fn mean_m(&self) -> f64 {
        weighted_mean(self.m_sum, self.rate)
    }

    pub fn mean_e(&self) -> f64 {
        weighted_mean(self.e_sum, self.rate)
    }
}

fn weighted_mean(sum: f64, weight: f64) -> f64 {
    if weight > 0.0 { sum / weight } else { 0.0 }
}

/// Most-contributing (r, m, ε) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModalBin {
    pub r_index: usize,
    pub m_index: usize,
    pub e_index: usize,
    pub r: f64,
    pub m: f64,
    pub percent: f64
}

/// (r, m, ε) grid of exceedance-rate contributions at one ground-motion
/// level.
///
/// Contributions whose distance or magnitude lies outside the bins still
/// count toward `total_rate` and the means, but not toward any cell;
/// [`DisaggDataset::recovered`] reports the binned share.
#[derive(Debug, Clone, PartialEq)]
pub struct DisaggDataset {
    bins: DisaggBins,
    r_count: usize,
    m_count: usize,
    e_count: usize,
    cells: Vec<f64>,
    binned_rate: f64,
    total_rate: f64,
    r_sum: f64,
    m_sum: f64,
    e_sum: f64
}

impl DisaggDataset {
    pub(crate) fn new(bins: &DisaggBins) -> DisaggDataset {
        let (r_count, m_count, e_count) = (bins.r_count(), bins.m_count(), bins.e_count());
        DisaggDataset {
            bins: *bins,
            r_count,
            m_count,
            e_count,
            cells: vec![0.0; r_count * m_count * e_count],
            binned_rate: 0.0,
            total_rate: 0.0,
            r_sum: 0.0,
            m_sum: 0.0,
            e_sum: 0.0
        }
    }

    fn offset(&self, r: usize, m: usize, e: usize) -> usize {
        (r * self.m_count + m) * self.e_count + e
    }

    pub(crate) fn add(&mut self, r: f64, m: f64, e: f64, rate: f64) {
        self.total_rate += rate;
        self.r_sum += r * rate;
        self.m_sum += m * rate;
        self.e_sum += e * rate;
        if let (Some(ri), Some(mi)) = (self.bins.r_index(r), self.bins.m_index(m)) {
            let ei = self.bins.e_index(e);
            let offset = self.offset(ri, mi, ei);
            self.cells[offset] += rate;
            self.binned_rate += rate;
        }
    }

    /// Cell-wise sum; both datasets share the same bins.
    pub(crate) fn merge(&mut self, other: &DisaggDataset) {
        debug_assert_eq!(self.bins, other.bins);
        for (a, b) in self.cells.iter_mut().zip(&other.cells) {
            *a += b;
        }
        self.binned_rate += other.binned_rate;
        self.total_rate += other.total_rate;
        self.r_sum += other.r_sum;
        self.m_sum += other.m_sum;
        self.e_sum += other.e_sum;
    }

    pub fn bins(&self) -> &DisaggBins {
        &self.bins
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.r_count, self.m_count, self.e_count)
    }

    pub fn rate(&self, r: usize, m: usize, e: usize) -> f64 {
        self.cells[self.offset(r, m, e)]
    }

    /// Share of the binned rate in one cell, in percent. Zero everywhere when
    /// nothing was binned.
    pub fn percent(&self, r: usize, m: usize, e: usize) -> f64 {
        if self.binned_rate > 0.0 {
            100.0 * self.rate(r, m, e) / self.binned_rate
        } else {
            0.0
        }
    }

    /// Rate summed over epsilon for one (r, m) cell.
    pub fn rm_rate(&self, r: usize, m: usize) -> f64 {
        let start = self.offset(r, m, 0);
        self.cells[start..start + self.e_count].iter().sum()
    }

    pub fn binned_rate(&self) -> f64 {
        self.binned_rate
    }

    pub fn total_rate(&self) -> f64 {
        self.total_rate
    }

    /// Binned share of the total rate, in percent.
    pub fn recovered(&self) -> f64 {
        if self.total_rate > 0.0 {
            100.0 * self.binned_rate / self.total_rate
        } else {
            0.0
        }
    }

    pub fn mean_r(&self) -> f64 {
        weighted_mean(self.r_sum, self.total_rate)
    }

    pub fn mean_m(&self) -> f64 {
        weighted_mean(self.m_sum, self.total_rate)
    }

    pub fn mean_e(&self) -> f64 {
        weighted_mean(self.e_sum, self.total_rate)
    }

    /// Largest cell; ties go to the first in (r, m, ε) order. `None` when
    /// nothing was binned.
    pub fn modal(&self) -> Option<ModalBin> {
        if self.binned_rate <= 0.0 {
            return None;
        }
        let mut best = 0;
        for (i, &rate) in self.cells.iter().enumerate() {
            if rate > self.cells[best] {
                best = i;
            }
        }
        let e_index = best % self.e_count;
        let m_index = (best / self.e_count) % self.m_count;
        let r_index = best / (self.e_count * self.m_count);
        Some(ModalBin {
            r_index,
            m_index,
            e_index,
            r: self.bins.r_centers()[r_index],
            m: self.bins.m_centers()[m_index],
            percent: self.percent(r_index, m_index, e_index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentages_sum_to_one_hundred() {
        let bins = DisaggBins::default();
        let mut dataset = DisaggDataset::new(&bins);
        dataset.add(10.0, 6.0, 0.3, 2e-4);
        dataset.add(55.0, 7.1, -1.2, 1e-4);
        dataset.add(55.0, 7.1, 5.0, 1e-5);
        let (nr, nm, ne) = dataset.dimensions();
        let mut sum = 0.0;
        for r in 0..nr {
            for m in 0..nm {
                for e in 0..ne {
                    sum += dataset.percent(r, m, e);
                }
            }
        }
        assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        assert_relative_eq!(dataset.recovered(), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_dataset_reports_zero() {
        let dataset = DisaggDataset::new(&DisaggBins::default());
        assert_eq!(dataset.percent(0, 0, 0), 0.0);
        assert_eq!(dataset.mean_r(), 0.0);
        assert_eq!(dataset.recovered(), 0.0);
        assert_eq!(dataset.modal(), None);
    }

    #[test]
    fn out_of_range_contributions_are_counted_not_binned() {
        let mut dataset = DisaggDataset::new(&DisaggBins::default());
        dataset.add(10.0, 6.0, 0.0, 3e-4);
        dataset.add(1500.0, 6.0, 0.0, 1e-4);
        assert_relative_eq!(dataset.total_rate(), 4e-4, epsilon = 1e-18);
        assert_relative_eq!(dataset.binned_rate(), 3e-4, epsilon = 1e-18);
        assert_relative_eq!(dataset.recovered(), 75.0, epsilon = 1e-9);
        assert_relative_eq!(dataset.mean_r(), (10.0 * 3.0 + 1500.0) / 4.0, epsilon = 1e-9);
    }

    #[test]
    fn modal_bin_and_merge() {
        let bins = DisaggBins::default();
        let mut a = DisaggDataset::new(&bins);
        a.add(30.0, 6.5, 1.1, 1e-4);
        let mut b = DisaggDataset::new(&bins);
        b.add(30.0, 6.5, 1.1, 2e-4);
        b.add(90.0, 7.5, -0.4, 2.5e-4);
        a.merge(&b);
        let modal = a.modal().unwrap();
        assert_eq!((modal.r_index, modal.m_index, modal.e_index), (1, 10, 8));
        assert_relative_eq!(modal.r, 30.0);
        assert_relative_eq!(a.rm_rate(1, 10), 3e-4, epsilon = 1e-18);
    }
}
