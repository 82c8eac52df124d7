use crate::math::curve::curve::Curve;
use crate::math::curve::xysequence::XySequence;
use crate::model::modelerror::ModelError;

/// Incremental magnitude–frequency distribution: annual rate per
/// magnitude bin, magnitudes ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Mfd {
    data: XySequence
}

impl Mfd {
    pub fn incremental(magnitudes: Vec<f64>, rates: Vec<f64>) -> Result<Mfd, ModelError> {
        for &rate in &rates {
            ModelError::check_range("rate", rate, 0.0, f64::INFINITY)?;
        }
        Ok(Mfd { data: XySequence::new(magnitudes, rates)? })
    }

    /// One magnitude with the given annual rate.
    pub fn single(magnitude: f64, rate: f64) -> Result<Mfd, ModelError> {
        Mfd::incremental(vec![magnitude], vec![rate])
    }

    /// Truncated Gutenberg–Richter with bin centres `m_min, m_min + Δm, …`
    /// up to `m_max`. Each bin carries `10^(a − b·m)` integrated over
    /// `[m − Δm/2, m + Δm/2)`, so `a` is the log10 cumulative rate at M 0.
    pub fn gutenberg_richter(a: f64, b: f64, m_min: f64, m_max: f64, delta: f64) -> Result<Mfd, ModelError> {
        ModelError::check_range("delta", delta, 1e-3, 1.0)?;
        if !(m_max >= m_min) {
            return Err(ModelError::InvalidRange { name: "m_max", value: m_max, min: m_min, max: 10.0 });
        }
        let count = ((m_max - m_min) / delta + 1e-6).floor() as usize + 1;
        let magnitudes: Vec<f64> = (0..count).map(|i| m_min + i as f64 * delta).collect();
        let rates = magnitudes
            .iter()
            .map(|&m| 10f64.powf(a - b * (m - 0.5 * delta)) - 10f64.powf(a - b * (m + 0.5 * delta)))
            .collect();
        Mfd::incremental(magnitudes, rates)
    }

    pub fn magnitudes(&self) -> &[f64] {
        self.data.xs()
    }

    pub fn rates(&self) -> &[f64] {
        self.data.ys()
    }

    pub fn total_rate(&self) -> f64 {
        self.data.ys().iter().sum()
    }

    /// `(magnitude, rate)` pairs with non-zero rate.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.magnitudes()
            .iter()
            .copied()
            .zip(self.rates().iter().copied())
            .filter(|&(_, rate)| rate > 0.0)
    }

    /// Same shape with every rate multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Mfd {
        Mfd { data: self.data.map_y(|y| y * scale) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gutenberg_richter_total_matches_cumulative() {
        let mfd = Mfd::gutenberg_richter(4.0, 1.0, 5.05, 6.95, 0.1).unwrap();
        assert_eq!(mfd.magnitudes().len(), 20);
        let expected = 10f64.powf(4.0 - 5.0) - 10f64.powf(4.0 - 7.0);
        assert_relative_eq!(mfd.total_rate(), expected, max_relative = 1e-12);
        assert!(mfd.rates().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn single_and_scaled() {
        let mfd = Mfd::single(7.0, 0.01).unwrap().scaled(0.5);
        assert_eq!(mfd.bins().collect::<Vec<_>>(), vec![(7.0, 0.005)]);
    }

    #[test]
    fn rejects_negative_rates() {
        assert!(Mfd::incremental(vec![5.0, 6.0], vec![1e-3, -1e-4]).is_err());
        assert!(Mfd::gutenberg_richter(4.0, 1.0, 7.0, 6.0, 0.1).is_err());
    }
}
