use serde::Serialize;

/// Natural-log mean and standard deviation of a ground motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarGroundMotion {
    mean: f64,
    sigma: f64
}

impl ScalarGroundMotion {
    pub fn new(mean: f64, sigma: f64) -> ScalarGroundMotion {
        ScalarGroundMotion { mean, sigma }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Median ground motion in linear units.
    pub fn median(&self) -> f64 {
        self.mean.exp()
    }

    pub fn with_mean(&self, mean: f64) -> ScalarGroundMotion {
        ScalarGroundMotion { mean, sigma: self.sigma }
    }

    /// Number of standard deviations `ln_level` lies above the mean.
    pub fn epsilon(&self, ln_level: f64) -> f64 {
        (ln_level - self.mean) / self.sigma
    }
}
