use std::f64::consts::SQRT_2;

/// Standard normal complementary CDF, `P(Z > z)`.
pub fn ccdf(z: f64) -> f64 {
    0.5 * libm::erfc(z / SQRT_2)
}

/// Standard normal CDF, `P(Z <= z)`.
pub fn cdf(z: f64) -> f64 {
    0.5 * libm::erfc(-z / SQRT_2)
}
