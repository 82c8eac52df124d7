/// Rounds `x` to `digits` decimal places, ties to even.
pub fn round(x: f64, digits: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // 分兩段相乘，避免 10^digits 溢位
    let (pow1, pow2) = if digits > 22 {
        (10f64.powi((digits - 22) as i32), 1e22)
    } else {
        (10f64.powi(digits as i32), 1.0)
    };

    let y = (x * pow1) * pow2;
    let mut z = y.round();
    if (y - z).abs() == 0.5 {
        z = 2.0 * (y / 2.0).round();
    }
    (z / pow2) / pow1
}

/// Rounds `x` to `digits` significant figures; used for exported rates that
/// span many orders of magnitude.
pub fn round_significant(x: f64, digits: u32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let scale = digits as i32 - 1 - magnitude;
    if scale >= 0 {
        round(x, scale as u32)
    } else {
        let factor = 10f64.powi(-scale);
        (x / factor).round() * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(round(2.5, 0), 2.0);
        assert_eq!(round(3.5, 0), 4.0);
        assert_eq!(round(1.23456, 2), 1.23);
    }

    #[test]
    fn significant_figures() {
        assert_eq!(round_significant(0.000123456, 3), 0.000123);
        assert_eq!(round_significant(123456.0, 2), 120000.0);
        assert_eq!(round_significant(0.0, 3), 0.0);
    }
}
