use crate::gmm::imt::Imt;

/// Hard-rock threshold used to select CEUS coefficient sets.
pub const CEUS_HARD_ROCK_VS30: f64 = 1500.0;

const LN_1P5: f64 = 0.405_465_108_108_164_4;
const LN_3P0: f64 = 1.098_612_288_668_109_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStyle {
    StrikeSlip,
    Reverse,
    Normal,
    Unknown
}

impl FaultStyle {
    /// 以 rake 判定：[45, 135] 逆斷層、[-135, -45] 正斷層，其餘為走滑。
    pub fn from_rake(rake: f64) -> FaultStyle {
        if rake.is_nan() {
            FaultStyle::Unknown
        } else if (45.0..=135.0).contains(&rake) {
            FaultStyle::Reverse
        } else if (-135.0..=-45.0).contains(&rake) {
            FaultStyle::Normal
        } else {
            FaultStyle::StrikeSlip
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeusSiteClass {
    HardRock,
    FirmRock
}

impl CeusSiteClass {
    pub fn from_vs30(vs30: f64) -> CeusSiteClass {
        if vs30 >= CEUS_HARD_ROCK_VS30 {
            CeusSiteClass::HardRock
        } else {
            CeusSiteClass::FirmRock
        }
    }
}

/// Caps CEUS median ground motions: 1.5 g for PGA and 3.0 g for spectral
/// periods up to 0.5 s. Longer periods and PGV are unchanged.
pub fn ceus_mean_clip(imt: Imt, mean: f64) -> f64 {
    match imt {
        Imt::PGA => mean.min(LN_1P5),
        Imt::PGV => mean,
        _ => match imt.period() {
            Some(t) if t <= 0.5 => mean.min(LN_3P0),
            _ => mean
        }
    }
}

/// Linear interpolation of a period-indexed coefficient row in ln(period).
/// PGA maps to 0.01 s and PGV to 1.0 s; periods outside the table clamp.
pub(crate) fn interpolate_by_period<const N: usize>(table: &[(f64, [f64; N])], imt: Imt) -> [f64; N] {
    let t = match imt {
        Imt::PGA => 0.01,
        Imt::PGV => 1.0,
        _ => imt.period().unwrap_or(0.01)
    };
    let i = table
        .partition_point(|row| row.0 <= t)
        .clamp(1, table.len() - 1);
    let (t1, lo) = &table[i - 1];
    let (t2, hi) = &table[i];
    let w = ((t.ln() - t1.ln()) / (t2.ln() - t1.ln())).clamp(0.0, 1.0);
    let mut row = [0.0; N];
    for k in 0..N {
        row[k] = lo[k] + w * (hi[k] - lo[k]);
    }
    row
}

// ── CEUS hard rock → firm rock (BC boundary) ────────────────────────────────

const CEUS_BC_ADJUSTMENT: [(f64, [f64; 1]); 7] = [
    (0.01, [0.40]),
    (0.10, [0.38]),
    (0.20, [0.45]),
    (0.30, [0.43]),
    (0.50, [0.39]),
    (1.00, [0.30]),
    (2.00, [0.25])
];

/// Natural-log adjustment added to CEUS hard-rock medians at firm-rock sites.
pub fn ceus_site_adjustment(imt: Imt, vs30: f64) -> f64 {
    match CeusSiteClass::from_vs30(vs30) {
        CeusSiteClass::HardRock => 0.0,
        CeusSiteClass::FirmRock => interpolate_by_period(&CEUS_BC_ADJUSTMENT, imt)[0]
    }
}

// ── basin (sediment depth) term ─────────────────────────────────────────────
//
//   z < 1 km       : c11 · (z − 1)
//   1 ≤ z ≤ 3 km   : 0
//   z > 3 km       : c12 · k3 · e^−0.75 · (1 − e^(−0.25 (z − 3)))

// period, [c11, c12, k3]
const BASIN_COEFFS: [(f64, [f64; 3]); 8] = [
    (0.01, [0.040, 0.610, 1.839]),
    (0.10, [0.040, 0.610, 1.839]),
    (0.20, [0.040, 0.610, 1.839]),
    (0.30, [0.040, 0.610, 1.839]),
    (0.50, [0.040, 0.610, 2.744]),
    (1.00, [0.255, 0.880, 2.744]),
    (3.00, [0.255, 1.195, 2.744]),
    (10.0, [0.255, 1.195, 2.744])
];

/// Natural-log amplification from depth to the 2.5 km/s horizon. `None`
/// leaves the median unchanged.
pub fn basin_term(imt: Imt, z2p5: Option<f64>) -> f64 {
    let z = match z2p5 {
        Some(z) if z.is_finite() => z,
        _ => return 0.0
    };
    let [c11, c12, k3] = interpolate_by_period(&BASIN_COEFFS, imt);
    if z < 1.0 {
        c11 * (z - 1.0)
    } else if z <= 3.0 {
        0.0
    } else {
        c12 * k3 * (-0.75f64).exp() * (1.0 - (-0.25 * (z - 3.0)).exp())
    }
}
