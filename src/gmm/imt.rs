use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize
};

/// Intensity measure types.
///
/// Spectral accelerations are named by period with `P` standing in for the
/// decimal point (`SA0P2` is 0.2 s). Values are in units of g except `PGV`
/// (cm/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Imt {
    PGA,
    PGV,
    SA0P02,
    SA0P03,
    SA0P05,
    SA0P075,
    SA0P1,
    SA0P15,
    SA0P2,
    SA0P25,
    SA0P3,
    SA0P4,
    SA0P5,
    SA0P75,
    SA1P0,
    SA1P5,
    SA2P0,
    SA3P0,
    SA4P0,
    SA5P0,
    SA7P5,
    SA10P0
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intensity measure type '{0}'")]
pub struct ParseImtError(pub String);

const PGA_IMLS: [f64; 20] = [
    0.0025, 0.0045, 0.0075, 0.0113, 0.0169, 0.0253, 0.0380, 0.0570, 0.0854, 0.128,
    0.192, 0.288, 0.432, 0.649, 0.973, 1.46, 2.19, 3.28, 4.92, 7.38
];

const PGV_IMLS: [f64; 20] = [
    0.0100, 0.0177, 0.0312, 0.0552, 0.0976, 0.173, 0.305, 0.539, 0.953, 1.68,
    2.98, 5.26, 9.30, 16.4, 29.1, 51.3, 90.8, 160.0, 284.0, 501.0
];

const LONG_PERIOD_IMLS: [f64; 20] = [
    0.0025, 0.00375, 0.00563, 0.00844, 0.0127, 0.0190, 0.0285, 0.0427, 0.0641, 0.0961,
    0.144, 0.216, 0.324, 0.487, 0.730, 1.09, 1.64, 2.46, 3.69, 5.54
];

impl Imt {
    pub const ALL: [Imt; 22] = [
        Imt::PGA, Imt::PGV, Imt::SA0P02, Imt::SA0P03, Imt::SA0P05, Imt::SA0P075,
        Imt::SA0P1, Imt::SA0P15, Imt::SA0P2, Imt::SA0P25, Imt::SA0P3, Imt::SA0P4,
        Imt::SA0P5, Imt::SA0P75, Imt::SA1P0, Imt::SA1P5, Imt::SA2P0, Imt::SA3P0,
        Imt::SA4P0, Imt::SA5P0, Imt::SA7P5, Imt::SA10P0
    ];

    /// Spectral period in seconds; `None` for PGA and PGV.
    pub fn period(&self) -> Option<f64> {
        let t = match self {
            Imt::PGA | Imt::PGV => return None,
            Imt::SA0P02 => 0.02,
            Imt::SA0P03 => 0.03,
            Imt::SA0P05 => 0.05,
            Imt::SA0P075 => 0.075,
            Imt::SA0P1 => 0.1,
            Imt::SA0P15 => 0.15,
            Imt::SA0P2 => 0.2,
            Imt::SA0P25 => 0.25,
            Imt::SA0P3 => 0.3,
            Imt::SA0P4 => 0.4,
            Imt::SA0P5 => 0.5,
            Imt::SA0P75 => 0.75,
            Imt::SA1P0 => 1.0,
            Imt::SA1P5 => 1.5,
            Imt::SA2P0 => 2.0,
            Imt::SA3P0 => 3.0,
            Imt::SA4P0 => 4.0,
            Imt::SA5P0 => 5.0,
            Imt::SA7P5 => 7.5,
            Imt::SA10P0 => 10.0
        };
        Some(t)
    }

    pub fn is_sa(&self) -> bool {
        self.period().is_some()
    }

    /// Default ground-motion levels of a hazard curve for this IMT.
    pub fn default_imls(&self) -> Vec<f64> {
        match self {
            Imt::PGV => PGV_IMLS.to_vec(),
            _ => match self.period() {
                Some(t) if t >= 1.0 => LONG_PERIOD_IMLS.to_vec(),
                _ => PGA_IMLS.to_vec()
            }
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Imt::PGV => "cm/s",
            _ => "g"
        }
    }
}

impl fmt::Display for Imt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Imt {
    type Err = ParseImtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Imt::ALL
            .iter()
            .find(|imt| imt.to_string() == upper)
            .copied()
            .ok_or(ParseImtError(s.to_owned()))
    }
}
