use crate::gmm::gmmerror::GmmError;
use crate::gmm::gmminput::GmmInput;
use crate::gmm::gmmutils::{
    ceus_mean_clip,
    ceus_site_adjustment
};
use crate::gmm::groundmotionmodel::{
    GroundMotionModel,
    coefficients,
    table_imts
};
use crate::gmm::imt::Imt;
use crate::gmm::scalargroundmotion::ScalarGroundMotion;

const NAME: &str = "Toro97";

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
    c5: f64,
    c6: f64,
    c7: f64,
    sigma: f64
}

const fn row(c1: f64, c2: f64, c3: f64, c4: f64, c5: f64, c6: f64, c7: f64, sigma: f64) -> Coefficients {
    Coefficients { c1, c2, c3, c4, c5, c6, c7, sigma }
}

// Midcontinent, Mw; hard rock.
const COEFFS: [(Imt, Coefficients); 6] = [
    (Imt::PGA,   row( 2.20, 0.81,  0.00, 1.27, 1.16, 0.0021, 9.3, 0.75)),
    (Imt::SA0P1, row( 2.37, 0.81,  0.00, 1.10, 1.02, 0.0040, 8.3, 0.75)),
    (Imt::SA0P2, row( 1.73, 0.84,  0.00, 0.98, 0.66, 0.0042, 7.5, 0.75)),
    (Imt::SA0P4, row( 1.07, 1.05, -0.10, 0.93, 0.56, 0.0033, 7.1, 0.77)),
    (Imt::SA1P0, row( 0.09, 1.42, -0.20, 0.90, 0.49, 0.0023, 6.8, 0.80)),
    (Imt::SA2P0, row(-0.74, 1.86, -0.31, 0.92, 0.46, 0.0017, 6.9, 0.85))
];

/// Toro, Abrahamson & Schneider (1997) for the central and eastern US.
///
/// ```text
/// ln Y = c1 + c2 (M − 6) + c3 (M − 6)² − c4 ln R − (c5 − c4) max(ln(R/100), 0) − c6 R
/// R    = √(rJB² + c7²)
/// ```
pub struct Toro1997 {
    imt: Imt,
    coeffs: Coefficients
}

impl Toro1997 {
    pub fn new(imt: Imt) -> Result<Toro1997, GmmError> {
        Ok(Toro1997 { imt, coeffs: coefficients(&COEFFS, NAME, imt)? })
    }

    pub fn supported_imts() -> Vec<Imt> {
        table_imts(&COEFFS)
    }
}

impl GroundMotionModel for Toro1997 {
    fn imt(&self) -> Imt {
        self.imt
    }

    fn calc(&self, input: &GmmInput) -> ScalarGroundMotion {
        let c = &self.coeffs;
        let m = input.mw - 6.0;
        let r = (input.r_jb * input.r_jb + c.c7 * c.c7).sqrt();
        let ln_r = r.ln();

        let mut mean = c.c1 + c.c2 * m + c.c3 * m * m
            - c.c4 * ln_r
            - (c.c5 - c.c4) * (ln_r - 100f64.ln()).max(0.0)
            - c.c6 * r;
        mean += ceus_site_adjustment(self.imt, input.vs30);

        ScalarGroundMotion::new(ceus_mean_clip(self.imt, mean), c.sigma)
    }
}
