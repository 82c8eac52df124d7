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

const NAME: &str = "Campbell03";

/// Magnitude above which sigma is constant.
const M1: f64 = 7.16;
const R1: f64 = 70.0;
const R2: f64 = 130.0;

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
    c5: f64,
    c6: f64,
    c7: f64,
    c8: f64,
    c9: f64,
    c10: f64,
    c11: f64,
    c12: f64,
    c13: f64
}

#[allow(clippy::too_many_arguments)]
const fn row(
    c1: f64, c2: f64, c3: f64, c4: f64, c5: f64, c6: f64, c7: f64,
    c8: f64, c9: f64, c10: f64, c11: f64, c12: f64, c13: f64
) -> Coefficients {
    Coefficients { c1, c2, c3, c4, c5, c6, c7, c8, c9, c10, c11, c12, c13 }
}

// Hard rock.
const COEFFS: [(Imt, Coefficients); 7] = [
    (Imt::PGA,   row( 0.0305, 0.633, -0.0427, -1.591, -0.00428, 0.000483, 0.683, 0.416, 1.140, -0.873, 1.030, -0.0860, 0.414)),
    (Imt::SA0P1, row( 1.0798, 0.560, -0.0477, -1.571, -0.00462, 0.000461, 0.600, 0.416, 1.175, -0.884, 1.048, -0.0903, 0.401)),
    (Imt::SA0P2, row( 0.8387, 0.559, -0.0597, -1.513, -0.00357, 0.000406, 0.590, 0.442, 1.131, -0.825, 1.060, -0.0880, 0.430)),
    (Imt::SA0P3, row( 0.4000, 0.560, -0.0900, -1.450, -0.00339, 0.000333, 0.500, 0.460, 1.115, -0.759, 1.078, -0.0852, 0.468)),
    (Imt::SA0P5, row(-0.4500, 0.586, -0.1342, -1.238, -0.00319, 0.000224, 0.390, 0.484, 1.086, -0.621, 1.101, -0.0808, 0.522)),
    (Imt::SA1P0, row(-0.6104, 0.451, -0.2090, -1.158, -0.00255, 0.000141, 0.299, 0.503, 1.067, -0.482, 1.110, -0.0793, 0.542)),
    (Imt::SA2P0, row(-1.3600, 0.451, -0.2660, -1.166, -0.00154, 0.000070, 0.299, 0.503, 1.025, -0.374, 1.139, -0.0752, 0.601))
];

/// Campbell (2003) hybrid empirical model for eastern North America.
///
/// Sigma is magnitude dependent: `c11 + c12·M` below M 7.16 and the constant
/// `c13` at and above it.
pub struct Campbell2003 {
    imt: Imt,
    coeffs: Coefficients
}

impl Campbell2003 {
    pub fn new(imt: Imt) -> Result<Campbell2003, GmmError> {
        Ok(Campbell2003 { imt, coeffs: coefficients(&COEFFS, NAME, imt)? })
    }

    pub fn supported_imts() -> Vec<Imt> {
        table_imts(&COEFFS)
    }

    fn mean(&self, mw: f64, r_rup: f64, vs30: f64) -> f64 {
        let c = &self.coeffs;

        let f1 = c.c2 * mw + c.c3 * (8.5 - mw) * (8.5 - mw);

        let near_field = c.c7 * (c.c8 * mw).exp();
        let r = (r_rup * r_rup + near_field * near_field).sqrt();
        let f2 = c.c4 * r.ln() + (c.c5 + c.c6 * mw) * r_rup;

        let f3 = if r_rup <= R1 {
            0.0
        } else if r_rup <= R2 {
            c.c9 * (r_rup.ln() - R1.ln())
        } else {
            c.c9 * (r_rup.ln() - R1.ln()) + c.c10 * (r_rup.ln() - R2.ln())
        };

        let mean = c.c1 + f1 + f2 + f3 + ceus_site_adjustment(self.imt, vs30);
        ceus_mean_clip(self.imt, mean)
    }

    fn sigma(&self, mw: f64) -> f64 {
        let c = &self.coeffs;
        if mw < M1 {
            c.c11 + c.c12 * mw
        } else {
            c.c13
        }
    }
}

impl GroundMotionModel for Campbell2003 {
    fn imt(&self) -> Imt {
        self.imt
    }

    fn calc(&self, input: &GmmInput) -> ScalarGroundMotion {
        ScalarGroundMotion::new(
            self.mean(input.mw, input.r_rup, input.vs30),
            self.sigma(input.mw)
        )
    }
}
