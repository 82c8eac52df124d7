use crate::gmm::gmmerror::GmmError;
use crate::gmm::gmminput::GmmInput;
use crate::gmm::gmmutils::{
    FaultStyle,
    basin_term
};
use crate::gmm::groundmotionmodel::{
    GroundMotionModel,
    coefficients,
    table_imts
};
use crate::gmm::imt::Imt;
use crate::gmm::scalargroundmotion::ScalarGroundMotion;

const NAME: &str = "Bjf97";

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b1_ss: f64,
    b1_rv: f64,
    b1_all: f64,
    b2: f64,
    b3: f64,
    b5: f64,
    bv: f64,
    va: f64,
    h: f64,
    sigma: f64
}

#[allow(clippy::too_many_arguments)]
const fn row(
    b1_ss: f64, b1_rv: f64, b1_all: f64, b2: f64, b3: f64,
    b5: f64, bv: f64, va: f64, h: f64, sigma: f64
) -> Coefficients {
    Coefficients { b1_ss, b1_rv, b1_all, b2, b3, b5, bv, va, h, sigma }
}

const COEFFS: [(Imt, Coefficients); 7] = [
    (Imt::PGA,   row(-0.313, -0.117, -0.242, 0.527,  0.000, -0.778, -0.371, 1396.0, 5.57, 0.520)),
    (Imt::SA0P1, row( 1.006,  1.087,  1.059, 0.753, -0.226, -0.934, -0.212, 1112.0, 6.27, 0.479)),
    (Imt::SA0P2, row( 0.999,  1.170,  1.089, 0.711, -0.207, -0.924, -0.292, 2118.0, 7.02, 0.502)),
    (Imt::SA0P3, row( 0.700,  0.915,  0.820, 0.769, -0.161, -0.893, -0.401, 2133.0, 5.94, 0.522)),
    (Imt::SA0P5, row( 0.212,  0.433,  0.328, 0.831, -0.120, -0.846, -0.524, 1782.0, 4.63, 0.553)),
    (Imt::SA1P0, row(-1.133, -1.009, -1.080, 1.036, -0.032, -0.798, -0.698, 1406.0, 2.90, 0.613)),
    (Imt::SA2P0, row(-1.699, -1.801, -1.743, 1.085, -0.085, -0.812, -0.655, 1795.0, 5.85, 0.661))
];

/// Boore, Joyner & Fumal (1997) for shallow crustal earthquakes in western
/// North America.
///
/// ```text
/// ln Y = b1 + b2 (M − 6) + b3 (M − 6)² + b5 ln r + bv ln(Vs30 / Va) [+ basin]
/// r    = √(rJB² + h²)
/// ```
///
/// `b1` follows the fault style implied by rake; normal and unknown styles
/// use the all-mechanism intercept. The basin term is added only when the
/// site carries a `z2p5` value.
pub struct BooreJoynerFumal1997 {
    imt: Imt,
    coeffs: Coefficients
}

impl BooreJoynerFumal1997 {
    pub fn new(imt: Imt) -> Result<BooreJoynerFumal1997, GmmError> {
        Ok(BooreJoynerFumal1997 { imt, coeffs: coefficients(&COEFFS, NAME, imt)? })
    }

    pub fn supported_imts() -> Vec<Imt> {
        table_imts(&COEFFS)
    }

    fn intercept(&self, rake: f64) -> f64 {
        match FaultStyle::from_rake(rake) {
            FaultStyle::StrikeSlip => self.coeffs.b1_ss,
            FaultStyle::Reverse => self.coeffs.b1_rv,
            FaultStyle::Normal | FaultStyle::Unknown => self.coeffs.b1_all
        }
    }
}

impl GroundMotionModel for BooreJoynerFumal1997 {
    fn imt(&self) -> Imt {
        self.imt
    }

    fn calc(&self, input: &GmmInput) -> ScalarGroundMotion {
        let c = &self.coeffs;
        let m = input.mw - 6.0;
        let r = (input.r_jb * input.r_jb + c.h * c.h).sqrt();
        let mean = self.intercept(input.rake)
            + c.b2 * m
            + c.b3 * m * m
            + c.b5 * r.ln()
            + c.bv * (input.vs30 / c.va).ln()
            + basin_term(self.imt, input.z2p5);
        ScalarGroundMotion::new(mean, c.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn strike_slip_pga() {
        let model = BooreJoynerFumal1997::new(Imt::PGA).unwrap();
        let input = GmmInput::builder().mag(6.5).distances(10.0, 10.0, 10.0).rake(0.0).vs30(760.0, false).build();
        let r = (100.0f64 + 5.57 * 5.57).sqrt();
        let expected = -0.313 + 0.527 * 0.5 - 0.778 * r.ln() - 0.371 * (760.0f64 / 1396.0).ln();
        let sgm = model.calc(&input);
        assert_relative_eq!(sgm.mean(), expected, epsilon = 1e-12);
        assert_eq!(sgm.sigma(), 0.520);
    }

    #[test]
    fn fault_style_selects_intercept() {
        let model = BooreJoynerFumal1997::new(Imt::SA1P0).unwrap();
        let base = GmmInput::builder().mag(7.0).distances(15.0, 16.0, 15.0);
        let ss = model.calc(&base.rake(0.0).build()).mean();
        let base = GmmInput::builder().mag(7.0).distances(15.0, 16.0, 15.0);
        let rv = model.calc(&base.rake(90.0).build()).mean();
        assert_relative_eq!(rv - ss, -1.009 + 1.133, epsilon = 1e-12);
    }

    #[test]
    fn soft_sites_and_deep_basins_amplify() {
        let model = BooreJoynerFumal1997::new(Imt::SA1P0).unwrap();
        let rock = model.calc(&GmmInput::builder().vs30(760.0, false).build()).mean();
        let soil = model.calc(&GmmInput::builder().vs30(260.0, false).build()).mean();
        let basin = model.calc(&GmmInput::builder().vs30(260.0, false).z2p5(Some(6.0)).build()).mean();
        assert!(soil > rock);
        assert!(basin > soil);
    }
}
