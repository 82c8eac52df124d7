use serde::Serialize;

/// Per rupture–site parameters consumed by a ground-motion model.
///
/// Distances in km, depths and widths in km, angles in degrees, `vs30` in
/// m/s, basin depths `z1p0` / `z2p5` in km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GmmInput {
    pub mw: f64,
    pub r_jb: f64,
    pub r_rup: f64,
    pub r_x: f64,
    pub dip: f64,
    pub width: f64,
    pub z_top: f64,
    pub z_hyp: f64,
    pub rake: f64,
    pub vs30: f64,
    pub vs_inferred: bool,
    pub z1p0: Option<f64>,
    pub z2p5: Option<f64>
}

impl GmmInput {
    pub fn builder() -> GmmInputBuilder {
        GmmInputBuilder::default()
    }
}

/// 未設定的欄位使用一組常見的預設值（M6.5、10 km、垂直走滑斷層、Vs30 760）。
pub struct GmmInputBuilder {
    input: GmmInput
}

impl Default for GmmInputBuilder {
    fn default() -> Self {
        GmmInputBuilder {
            input: GmmInput {
                mw: 6.5,
                r_jb: 10.0,
                r_rup: 10.3,
                r_x: 10.0,
                dip: 90.0,
                width: 14.0,
                z_top: 0.5,
                z_hyp: 7.5,
                rake: 0.0,
                vs30: 760.0,
                vs_inferred: true,
                z1p0: None,
                z2p5: None
            }
        }
    }
}

impl GmmInputBuilder {
    pub fn mag(mut self, mw: f64) -> Self {
        self.input.mw = mw;
        self
    }

    pub fn distances(mut self, r_jb: f64, r_rup: f64, r_x: f64) -> Self {
        self.input.r_jb = r_jb;
        self.input.r_rup = r_rup;
        self.input.r_x = r_x;
        self
    }

    pub fn dip(mut self, dip: f64) -> Self {
        self.input.dip = dip;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.input.width = width;
        self
    }

    pub fn z_top(mut self, z_top: f64) -> Self {
        self.input.z_top = z_top;
        self
    }

    pub fn z_hyp(mut self, z_hyp: f64) -> Self {
        self.input.z_hyp = z_hyp;
        self
    }

    pub fn rake(mut self, rake: f64) -> Self {
        self.input.rake = rake;
        self
    }

    pub fn vs30(mut self, vs30: f64, vs_inferred: bool) -> Self {
        self.input.vs30 = vs30;
        self.input.vs_inferred = vs_inferred;
        self
    }

    pub fn z1p0(mut self, z1p0: Option<f64>) -> Self {
        self.input.z1p0 = z1p0;
        self
    }

    pub fn z2p5(mut self, z2p5: Option<f64>) -> Self {
        self.input.z2p5 = z2p5;
        self
    }

    pub fn build(self) -> GmmInput {
        self.input
    }
}
