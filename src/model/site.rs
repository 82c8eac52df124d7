use serde::Serialize;

use crate::model::location::Location;
use crate::model::modelerror::ModelError;

pub const VS30_RANGE: (f64, f64) = (150.0, 2000.0);
pub const Z1P0_RANGE: (f64, f64) = (0.0, 5.0);
pub const Z2P5_RANGE: (f64, f64) = (0.0, 10.0);

/// 計算場址。建構後不可變更。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    name: Option<String>,
    location: Location,
    vs30: f64,
    vs_inferred: bool,
    z1p0: Option<f64>,
    z2p5: Option<f64>
}

impl Site {
    pub fn builder(location: Location) -> SiteBuilder {
        SiteBuilder {
            name: None,
            location,
            vs30: 760.0,
            vs_inferred: true,
            z1p0: None,
            z2p5: None
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn vs30(&self) -> f64 {
        self.vs30
    }

    pub fn vs_inferred(&self) -> bool {
        self.vs_inferred
    }

    pub fn z1p0(&self) -> Option<f64> {
        self.z1p0
    }

    pub fn z2p5(&self) -> Option<f64> {
        self.z2p5
    }

    /// Name if present, else `lon,lat`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:.3},{:.3}", self.location.longitude(), self.location.latitude())
        }
    }
}

pub struct SiteBuilder {
    name: Option<String>,
    location: Location,
    vs30: f64,
    vs_inferred: bool,
    z1p0: Option<f64>,
    z2p5: Option<f64>
}

impl SiteBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn vs30(mut self, vs30: f64) -> Self {
        self.vs30 = vs30;
        self
    }

    pub fn vs_inferred(mut self, vs_inferred: bool) -> Self {
        self.vs_inferred = vs_inferred;
        self
    }

    pub fn z1p0(mut self, z1p0: f64) -> Self {
        self.z1p0 = Some(z1p0);
        self
    }

    pub fn z2p5(mut self, z2p5: f64) -> Self {
        self.z2p5 = Some(z2p5);
        self
    }

    pub fn build(self) -> Result<Site, ModelError> {
        ModelError::check_range("vs30", self.vs30, VS30_RANGE.0, VS30_RANGE.1)?;
        if let Some(z) = self.z1p0 {
            ModelError::check_range("z1p0", z, Z1P0_RANGE.0, Z1P0_RANGE.1)?;
        }
        if let Some(z) = self.z2p5 {
            ModelError::check_range("z2p5", z, Z2P5_RANGE.0, Z2P5_RANGE.1)?;
        }
        Ok(Site {
            name: self.name,
            location: self.location,
            vs30: self.vs30,
            vs_inferred: self.vs_inferred,
            z1p0: self.z1p0,
            z2p5: self.z2p5
        })
    }
}
