use std::fmt;
use std::sync::Arc;

use serde::{
    Serialize,
    Serializer
};

use crate::gmm::boorejoynerfumal1997::BooreJoynerFumal1997;
use crate::gmm::campbell2003::Campbell2003;
use crate::gmm::gmmerror::GmmError;
use crate::gmm::gmminput::GmmInput;
use crate::gmm::imt::Imt;
use crate::gmm::scalargroundmotion::ScalarGroundMotion;
use crate::gmm::tablegmm::TableGmmSet;
use crate::gmm::toro1997::Toro1997;

/// 地動模型 trait。
///
/// 每個實例綁定單一 IMT，建構時即完成係數查表；`calc` 為純函式，可被多條
/// 執行緒同時呼叫。
pub trait GroundMotionModel: Send + Sync {
    fn imt(&self) -> Imt;

    fn calc(&self, input: &GmmInput) -> ScalarGroundMotion;
}

/// Ground-motion model identifiers.
///
/// Closed-form models carry no state; tabulated models carry their shared
/// table set. [`Gmm::instance`] builds the per-IMT evaluator.
#[derive(Clone)]
pub enum Gmm {
    /// Toro, Abrahamson & Schneider (1997), CEUS, moment magnitude.
    Toro97,
    /// Campbell (2003), CEUS hybrid empirical.
    Campbell03,
    /// Boore, Joyner & Fumal (1997), WUS shallow crust.
    Bjf97,
    Tabulated(Arc<TableGmmSet>)
}

impl Gmm {
    pub fn name(&self) -> &str {
        match self {
            Gmm::Toro97 => "Toro97",
            Gmm::Campbell03 => "Campbell03",
            Gmm::Bjf97 => "Bjf97",
            Gmm::Tabulated(set) => set.name()
        }
    }

    pub fn supported_imts(&self) -> Vec<Imt> {
        match self {
            Gmm::Toro97 => Toro1997::supported_imts(),
            Gmm::Campbell03 => Campbell2003::supported_imts(),
            Gmm::Bjf97 => BooreJoynerFumal1997::supported_imts(),
            Gmm::Tabulated(set) => set.supported_imts()
        }
    }

    pub fn supports(&self, imt: Imt) -> bool {
        self.supported_imts().contains(&imt)
    }

    /// Builds the evaluator for `imt`, failing fast on unsupported IMTs.
    pub fn instance(&self, imt: Imt) -> Result<Arc<dyn GroundMotionModel>, GmmError> {
        let model: Arc<dyn GroundMotionModel> = match self {
            Gmm::Toro97 => Arc::new(Toro1997::new(imt)?),
            Gmm::Campbell03 => Arc::new(Campbell2003::new(imt)?),
            Gmm::Bjf97 => Arc::new(BooreJoynerFumal1997::new(imt)?),
            Gmm::Tabulated(set) => Arc::new(set.instance(imt)?)
        };
        Ok(model)
    }
}

impl PartialEq for Gmm {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Gmm {}

impl fmt::Debug for Gmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gmm({})", self.name())
    }
}

impl fmt::Display for Gmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Gmm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Coefficient row for `imt`, or `UnsupportedImt`.
pub(crate) fn coefficients<C: Copy>(table: &[(Imt, C)], gmm: &str, imt: Imt) -> Result<C, GmmError> {
    table
        .iter()
        .find(|(key, _)| *key == imt)
        .map(|(_, c)| *c)
        .ok_or_else(|| GmmError::UnsupportedImt { gmm: gmm.to_owned(), imt })
}

pub(crate) fn table_imts<C>(table: &[(Imt, C)]) -> Vec<Imt> {
    table.iter().map(|(imt, _)| *imt).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_imt_fails_fast() {
        let err = Gmm::Toro97.instance(Imt::PGV).err().unwrap();
        assert_eq!(err, GmmError::UnsupportedImt { gmm: "Toro97".to_owned(), imt: Imt::PGV });
        assert!(!Gmm::Bjf97.supports(Imt::SA10P0));
    }

    #[test]
    fn every_supported_imt_instantiates() {
        for gmm in [Gmm::Toro97, Gmm::Campbell03, Gmm::Bjf97] {
            for imt in gmm.supported_imts() {
                let model = gmm.instance(imt).unwrap();
                assert_eq!(model.imt(), imt);
                let sgm = model.calc(&GmmInput::builder().build());
                assert!(sgm.mean().is_finite(), "{gmm} {imt}");
                assert!(sgm.sigma() > 0.0, "{gmm} {imt}");
            }
        }
    }
}
