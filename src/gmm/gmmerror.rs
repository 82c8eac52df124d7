use thiserror::Error;

use crate::gmm::imt::Imt;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GmmError {
    #[error("{gmm} does not support {imt}")]
    UnsupportedImt { gmm: String, imt: Imt },

    #[error("invalid ground motion table: {0}")]
    InvalidTable(String),
}
